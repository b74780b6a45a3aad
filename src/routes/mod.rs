pub mod auth_routes;
pub mod category_routes;
pub mod snippet_routes;
