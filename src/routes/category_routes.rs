use crate::models::ServiceError;
use crate::services::SnippetEngine;
use actix_web::{get, web, HttpResponse};

// Distinct categories across non-archived snippets, sorted
#[get("/categories")]
async fn get_categories(engine: web::Data<SnippetEngine>) -> Result<HttpResponse, ServiceError> {
    let categories = engine.categories()?;

    Ok(HttpResponse::Ok().json(categories))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_categories);
}
