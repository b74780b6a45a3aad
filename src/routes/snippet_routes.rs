use crate::models::{
    CreateSnippetRequest, ServiceError, SnippetFilters, UpdateSnippetRequest,
};
use crate::services::SnippetEngine;
use crate::utils::get_requester_from_request;
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use log::info;
use serde_json::json;

// List snippets visible to the requester, with optional filters
#[get("/snippets")]
async fn list_snippets(
    req: HttpRequest,
    query: web::Query<SnippetFilters>,
    engine: web::Data<SnippetEngine>,
) -> Result<HttpResponse, ServiceError> {
    let requester = get_requester_from_request(&req)?;

    info!("📋 List snippets for user: {}", requester.user_id);

    let snippets = engine.list(&requester, &query)?;

    Ok(HttpResponse::Ok().json(snippets))
}

// Resolve a shortcut to its highest-priority published snippet
#[get("/snippets/shortcut/{shortcut}")]
async fn get_snippet_by_shortcut(
    req: HttpRequest,
    path: web::Path<String>,
    engine: web::Data<SnippetEngine>,
) -> Result<HttpResponse, ServiceError> {
    let requester = get_requester_from_request(&req)?;
    let shortcut = path.into_inner();

    info!("🔍 Resolve shortcut: {} for user: {}", shortcut, requester.user_id);

    let snippet = engine.resolve_shortcut(&shortcut, &requester)?;

    Ok(HttpResponse::Ok().json(snippet))
}

// Get a snippet by ID
#[get("/snippets/{id}")]
async fn get_snippet(
    path: web::Path<String>,
    engine: web::Data<SnippetEngine>,
) -> Result<HttpResponse, ServiceError> {
    let id = path.into_inner();

    let snippet = engine.get(&id)?;

    Ok(HttpResponse::Ok().json(snippet))
}

// Create a snippet owned by the requester
#[post("/snippets")]
async fn create_snippet(
    req: HttpRequest,
    data: web::Json<CreateSnippetRequest>,
    engine: web::Data<SnippetEngine>,
) -> Result<HttpResponse, ServiceError> {
    let requester = get_requester_from_request(&req)?;

    info!("📝 Create snippet: {} for user: {}", data.name, requester.user_id);

    let snippet = engine.create(&requester, data.into_inner())?;

    Ok(HttpResponse::Created().json(snippet))
}

// Partially update a snippet (owner, manager or admin)
#[put("/snippets/{id}")]
async fn update_snippet(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<UpdateSnippetRequest>,
    engine: web::Data<SnippetEngine>,
) -> Result<HttpResponse, ServiceError> {
    let requester = get_requester_from_request(&req)?;
    let id = path.into_inner();

    info!("📝 Update snippet: {} by user: {}", id, requester.user_id);

    let snippet = engine.update(&id, &requester, data.into_inner())?;

    Ok(HttpResponse::Ok().json(snippet))
}

// Hard-delete a snippet and its version history (owner or admin)
#[delete("/snippets/{id}")]
async fn delete_snippet(
    req: HttpRequest,
    path: web::Path<String>,
    engine: web::Data<SnippetEngine>,
) -> Result<HttpResponse, ServiceError> {
    let requester = get_requester_from_request(&req)?;
    let id = path.into_inner();

    info!("🗑️ Delete snippet: {} by user: {}", id, requester.user_id);

    engine.delete(&id, &requester)?;

    Ok(HttpResponse::NoContent().finish())
}

// Record that a snippet was inserted into a document
#[post("/snippets/{id}/insert")]
async fn track_insertion(
    path: web::Path<String>,
    engine: web::Data<SnippetEngine>,
) -> Result<HttpResponse, ServiceError> {
    let id = path.into_inner();

    engine.track_insertion(&id)?;

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

// Version history for a snippet, newest version first
#[get("/snippets/{id}/versions")]
async fn get_snippet_versions(
    path: web::Path<String>,
    engine: web::Data<SnippetEngine>,
) -> Result<HttpResponse, ServiceError> {
    let id = path.into_inner();

    let versions = engine.versions(&id)?;

    Ok(HttpResponse::Ok().json(versions))
}

// Register all snippet routes. The shortcut route must come before the
// {id} route so "shortcut" is not captured as an id.
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_snippets)
        .service(get_snippet_by_shortcut)
        .service(track_insertion)
        .service(get_snippet_versions)
        .service(get_snippet)
        .service(create_snippet)
        .service(update_snippet)
        .service(delete_snippet);
}
