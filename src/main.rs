//Third-party-dependencies
use actix_cors::Cors;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use log::info;

use snippet_service::routes::{auth_routes, category_routes, snippet_routes};
use snippet_service::services::SnippetEngine;
use snippet_service::utils::auth_middleware::Authentication;
use snippet_service::utils::{seed, SnippetStore};

// Health check for load balancers and local smoke tests
#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let address = std::env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:9090".to_string());
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

    let store = SnippetStore::new(&data_dir)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let engine = web::Data::new(SnippetEngine::new(store));

    if std::env::var("SEED_DEMO_DATA").map_or(false, |v| v == "true" || v == "1") {
        seed::seed_demo_data(&engine)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    }

    info!("Server started at {}", address);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(Authentication)
            .app_data(engine.clone())
            .service(health)
            .configure(auth_routes::init_routes)
            .configure(snippet_routes::init_routes)
            .configure(category_routes::init_routes)
    })
        .bind(address)?
        .run()
        .await
}
