use crate::models::{Claims, LoginResponse, RegisterRequest, ServiceError, User, UserCredentials};
use crate::services::SnippetEngine;
use crate::utils::{jwt, password};
use actix_web::{get, post, web, HttpMessage, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{debug, error, info};
use serde_json::json;
use uuid::Uuid;

// Register a new user
#[post("/auth/register")]
async fn register(
    data: web::Json<RegisterRequest>,
    engine: web::Data<SnippetEngine>,
) -> Result<HttpResponse, ServiceError> {
    info!("📝 Register request for email: {}", data.email);

    // Check if the email already exists
    if engine.store().find_user_by_email(&data.email)?.is_some() {
        error!("❌ Email already registered: {}", data.email);
        return Err(ServiceError::BadRequest("Email already registered".to_string()));
    }

    // Create a new user; roles are never assigned through this endpoint
    let user = User {
        id: Uuid::new_v4().to_string(),
        email: data.email.clone(),
        password_hash: password::hash_password(&data.password)?,
        name: data.name.clone(),
        role: Default::default(),
        team_id: data.team_id.clone(),
        created_at: Utc::now(),
    };

    engine.store().save_user(&user)?;

    info!("✅ User registered successfully: {}", user.id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "User registered successfully",
        "user_id": user.id
    })))
}

// Login and get JWT token
#[post("/auth/login")]
async fn login(
    credentials: web::Json<UserCredentials>,
    engine: web::Data<SnippetEngine>,
) -> Result<HttpResponse, ServiceError> {
    info!("🔑 Login request for email: {}", credentials.email);

    // Find the user by email
    let user = match engine.store().find_user_by_email(&credentials.email)? {
        Some(user) => user,
        None => {
            error!("❌ User not found: {}", credentials.email);
            return Err(ServiceError::Unauthorized);
        }
    };

    // Verify password
    if !password::verify_password(&credentials.password, &user.password_hash)? {
        error!("❌ Invalid password for user: {}", credentials.email);
        return Err(ServiceError::Unauthorized);
    }

    // Generate JWT token carrying id, role and team key
    let token = jwt::generate_token(&user)?;

    info!("✅ User logged in successfully: {}", user.id);

    let response = LoginResponse {
        token: token.clone(),
        user_id: user.id,
        email: user.email,
        role: user.role,
    };

    Ok(HttpResponse::Ok()
        .append_header(("Authorization", format!("Bearer {}", token)))
        .json(response))
}

// Get current user info (requires authentication)
#[get("/auth/me")]
async fn me(
    req: HttpRequest,
    engine: web::Data<SnippetEngine>,
) -> Result<HttpResponse, ServiceError> {
    debug!("👤 Get user info request");

    let claims = req
        .extensions()
        .get::<Claims>()
        .cloned()
        .ok_or(ServiceError::Unauthorized)?;

    if let Some(user) = engine.store().find_user_by_id(&claims.sub)? {
        return Ok(HttpResponse::Ok().json(json!({
            "user_id": user.id,
            "email": user.email,
            "name": user.name,
            "role": user.role,
            "team_id": user.team_id,
            "created_at": user.created_at
        })));
    }

    error!("❌ Unauthorized access to /auth/me");
    Err(ServiceError::Unauthorized)
}

// Register all auth routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(me);
}
