// snippet-service/src/models/mod.rs
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::fmt;
use actix_web::{HttpResponse, ResponseError};

// Import the snippet module
pub mod snippet;
pub use snippet::*;

// User role for authorization decisions
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Manager,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

// User models for authentication
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    pub team_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub team_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UserCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

// JWT claims structure for authentication
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    pub sub: String,  // Subject (user ID)
    pub email: String,
    pub role: Role,
    pub team_id: Option<String>,
    pub exp: usize,   // Expiration time
    pub iat: usize,   // Issued at
}

// The identity the API layer hands to the engine on every call
#[derive(Debug, Clone)]
pub struct Requester {
    pub user_id: String,
    pub role: Role,
    pub team_id: Option<String>,
}

impl From<&Claims> for Requester {
    fn from(claims: &Claims) -> Self {
        Requester {
            user_id: claims.sub.clone(),
            role: claims.role,
            team_id: claims.team_id.clone(),
        }
    }
}

// Custom error types
#[derive(Debug)]
pub enum ServiceError {
    InternalServerError,
    BadRequest(String),
    Unauthorized,
    NotFound,
    Forbidden,
}

// Implement Display for ServiceError
impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ServiceError::InternalServerError => write!(f, "Internal Server Error"),
            ServiceError::BadRequest(msg) => write!(f, "BadRequest: {}", msg),
            ServiceError::Unauthorized => write!(f, "Unauthorized"),
            ServiceError::NotFound => write!(f, "Not Found"),
            ServiceError::Forbidden => write!(f, "Forbidden"),
        }
    }
}

// Implement std::error::Error for ServiceError
impl std::error::Error for ServiceError {}

// Implement ResponseError for ServiceError
impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::InternalServerError =>
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Internal server error"
                })),
            ServiceError::BadRequest(ref message) =>
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": message
                })),
            ServiceError::Unauthorized =>
                HttpResponse::Unauthorized().json(serde_json::json!({
                    "error": "Unauthorized"
                })),
            ServiceError::NotFound =>
                HttpResponse::NotFound().json(serde_json::json!({
                    "error": "Snippet not found"
                })),
            ServiceError::Forbidden =>
                HttpResponse::Forbidden().json(serde_json::json!({
                    "error": "Unauthorized"
                })),
        }
    }
}
