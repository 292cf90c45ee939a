use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{generate_jwt, Claims};
use crate::config;
use crate::db::Database;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::user_service::UserService;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /auth/login - Authenticate and receive a bearer token
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<Value> {
    let pool = Database::pool().await?;
    let users = UserService::new(pool);

    let user = users
        .authenticate(&payload.username, &payload.password)
        .await
        .map_err(|_| ApiError::unauthorized("Invalid username or password"))?;

    let security = &config::config().security;
    let claims = Claims::new(user.name.clone(), user.id, security);
    let token = generate_jwt(&claims, security)
        .map_err(|e| ApiError::internal_server_error(e.to_string()))?;

    Ok(ApiResponse::success(json!({
        "token": token,
        "user": views::user_view(&user, super::base_url()),
        "expires_in": security.jwt_expiry_hours * 3600,
    })))
}
