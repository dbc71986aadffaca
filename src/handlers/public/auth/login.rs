use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{ApiResponse, ApiResult};
use crate::database::models::User;
use crate::database::DatabaseManager;
use crate::error::ApiError;

use super::utils::issue_otp;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

/// POST /auth/login - Passwordless login: issue and email a fresh OTP.
pub async fn login_post(Json(request): Json<LoginRequest>) -> ApiResult<Value> {
    let user = find_user(&request.email).await?;
    issue_otp(&user).await?;

    tracing::info!("OTP sent to: {}", user.email);
    Ok(ApiResponse::success(
        "OTP sent to your email",
        json!({ "email": user.email }),
    ))
}

/// POST /auth/resend-otp - Same flow as login with a different message.
pub async fn resend_otp_post(Json(request): Json<LoginRequest>) -> ApiResult<Value> {
    let user = find_user(&request.email).await?;
    issue_otp(&user).await?;

    tracing::info!("OTP resent to: {}", user.email);
    Ok(ApiResponse::success(
        "OTP resent to your email",
        json!({ "email": user.email }),
    ))
}

async fn find_user(email: &str) -> Result<User, ApiError> {
    let pool = DatabaseManager::pool().await?;
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Login failed: {} not found", email);
            ApiError::not_found("User not found. Please register first.")
        })
}
