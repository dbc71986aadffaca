use axum::{http::HeaderMap, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{ApiResponse, ApiResult};
use crate::auth::{generate_jwt, Claims};
use crate::database::models::{OtpCode, User};
use crate::database::DatabaseManager;
use crate::error::ApiError;

use super::utils::{client_ip, user_agent};

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

/// POST /auth/verify-otp - Exchange a valid OTP for a JWT.
///
/// Only the newest code for the user counts; it must be unused and inside
/// its validity window. Verification marks it used and records a login
/// session (client IP and user agent).
pub async fn verify_otp_post(
    headers: HeaderMap,
    Json(request): Json<VerifyOtpRequest>,
) -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&request.email)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| {
            tracing::warn!("OTP verification failed: {} not registered", request.email);
            ApiError::not_found("Invalid user. Please register first.")
        })?;

    let newest = sqlx::query_as::<_, OtpCode>(
        "SELECT * FROM otp_codes WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
    )
    .bind(user.id)
    .fetch_optional(&pool)
    .await?;

    let code = match newest {
        Some(code) if code.code == request.otp && code.is_valid_at(Utc::now()) => code,
        _ => {
            tracing::warn!("Invalid/expired OTP for {}", user.email);
            return Err(ApiError::bad_request("Invalid or expired OTP"));
        }
    };

    // Consume the code and record the login as one unit, so a failure here
    // never burns the code without logging the user in.
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE otp_codes SET is_used = TRUE WHERE id = $1")
        .bind(code.id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("INSERT INTO user_sessions (user_id, ip_address, user_agent) VALUES ($1, $2, $3)")
        .bind(user.id)
        .bind(client_ip(&headers))
        .bind(user_agent(&headers))
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    let token = generate_jwt(Claims::for_user(&user))?;

    tracing::info!("OTP verified for {}", user.email);
    Ok(ApiResponse::success(
        "OTP verified successfully",
        json!({ "token": token, "user_id": user.id }),
    ))
}
