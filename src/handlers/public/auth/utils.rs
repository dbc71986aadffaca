use axum::http::HeaderMap;

use crate::auth::otp::generate_otp;
use crate::database::models::User;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::services::mailer::Mailer;

/// Create a fresh OTP for the user and email it. The OTP row must persist;
/// mail delivery problems are logged and never fail the request.
pub(super) async fn issue_otp(user: &User) -> Result<(), ApiError> {
    let pool = DatabaseManager::pool().await?;
    let otp = generate_otp();

    sqlx::query("INSERT INTO otp_codes (user_id, code) VALUES ($1, $2)")
        .bind(user.id)
        .bind(&otp)
        .execute(&pool)
        .await?;

    match Mailer::from_config() {
        Ok(mailer) => {
            if let Err(e) = mailer.send_otp(&user.email, &otp).await {
                tracing::warn!("Failed to send OTP email to {}: {}", user.email, e);
            }
        }
        Err(e) => tracing::warn!("Mailer unavailable, OTP email not sent: {}", e),
    }

    Ok(())
}

/// Client IP for the session record: first X-Forwarded-For hop when present.
pub(super) fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(super) fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
