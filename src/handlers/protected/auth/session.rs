use axum::Extension;
use serde_json::{json, Value};

use crate::api::{ApiResponse, ApiResult};
use crate::database::DatabaseManager;
use crate::middleware::AuthUser;

/// POST /api/auth/logout - Drop the user's login sessions.
///
/// JWTs are stateless and lapse at their `exp`; the session rows are the
/// server-side record of who is logged in, and logout clears them.
pub async fn logout_post(Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;

    sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
        .bind(user.user_id)
        .execute(&pool)
        .await?;

    tracing::info!("User {} logged out", user.email);
    Ok(ApiResponse::success("Logged out successfully", json!({})))
}
