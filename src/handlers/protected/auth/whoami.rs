use axum::Extension;
use serde_json::{json, Value};

use crate::api::{ApiResponse, ApiResult};
use crate::middleware::AuthUser;

/// GET /api/auth/whoami - Identity of the calling token.
pub async fn whoami_get(Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(
        "Authenticated user",
        json!({
            "user_id": user.user_id,
            "email": user.email,
            "name": user.name,
            "access": user.access,
        }),
    ))
}
