use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::api::{ApiResponse, ApiResult};
use crate::auth::password::hash_password;
use crate::config;
use crate::database::models::User;
use crate::database::DatabaseManager;
use crate::error::ApiError;

use super::utils::issue_otp;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub phone: Option<String>,
    pub district: String,
    pub state: String,
    pub country: String,
    pub pincode: String,
}

/// POST /auth/register - Create an account and send the first OTP.
///
/// Registering with the configured admin email promotes the account to
/// admin/staff/superuser automatically.
pub async fn register_post(Json(request): Json<RegisterRequest>) -> ApiResult<Value> {
    validate(&request)?;

    let pool = DatabaseManager::pool().await?;

    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
        .bind(&request.email)
        .fetch_one(&pool)
        .await?;
    if exists {
        tracing::warn!("Registration rejected, email already in use: {}", request.email);
        return Err(ApiError::bad_request("User already exists"));
    }

    let password_hash = hash_password(&request.password).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::internal_server_error("Failed to process registration")
    })?;

    let is_admin = request.email == config::config().security.admin_email;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users
             (name, email, password_hash, address, phone, district, state, country, pincode,
              is_admin, is_superuser, is_staff)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10, $10)
         RETURNING *",
    )
    .bind(&request.name)
    .bind(&request.email)
    .bind(&password_hash)
    .bind(&request.address)
    .bind(&request.phone)
    .bind(&request.district)
    .bind(&request.state)
    .bind(&request.country)
    .bind(&request.pincode)
    .bind(is_admin)
    .fetch_one(&pool)
    .await?;

    issue_otp(&user).await?;

    tracing::info!("User registered: {}", user.email);
    Ok(ApiResponse::created(
        "User registered. OTP sent.",
        json!({ "email": user.email }),
    ))
}

fn validate(request: &RegisterRequest) -> Result<(), ApiError> {
    let mut field_errors = HashMap::new();

    let required = [
        ("name", &request.name),
        ("email", &request.email),
        ("password", &request.password),
        ("address", &request.address),
        ("district", &request.district),
        ("state", &request.state),
        ("country", &request.country),
        ("pincode", &request.pincode),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            field_errors.insert(field.to_string(), "This field is required.".to_string());
        }
    }

    if !request.email.trim().is_empty() && !request.email.contains('@') {
        field_errors.insert("email".to_string(), "Enter a valid email address.".to_string());
    }

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Invalid data", Some(field_errors)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterRequest {
        RegisterRequest {
            name: "Buyer".to_string(),
            email: "buyer@example.com".to_string(),
            password: "s3cret-pw".to_string(),
            address: "12 Main St".to_string(),
            phone: Some("9876543210".to_string()),
            district: "Trichy".to_string(),
            state: "TN".to_string(),
            country: "India".to_string(),
            pincode: "620001".to_string(),
        }
    }

    #[test]
    fn accepts_complete_payload() {
        assert!(validate(&request()).is_ok());
    }

    #[test]
    fn phone_is_optional() {
        let mut req = request();
        req.phone = None;
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn rejects_blank_required_fields() {
        let mut req = request();
        req.name = "  ".to_string();
        req.pincode = String::new();
        let err = validate(&req).unwrap_err();
        let body = err.to_json();
        assert_eq!(body["response_code"], 400);
        assert!(body["errorDetails"]["field_errors"]["name"].is_string());
        assert!(body["errorDetails"]["field_errors"]["pincode"].is_string());
    }

    #[test]
    fn rejects_malformed_email() {
        let mut req = request();
        req.email = "not-an-email".to_string();
        let err = validate(&req).unwrap_err();
        assert!(err.to_json()["errorDetails"]["field_errors"]["email"].is_string());
    }
}
