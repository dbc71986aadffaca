// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

/// HTTP API error with appropriate status codes and client-friendly messages.
///
/// Every error renders as the standard E-Market response envelope:
/// `{ response_code, status: "Failed", message, statusFlag: false, errorDetails, data: {} }`
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to the standard response envelope
    pub fn to_json(&self) -> Value {
        let error_details = match self {
            ApiError::ValidationError { field_errors: Some(field_errors), .. } => {
                json!({
                    "code": self.error_code(),
                    "field_errors": field_errors,
                })
            }
            _ => json!(self.error_code()),
        };

        json!({
            "response_code": self.status_code(),
            "status": "Failed",
            "message": self.message(),
            "statusFlag": false,
            "errorDetails": error_details,
            "data": {},
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ApiError::not_found("Resource not found"),
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => {
                tracing::error!("Database unreachable: {}", err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            _ => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database error: {}", err);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<crate::database::manager::DatabaseError> for ApiError {
    fn from(err: crate::database::manager::DatabaseError) -> Self {
        use crate::database::manager::DatabaseError;
        match err {
            DatabaseError::ConfigMissing(_) | DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("Database configuration error: {}", err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::InvalidDatabaseName(_) => {
                tracing::error!("Database configuration error: {}", err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Sqlx(sqlx_err) => sqlx_err.into(),
            DatabaseError::Migrate(e) => {
                tracing::error!("Migration error: {}", e);
                ApiError::service_unavailable("Service is being updated, please try again later")
            }
        }
    }
}

impl From<crate::auth::JwtError> for ApiError {
    fn from(err: crate::auth::JwtError) -> Self {
        tracing::error!("JWT error: {}", err);
        ApiError::internal_server_error("Failed to issue authentication token")
    }
}

impl From<crate::services::order_service::OrderError> for ApiError {
    fn from(err: crate::services::order_service::OrderError) -> Self {
        use crate::services::order_service::OrderError;
        match err {
            OrderError::EmptyCart => ApiError::bad_request("Cart is empty"),
            OrderError::DispatchInfoRequired => ApiError::bad_request(
                "Dispatch address and phone are required. Either confirm_dispatch='no' and \
                 provide them, or ensure the user profile has both set.",
            ),
            OrderError::InsufficientStock(product_id) => {
                ApiError::bad_request(format!("Insufficient stock for product ID {}", product_id))
            }
            OrderError::InvalidQuantity(product_id) => ApiError::bad_request(format!(
                "Quantity must be at least 1 for product ID {}",
                product_id
            )),
            OrderError::InvalidDistance => {
                ApiError::bad_request("Distance must be zero or a positive number")
            }
            OrderError::UserNotFound => ApiError::not_found("User not found"),
            OrderError::Database(e) => e.into(),
            OrderError::Manager(e) => e.into(),
        }
    }
}

impl From<crate::services::invoice_service::InvoiceError> for ApiError {
    fn from(err: crate::services::invoice_service::InvoiceError) -> Self {
        use crate::services::invoice_service::InvoiceError;
        match err {
            InvoiceError::Database(e) => e.into(),
            InvoiceError::Manager(e) => e.into(),
            InvoiceError::Pdf(msg) => {
                tracing::error!("Invoice PDF rendering failed: {}", msg);
                ApiError::internal_server_error("Failed to generate invoice")
            }
            InvoiceError::Io(e) => {
                tracing::error!("Invoice file write failed: {}", e);
                ApiError::internal_server_error("Failed to store invoice")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_failed_status() {
        let err = ApiError::bad_request("Cart is empty");
        let body = err.to_json();
        assert_eq!(body["response_code"], 400);
        assert_eq!(body["status"], "Failed");
        assert_eq!(body["message"], "Cart is empty");
        assert_eq!(body["statusFlag"], false);
        assert_eq!(body["errorDetails"], "BAD_REQUEST");
        assert!(body["data"].as_object().is_some_and(|d| d.is_empty()));
    }

    #[test]
    fn validation_errors_expose_field_errors() {
        let mut fields = HashMap::new();
        fields.insert("email".to_string(), "This field is required.".to_string());
        let err = ApiError::validation_error("Invalid data", Some(fields));
        let body = err.to_json();
        assert_eq!(body["errorDetails"]["code"], "VALIDATION_ERROR");
        assert_eq!(
            body["errorDetails"]["field_errors"]["email"],
            "This field is required."
        );
    }

    #[test]
    fn status_codes_match_variants() {
        assert_eq!(ApiError::unauthorized("x").status_code(), 401);
        assert_eq!(ApiError::forbidden("x").status_code(), 403);
        assert_eq!(ApiError::not_found("x").status_code(), 404);
        assert_eq!(ApiError::service_unavailable("x").status_code(), 503);
    }
}
