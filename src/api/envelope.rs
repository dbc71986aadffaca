use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Wrapper for successful API responses that renders the standard E-Market
/// envelope:
///
/// ```json
/// {
///   "response_code": 200,
///   "status": "Success",
///   "message": "...",
///   "statusFlag": true,
///   "errorDetails": null,
///   "data": { ... }
/// }
/// ```
///
/// The HTTP status always equals `response_code`. Failures render the same
/// envelope through `ApiError` (see `crate::error`).
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    pub data: T,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK response
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
            status_code: StatusCode::OK,
        }
    }

    /// 201 Created response
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
            status_code: StatusCode::CREATED,
        }
    }

    pub fn to_json(&self) -> Value {
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                Value::Object(serde_json::Map::new())
            }
        };

        json!({
            "response_code": self.status_code.as_u16(),
            "status": "Success",
            "message": self.message,
            "statusFlag": true,
            "errorDetails": Value::Null,
            "data": data_value,
        })
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status_code, Json(self.to_json())).into_response()
    }
}

/// Handler result type: success envelope or `ApiError` (which renders the
/// failure envelope with a matching status code).
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_shape() {
        let resp = ApiResponse::success("OTP sent to your email", json!({"email": "a@b.c"}));
        let body = resp.to_json();
        assert_eq!(body["response_code"], 200);
        assert_eq!(body["status"], "Success");
        assert_eq!(body["message"], "OTP sent to your email");
        assert_eq!(body["statusFlag"], true);
        assert!(body["errorDetails"].is_null());
        assert_eq!(body["data"]["email"], "a@b.c");
    }

    #[test]
    fn created_sets_201() {
        let resp = ApiResponse::created("Product created", json!({}));
        assert_eq!(resp.status_code, StatusCode::CREATED);
        assert_eq!(resp.to_json()["response_code"], 201);
    }
}
