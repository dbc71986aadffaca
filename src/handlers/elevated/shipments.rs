use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::{ApiResponse, ApiResult};
use crate::database::models::ShipmentStatus;
use crate::database::DatabaseManager;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ShipmentUpdateRequest {
    pub order_id: Uuid,
    pub shipment_status: String,
}

/// POST /api/admin/shipments - Move an order through its shipment lifecycle.
pub async fn shipment_post(Json(request): Json<ShipmentUpdateRequest>) -> ApiResult<Value> {
    let status = ShipmentStatus::parse(&request.shipment_status)
        .ok_or_else(|| ApiError::bad_request("Invalid shipment status"))?;

    let pool = DatabaseManager::pool().await?;

    let updated: Option<Uuid> = sqlx::query_scalar(
        "UPDATE orders SET shipment_status = $2 WHERE id = $1 RETURNING id",
    )
    .bind(request.order_id)
    .bind(status.as_str())
    .fetch_optional(&pool)
    .await?;

    match updated {
        Some(order_id) => {
            tracing::info!("Shipment status for order {} set to '{}'", order_id, status.as_str());
            Ok(ApiResponse::success(
                "Shipment status updated",
                json!({ "order_id": order_id, "shipment_status": status.as_str() }),
            ))
        }
        None => Err(ApiError::not_found("Order not found")),
    }
}
