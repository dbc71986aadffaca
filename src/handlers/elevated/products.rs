use axum::extract::Path;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::api::{ApiResponse, ApiResult};
use crate::database::models::Product;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::services::mailer::Mailer;

#[derive(Debug, Deserialize)]
pub struct ProductCreateRequest {
    pub name: String,
    pub brand: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct ProductUpdateRequest {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub quantity: i64,
}

/// POST /api/admin/products
pub async fn product_post(Json(request): Json<ProductCreateRequest>) -> ApiResult<Product> {
    validate_create(&request)?;

    let pool = DatabaseManager::pool().await?;

    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (name, brand, description, price, quantity)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(&request.name)
    .bind(&request.brand)
    .bind(&request.description)
    .bind(request.price)
    .bind(request.quantity)
    .fetch_one(&pool)
    .await?;

    tracing::info!("Product created: {} ({})", product.name, product.id);
    Ok(ApiResponse::created("Product created", product))
}

/// PUT /api/admin/products/:id - Partial update: absent fields keep their
/// current value.
pub async fn product_put(
    Path(id): Path<Uuid>,
    Json(request): Json<ProductUpdateRequest>,
) -> ApiResult<Product> {
    if matches!(request.price, Some(p) if p < Decimal::ZERO)
        || matches!(request.quantity, Some(q) if q < 0)
    {
        return Err(ApiError::bad_request("Invalid data"));
    }

    let pool = DatabaseManager::pool().await?;

    let product = sqlx::query_as::<_, Product>(
        "UPDATE products
         SET name = COALESCE($2, name),
             brand = COALESCE($3, brand),
             description = COALESCE($4, description),
             price = COALESCE($5, price),
             quantity = COALESCE($6, quantity),
             updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(&request.name)
    .bind(&request.brand)
    .bind(&request.description)
    .bind(request.price)
    .bind(request.quantity)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Product not found"))?;

    tracing::info!("Product {} updated", id);
    Ok(ApiResponse::success("Product updated", product))
}

/// DELETE /api/admin/products/:id
pub async fn product_delete(Path(id): Path<Uuid>) -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;

    let deleted: Option<Uuid> = sqlx::query_scalar("DELETE FROM products WHERE id = $1 RETURNING id")
        .bind(id)
        .fetch_optional(&pool)
        .await?;

    match deleted {
        Some(id) => {
            tracing::info!("Product {} deleted", id);
            Ok(ApiResponse::success("Product deleted", json!({ "id": id })))
        }
        None => Err(ApiError::not_found("Product not found")),
    }
}

/// POST /api/admin/products/:id/restock - Add stock and notify every
/// registered user by email.
pub async fn product_restock_post(
    Path(id): Path<Uuid>,
    Json(request): Json<RestockRequest>,
) -> ApiResult<Value> {
    if request.quantity <= 0 {
        tracing::warn!("Invalid restock quantity {} for product {}", request.quantity, id);
        return Err(ApiError::bad_request("Invalid quantity"));
    }

    let pool = DatabaseManager::pool().await?;

    let product = sqlx::query_as::<_, Product>(
        "UPDATE products
         SET quantity = quantity + $2, updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(request.quantity)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Product not found"))?;

    let recipients: Vec<String> = sqlx::query_scalar("SELECT email FROM users")
        .fetch_all(&pool)
        .await?;

    // Broadcast happens in the background; the restock itself already stands.
    tokio::spawn(async move {
        match Mailer::from_config() {
            Ok(mailer) => mailer.send_restock_notice(&recipients, &product.name).await,
            Err(e) => tracing::warn!("Mailer unavailable, restock notices skipped: {}", e),
        }
    });

    tracing::info!("Product {} restocked with quantity {}", id, request.quantity);
    Ok(ApiResponse::success(
        "Product restocked",
        json!({ "product_id": id, "added": request.quantity }),
    ))
}

fn validate_create(request: &ProductCreateRequest) -> Result<(), ApiError> {
    let mut field_errors = HashMap::new();

    if request.name.trim().is_empty() {
        field_errors.insert("name".to_string(), "This field is required.".to_string());
    }
    if request.brand.trim().is_empty() {
        field_errors.insert("brand".to_string(), "This field is required.".to_string());
    }
    if request.price < Decimal::ZERO {
        field_errors.insert("price".to_string(), "Price must not be negative.".to_string());
    }
    if request.quantity < 0 {
        field_errors.insert("quantity".to_string(), "Quantity must not be negative.".to_string());
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
    use std::str::FromStr;

    fn create_request() -> ProductCreateRequest {
        ProductCreateRequest {
            name: "Widget".to_string(),
            brand: "Acme".to_string(),
            description: "A widget".to_string(),
            price: Decimal::from_str("199.99").unwrap(),
            quantity: 10,
        }
    }

    #[test]
    fn accepts_valid_product() {
        assert!(validate_create(&create_request()).is_ok());
    }

    #[test]
    fn rejects_negative_price_and_blank_name() {
        let mut req = create_request();
        req.name = " ".to_string();
        req.price = Decimal::from_str("-1").unwrap();
        let err = validate_create(&req).unwrap_err();
        let body = err.to_json();
        assert!(body["errorDetails"]["field_errors"]["name"].is_string());
        assert!(body["errorDetails"]["field_errors"]["price"].is_string());
    }
}
