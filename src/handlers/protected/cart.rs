use axum::extract::Path;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::{ApiResponse, ApiResult};
use crate::database::models::{CartItem, CartItemDetail};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct CartAddRequest {
    pub product_id: Uuid,
    pub quantity: Option<i32>,
}

/// POST /api/cart - Add a product to the caller's cart.
pub async fn cart_post(
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CartAddRequest>,
) -> ApiResult<CartItem> {
    let quantity = request.quantity.unwrap_or(1);
    if quantity < 1 {
        return Err(ApiError::bad_request("Invalid quantity"));
    }

    let pool = DatabaseManager::pool().await?;

    let product_exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
            .bind(request.product_id)
            .fetch_one(&pool)
            .await?;
    if !product_exists {
        return Err(ApiError::not_found("Product not found"));
    }

    let already_in_cart: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM cart_items WHERE user_id = $1 AND product_id = $2)",
    )
    .bind(user.user_id)
    .bind(request.product_id)
    .fetch_one(&pool)
    .await?;
    if already_in_cart {
        tracing::warn!(
            "Product {} already in cart for user {}",
            request.product_id,
            user.user_id
        );
        return Err(ApiError::bad_request("Product already in cart"));
    }

    let item = sqlx::query_as::<_, CartItem>(
        "INSERT INTO cart_items (user_id, product_id, quantity)
         VALUES ($1, $2, $3)
         RETURNING *",
    )
    .bind(user.user_id)
    .bind(request.product_id)
    .bind(quantity)
    .fetch_one(&pool)
    .await?;

    tracing::info!("Product {} added to cart for user {}", item.product_id, user.user_id);
    Ok(ApiResponse::created("Product added to cart", item))
}

/// GET /api/cart - The caller's cart, joined with product details.
pub async fn cart_get(Extension(user): Extension<AuthUser>) -> ApiResult<Vec<CartItemDetail>> {
    let pool = DatabaseManager::pool().await?;

    let items = sqlx::query_as::<_, CartItemDetail>(
        "SELECT ci.id, ci.product_id, p.name, p.brand, p.price, ci.quantity
         FROM cart_items ci
         JOIN products p ON p.id = ci.product_id
         WHERE ci.user_id = $1",
    )
    .bind(user.user_id)
    .fetch_all(&pool)
    .await?;

    Ok(ApiResponse::success("Cart items fetched", items))
}

/// DELETE /api/cart - Empty the caller's cart.
pub async fn cart_delete(Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;

    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .execute(&pool)
        .await?;

    tracing::info!("Cart cleared for user {}", user.user_id);
    Ok(ApiResponse::success("Cart cleared", json!({})))
}

/// DELETE /api/cart/:id - Remove one of the caller's cart rows.
pub async fn cart_item_delete(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;

    let deleted: Option<Uuid> = sqlx::query_scalar(
        "DELETE FROM cart_items WHERE id = $1 AND user_id = $2 RETURNING id",
    )
    .bind(id)
    .bind(user.user_id)
    .fetch_optional(&pool)
    .await?;

    match deleted {
        Some(id) => {
            tracing::info!("Cart item {} removed for user {}", id, user.user_id);
            Ok(ApiResponse::success("Item removed from cart", json!({ "id": id })))
        }
        None => Err(ApiError::not_found("Item not found")),
    }
}
