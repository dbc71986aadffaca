use axum::extract::{Path, Query};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::{ApiResponse, ApiResult};
use crate::config;
use crate::database::models::Product;
use crate::database::DatabaseManager;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// GET /products - Paginated catalog, newest first.
pub async fn product_list_get(Query(params): Query<PageParams>) -> ApiResult<Value> {
    let api = &config::config().api;
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params
        .per_page
        .unwrap_or(api.default_page_size)
        .clamp(1, api.max_page_size);

    let pool = DatabaseManager::pool().await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&pool)
        .await?;

    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(per_page)
    .bind((page - 1) * per_page)
    .fetch_all(&pool)
    .await?;

    let total_pages = if total == 0 { 0 } else { (total + per_page - 1) / per_page };

    Ok(ApiResponse::success(
        "List of products",
        json!({
            "products": products,
            "page": page,
            "per_page": per_page,
            "total": total,
            "total_pages": total_pages,
        }),
    ))
}

/// GET /products/:id
pub async fn product_detail_get(Path(id): Path<Uuid>) -> ApiResult<Product> {
    let pool = DatabaseManager::pool().await?;

    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    Ok(ApiResponse::success("Product details", product))
}
