use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::api::{ApiResponse, ApiResult};
use crate::database::DatabaseManager;

/// GET /api/admin/dashboard - Store-wide aggregates.
pub async fn dashboard_get() -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;

    let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await?;
    let total_products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&pool)
        .await?;
    let total_orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(&pool)
        .await?;
    let total_sales: Decimal = sqlx::query_scalar("SELECT COALESCE(SUM(total), 0) FROM orders")
        .fetch_one(&pool)
        .await?;

    Ok(ApiResponse::success(
        "Dashboard data fetched successfully",
        json!({
            "total_users": total_users,
            "total_products": total_products,
            "total_orders": total_orders,
            "total_sales": total_sales,
        }),
    ))
}
