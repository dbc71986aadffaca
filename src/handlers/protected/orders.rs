use axum::extract::Path;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::{ApiResponse, ApiResult};
use crate::database::models::Order;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::invoice_service::InvoiceService;
use crate::services::mailer::Mailer;
use crate::services::order_service::{DispatchRequest, OrderLine, OrderService, PlacedOrder};

#[derive(Debug, Deserialize)]
pub struct DirectOrderRequest {
    #[serde(flatten)]
    pub dispatch: DispatchRequest,
    pub products: Vec<OrderLine>,
}

/// POST /api/orders - Place an order from the caller's cart.
pub async fn order_post(
    Extension(user): Extension<AuthUser>,
    Json(request): Json<DispatchRequest>,
) -> ApiResult<Value> {
    let service = OrderService::new().await?;
    let placed = service.place_from_cart(user.user_id, &request).await?;

    tracing::info!("Order {} placed by user {}", placed.order.invoice_id, user.email);
    let response = order_placed_response(&placed.order);
    finalize_order(placed);
    Ok(response)
}

/// POST /api/orders/direct - Place an order for an explicit product list,
/// bypassing the cart.
pub async fn direct_order_post(
    Extension(user): Extension<AuthUser>,
    Json(request): Json<DirectOrderRequest>,
) -> ApiResult<Value> {
    let service = OrderService::new().await?;
    let placed = service
        .place_direct(user.user_id, &request.dispatch, &request.products)
        .await?;

    tracing::info!("Direct order {} placed by user {}", placed.order.invoice_id, user.email);
    let response = order_placed_response(&placed.order);
    finalize_order(placed);
    Ok(response)
}

fn order_placed_response(order: &Order) -> ApiResponse<Value> {
    ApiResponse::created(
        "Order placed",
        json!({
            "order_id": order.id,
            "invoice_id": order.invoice_id,
            "total": order.total,
        }),
    )
}

/// Post-commit side effects: render and store the invoice, mail it to the
/// buyer, alert the admin about products the order sold out. The order is
/// already committed, so none of this can fail the request; problems are
/// logged and the invoice endpoint keeps returning 404 until regenerated.
fn finalize_order(placed: PlacedOrder) {
    tokio::spawn(async move {
        let mailer = match Mailer::from_config() {
            Ok(mailer) => Some(mailer),
            Err(e) => {
                tracing::warn!("Mailer unavailable, order mail skipped: {}", e);
                None
            }
        };

        match InvoiceService::new().await {
            Ok(service) => match service.generate_for_order(&placed).await {
                Ok((invoice, pdf)) => {
                    if let Some(mailer) = &mailer {
                        if let Err(e) = mailer
                            .send_invoice(&placed.buyer_email, &invoice.invoice_id, pdf)
                            .await
                        {
                            tracing::warn!(
                                "Failed to email invoice {} to {}: {}",
                                invoice.invoice_id,
                                placed.buyer_email,
                                e
                            );
                        }
                    }
                }
                Err(e) => tracing::error!(
                    "Failed to generate invoice for order {}: {}",
                    placed.order.invoice_id,
                    e
                ),
            },
            Err(e) => tracing::error!("Invoice service unavailable: {}", e),
        }

        if let Some(mailer) = &mailer {
            for product in &placed.depleted_products {
                if let Err(e) = mailer.send_out_of_stock_alert(&product.name).await {
                    tracing::warn!("Failed to send out-of-stock alert for {}: {}", product.name, e);
                }
            }
        }
    });
}

/// GET /api/orders - The caller's orders, newest first.
pub async fn order_list_get(Extension(user): Extension<AuthUser>) -> ApiResult<Vec<Order>> {
    let service = OrderService::new().await?;
    let orders = service.list_for_user(user.user_id).await?;
    Ok(ApiResponse::success("List of orders", orders))
}

/// GET /api/orders/:id - One of the caller's orders with its items.
pub async fn order_detail_get(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let service = OrderService::new().await?;
    let (order, items) = service
        .find_for_user(user.user_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order not found"))?;

    Ok(ApiResponse::success(
        "Order details",
        json!({ "order": order, "items": items }),
    ))
}

/// GET /api/orders/:id/invoice - Invoice metadata and PDF location.
pub async fn invoice_get(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let service = InvoiceService::new().await?;
    let invoice = service
        .find_for_order(user.user_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Invoice not found"))?;

    Ok(ApiResponse::success(
        "Invoice URL fetched",
        json!({
            "invoice_id": invoice.invoice_id,
            "order_id": invoice.order_id,
            "total": invoice.total,
            "created_at": invoice.created_at,
            "pdf_url": invoice.pdf_url(),
        }),
    ))
}
