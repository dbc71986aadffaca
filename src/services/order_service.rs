use rand::Rng;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    Order, OrderItem, OrderItemDetail, PaymentMode, Product, User,
};
use crate::services::pricing::{self, PricingBreakdown};

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Dispatch address and phone required")]
    DispatchInfoRequired,
    #[error("Insufficient stock for product {0}")]
    InsufficientStock(Uuid),
    #[error("Invalid quantity for product {0}")]
    InvalidQuantity(Uuid),
    #[error("Invalid distance")]
    InvalidDistance,
    #[error("User not found")]
    UserNotFound,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Database manager error: {0}")]
    Manager(#[from] DatabaseError),
}

/// Shared payload for both order paths. `confirm_dispatch = "yes"` ships to
/// the profile address, `"no"` ships to the address in the payload.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchRequest {
    pub confirm_dispatch: String,
    pub dispatch_address: Option<String>,
    pub dispatch_phone: Option<String>,
    pub payment_mode: PaymentMode,
    #[serde(default)]
    pub distance: f64,
}

#[derive(Debug, Clone, Deserialize, sqlx::FromRow)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// A committed order with everything the post-commit side effects need:
/// invoice rendering, the buyer's mailbox, and any products the order
/// emptied out.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub items: Vec<OrderItemDetail>,
    pub pricing: PricingBreakdown,
    pub buyer_email: String,
    pub depleted_products: Vec<Product>,
}

pub struct OrderService {
    pool: PgPool,
}

impl OrderService {
    pub async fn new() -> Result<Self, OrderError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Place an order from the user's cart. The stock decrement, order row,
    /// order items and cart clearing commit as one transaction; any failure
    /// rolls the whole order back.
    pub async fn place_from_cart(
        &self,
        user_id: Uuid,
        request: &DispatchRequest,
    ) -> Result<PlacedOrder, OrderError> {
        let mut tx = self.pool.begin().await?;

        let lines = sqlx::query_as::<_, OrderLine>(
            "SELECT product_id, quantity FROM cart_items WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let placed = Self::place(&mut tx, user_id, request, &lines, false).await?;

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(placed)
    }

    /// Place an order for an explicit product list, bypassing the cart.
    pub async fn place_direct(
        &self,
        user_id: Uuid,
        request: &DispatchRequest,
        lines: &[OrderLine],
    ) -> Result<PlacedOrder, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let mut tx = self.pool.begin().await?;
        let placed = Self::place(&mut tx, user_id, request, lines, true).await?;
        tx.commit().await?;
        Ok(placed)
    }

    async fn place(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
        request: &DispatchRequest,
        lines: &[OrderLine],
        is_direct: bool,
    ) -> Result<PlacedOrder, OrderError> {
        validate_distance(request.distance)?;

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(OrderError::UserNotFound)?;

        let (dispatch_address, dispatch_phone) = resolve_dispatch(&user, request)?;
        let dispatch_confirmed = request.confirm_dispatch.eq_ignore_ascii_case("yes");

        let order = sqlx::query_as::<_, Order>(
            "INSERT INTO orders
                 (user_id, invoice_id, dispatch_confirmed, dispatch_address,
                  dispatch_phone, payment_mode, distance, is_direct)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(user_id)
        .bind(new_invoice_id())
        .bind(dispatch_confirmed)
        .bind(&dispatch_address)
        .bind(&dispatch_phone)
        .bind(request.payment_mode.as_str())
        .bind(request.distance)
        .bind(is_direct)
        .fetch_one(&mut **tx)
        .await?;

        let mut subtotal = Decimal::ZERO;
        let mut items = Vec::with_capacity(lines.len());
        let mut depleted_products = Vec::new();

        for line in lines {
            if line.quantity < 1 {
                return Err(OrderError::InvalidQuantity(line.product_id));
            }

            // Conditional decrement: no row means another order got the stock
            // first (or the product does not exist), and the transaction rolls
            // back untouched.
            let product = sqlx::query_as::<_, Product>(
                "UPDATE products
                 SET quantity = quantity - $2,
                     sold_count = sold_count + $2,
                     updated_at = now()
                 WHERE id = $1 AND quantity >= $2
                 RETURNING *",
            )
            .bind(line.product_id)
            .bind(line.quantity as i64)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(OrderError::InsufficientStock(line.product_id))?;

            let item = sqlx::query_as::<_, OrderItem>(
                "INSERT INTO order_items (order_id, product_id, brand, quantity, price)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING *",
            )
            .bind(order.id)
            .bind(product.id)
            .bind(&product.brand)
            .bind(line.quantity)
            .bind(product.price)
            .fetch_one(&mut **tx)
            .await?;

            subtotal += product.price * Decimal::from(line.quantity);
            items.push(OrderItemDetail {
                id: item.id,
                product_id: product.id,
                name: product.name.clone(),
                brand: item.brand,
                quantity: item.quantity,
                price: item.price,
            });

            if product.is_out_of_stock() {
                depleted_products.push(product);
            }
        }

        let pricing = pricing::price_order(subtotal, request.payment_mode, request.distance);

        let order = sqlx::query_as::<_, Order>(
            "UPDATE orders SET total = $2 WHERE id = $1 RETURNING *",
        )
        .bind(order.id)
        .bind(pricing.total)
        .fetch_one(&mut **tx)
        .await?;

        Ok(PlacedOrder {
            order,
            items,
            pricing,
            buyer_email: user.email,
            depleted_products,
        })
    }

    /// The user's orders, newest first.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, OrderError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    /// One of the user's orders with its items, or None for someone else's
    /// (or nonexistent) order id.
    pub async fn find_for_user(
        &self,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<Option<(Order, Vec<OrderItemDetail>)>, OrderError> {
        let order = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE id = $1 AND user_id = $2",
        )
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemDetail>(
            "SELECT oi.id, oi.product_id, p.name, oi.brand, oi.quantity, oi.price
             FROM order_items oi
             JOIN products p ON p.id = oi.product_id
             WHERE oi.order_id = $1",
        )
        .bind(order.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some((order, items)))
    }
}

fn resolve_dispatch(
    user: &User,
    request: &DispatchRequest,
) -> Result<(String, String), OrderError> {
    let (address, phone) = if request.confirm_dispatch.eq_ignore_ascii_case("yes") {
        (Some(user.address.clone()), user.phone.clone())
    } else {
        (request.dispatch_address.clone(), request.dispatch_phone.clone())
    };

    match (address, phone) {
        (Some(a), Some(p)) if !a.trim().is_empty() && !p.trim().is_empty() => Ok((a, p)),
        _ => Err(OrderError::DispatchInfoRequired),
    }
}

/// A negative distance would turn the COD surcharge into a discount, so the
/// order total could undercut the subtotal while stock was still decremented.
fn validate_distance(distance_km: f64) -> Result<(), OrderError> {
    if !distance_km.is_finite() || distance_km < 0.0 {
        return Err(OrderError::InvalidDistance);
    }
    Ok(())
}

/// Invoice identifiers look like `INV-3FA9C02B17` (10 uppercase hex digits).
fn new_invoice_id() -> String {
    let n: u64 = rand::thread_rng().gen_range(0..0x100_0000_0000u64);
    format!("INV-{:010X}", n)
}
