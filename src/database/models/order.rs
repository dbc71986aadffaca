use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub invoice_id: String,
    pub created_at: DateTime<Utc>,
    pub total: Decimal,
    pub dispatch_confirmed: bool,
    pub dispatch_address: String,
    pub dispatch_phone: String,
    pub shipment_status: String,
    pub payment_mode: String,
    pub distance: f64,
    pub is_direct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub brand: String,
    pub quantity: i32,
    pub price: Decimal,
}

/// Order item joined with its product name for detail responses and invoices.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderItemDetail {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub brand: String,
    pub quantity: i32,
    pub price: Decimal,
}

/// Shipment lifecycle of an order. Stored as its display string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipmentStatus {
    Pending,
    Dispatched,
    InTransit,
    Delivered,
}

impl ShipmentStatus {
    pub const CHOICES: [ShipmentStatus; 4] = [
        ShipmentStatus::Pending,
        ShipmentStatus::Dispatched,
        ShipmentStatus::InTransit,
        ShipmentStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "Pending",
            ShipmentStatus::Dispatched => "Dispatched",
            ShipmentStatus::InTransit => "In Transit",
            ShipmentStatus::Delivered => "Delivered",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::CHOICES.into_iter().find(|s| s.as_str() == value)
    }
}

/// How an order is paid. COD adds a distance surcharge, online adds GST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    Cod,
    Online,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cod => "cod",
            PaymentMode::Online => "online",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cod" => Some(PaymentMode::Cod),
            "online" => Some(PaymentMode::Online),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipment_status_round_trips() {
        for status in ShipmentStatus::CHOICES {
            assert_eq!(ShipmentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ShipmentStatus::parse("Shipped"), None);
        assert_eq!(ShipmentStatus::parse("in transit"), None);
    }

    #[test]
    fn payment_mode_is_strict_lowercase() {
        assert_eq!(PaymentMode::parse("cod"), Some(PaymentMode::Cod));
        assert_eq!(PaymentMode::parse("online"), Some(PaymentMode::Online));
        assert_eq!(PaymentMode::parse("COD"), None);
        assert_eq!(PaymentMode::parse("card"), None);
    }
}
