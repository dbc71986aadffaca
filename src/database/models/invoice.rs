use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_id: Uuid,
    pub invoice_id: String,
    pub total: Decimal,
    pub pdf_path: String,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Public URL of the stored PDF, served under /media.
    pub fn pdf_url(&self) -> String {
        format!("/media/{}", self.pdf_path)
    }
}
