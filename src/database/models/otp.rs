use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OtpCode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub is_used: bool,
}

impl OtpCode {
    /// Whether this code is still acceptable at `now`: unused and inside
    /// the configured validity window.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && crate::auth::otp::is_within_window(self.created_at, now)
    }
}
