//! One-time password generation and expiry rules.
//!
//! An OTP is six random digits. Only the newest unused code for a user
//! counts, and it expires a fixed number of minutes after creation
//! (5 by default, see `SecurityConfig::otp_ttl_minutes`).

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::config;

/// Generate a 6-digit one-time password.
pub fn generate_otp() -> String {
    let mut rng = rand::thread_rng();
    (0..6).map(|_| char::from(b'0' + rng.gen_range(0..10u8))).collect()
}

/// When a code created at `created_at` stops being accepted.
pub fn expires_at(created_at: DateTime<Utc>) -> DateTime<Utc> {
    created_at + Duration::minutes(config::config().security.otp_ttl_minutes)
}

/// Whether a code created at `created_at` is still inside its validity window.
pub fn is_within_window(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now <= expires_at(created_at)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..50 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()), "not digits: {}", otp);
        }
    }

    #[test]
    fn window_accepts_fresh_code() {
        let created = Utc::now();
        assert!(is_within_window(created, created + Duration::minutes(4)));
        assert!(is_within_window(created, created + Duration::minutes(5)));
    }

    #[test]
    fn window_rejects_stale_code() {
        let created = Utc::now();
        assert!(!is_within_window(created, created + Duration::minutes(5) + Duration::seconds(1)));
        assert!(!is_within_window(created, created + Duration::hours(1)));
    }
}
