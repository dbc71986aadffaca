//! Order pricing rules.
//!
//! Every order pays a flat shipping fee. Cash-on-delivery orders add a
//! distance surcharge (10 per km); online payments add 8% GST on the item
//! subtotal instead. All arithmetic stays in `rust_decimal` and the final
//! figures carry two decimal places.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::database::models::PaymentMode;

const GST_PERCENT: u32 = 8;
const COD_RATE_PER_KM: i64 = 10;
const SHIPPING_FEE: i64 = 50;

#[derive(Debug, Clone, Serialize)]
pub struct PricingBreakdown {
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub cod_surcharge: Decimal,
    pub gst: Decimal,
    pub total: Decimal,
}

/// Price an order from its item subtotal, payment mode and delivery distance.
pub fn price_order(subtotal: Decimal, payment_mode: PaymentMode, distance_km: f64) -> PricingBreakdown {
    let shipping_fee = Decimal::from(SHIPPING_FEE);

    let cod_surcharge = match payment_mode {
        PaymentMode::Cod => {
            let distance = Decimal::from_f64_retain(distance_km).unwrap_or_default();
            (distance * Decimal::from(COD_RATE_PER_KM)).round_dp(2)
        }
        PaymentMode::Online => Decimal::ZERO,
    };

    let gst = match payment_mode {
        PaymentMode::Online => {
            (subtotal * Decimal::from(GST_PERCENT) / Decimal::from(100)).round_dp(2)
        }
        PaymentMode::Cod => Decimal::ZERO,
    };

    let total = (subtotal + shipping_fee + cod_surcharge + gst).round_dp(2);

    PricingBreakdown {
        subtotal,
        shipping_fee,
        cod_surcharge,
        gst,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn cod_order_adds_distance_surcharge() {
        let p = price_order(dec("1000.00"), PaymentMode::Cod, 12.0);
        assert_eq!(p.shipping_fee, dec("50"));
        assert_eq!(p.cod_surcharge, dec("120.00"));
        assert_eq!(p.gst, Decimal::ZERO);
        assert_eq!(p.total, dec("1170.00"));
    }

    #[test]
    fn online_order_adds_gst_not_surcharge() {
        let p = price_order(dec("1000.00"), PaymentMode::Online, 12.0);
        assert_eq!(p.cod_surcharge, Decimal::ZERO);
        assert_eq!(p.gst, dec("80.00"));
        assert_eq!(p.total, dec("1130.00"));
    }

    #[test]
    fn gst_rounds_to_two_decimals() {
        // 8% of 33.33 = 2.6664 -> 2.67
        let p = price_order(dec("33.33"), PaymentMode::Online, 0.0);
        assert_eq!(p.gst, dec("2.67"));
        assert_eq!(p.total, dec("86.00"));
    }

    #[test]
    fn fractional_distance_surcharge_rounds() {
        let p = price_order(dec("10.00"), PaymentMode::Cod, 2.345);
        assert_eq!(p.cod_surcharge, dec("23.45"));
        assert_eq!(p.total, dec("83.45"));
    }

    #[test]
    fn zero_subtotal_still_pays_shipping() {
        let p = price_order(Decimal::ZERO, PaymentMode::Online, 0.0);
        assert_eq!(p.total, dec("50.00"));
    }
}
