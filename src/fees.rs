use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Pix,
    DebitCard,
    CreditCard,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Pix => "pix",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::CreditCard => "credit_card",
        }
    }

    pub fn from_str_opt(value: &str) -> Option<Self> {
        match value {
            "cash" => Some(PaymentMethod::Cash),
            "pix" => Some(PaymentMethod::Pix),
            "debit_card" => Some(PaymentMethod::DebitCard),
            "credit_card" => Some(PaymentMethod::CreditCard),
            _ => None,
        }
    }
}

/// Card processor fee rates in basis points. Cash and pix always settle at
/// face value; debit is a flat rate; credit rates differ per installment count.
#[derive(Debug, Clone)]
pub struct FeeTable {
    pub debit_bps: i64,
    pub credit_bps: [i64; 3],
}

impl FeeTable {
    pub const DEFAULT_DEBIT_BPS: i64 = 200;
    pub const DEFAULT_CREDIT_BPS: [i64; 3] = [400, 450, 500];

    /// Resolve the fee rate for a payment, validating the installment count
    /// against the method (installments are a credit-card concept only).
    pub fn rate_bps(&self, method: PaymentMethod, installments: i16) -> AppResult<i64> {
        match method {
            PaymentMethod::CreditCard => {
                if !(1..=3).contains(&installments) {
                    return Err(AppError::Validation(
                        "installments must be between 1 and 3".into(),
                    ));
                }
                Ok(self.credit_bps[(installments - 1) as usize])
            }
            _ => {
                if installments != 1 {
                    return Err(AppError::Validation(format!(
                        "{} does not support installments",
                        method.as_str()
                    )));
                }
                match method {
                    PaymentMethod::DebitCard => Ok(self.debit_bps),
                    _ => Ok(0),
                }
            }
        }
    }
}

impl Default for FeeTable {
    fn default() -> Self {
        Self {
            debit_bps: Self::DEFAULT_DEBIT_BPS,
            credit_bps: Self::DEFAULT_CREDIT_BPS,
        }
    }
}

/// Fee on an integer-cent total, rounded half-up exactly once.
/// Summing per-line fees would accumulate rounding drift, so callers pass
/// the already-summed gross amount.
pub fn fee_cents(gross_cents: i64, rate_bps: i64) -> i64 {
    (gross_cents * rate_bps + 5_000) / 10_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cash_and_pix_are_free() {
        let table = FeeTable::default();
        assert_eq!(table.rate_bps(PaymentMethod::Cash, 1).unwrap(), 0);
        assert_eq!(table.rate_bps(PaymentMethod::Pix, 1).unwrap(), 0);
        assert_eq!(fee_cents(123_456, 0), 0);
    }

    #[test]
    fn credit_two_installments_charges_configured_rate() {
        // 4.5% of R$100.00 -> R$4.50 fee, R$95.50 net.
        let table = FeeTable::default();
        let rate = table.rate_bps(PaymentMethod::CreditCard, 2).unwrap();
        assert_eq!(rate, 450);
        let gross = 10_000;
        let fee = fee_cents(gross, rate);
        assert_eq!(fee, 450);
        assert_eq!(gross - fee, 9_550);
    }

    #[test]
    fn debit_uses_flat_rate() {
        let table = FeeTable::default();
        let rate = table.rate_bps(PaymentMethod::DebitCard, 1).unwrap();
        assert_eq!(rate, 200);
        assert_eq!(fee_cents(10_000, rate), 200);
    }

    #[test]
    fn fee_rounds_half_up_once() {
        // 4.5% of R$1.99 = 0.8955 cents -> 1 cent.
        assert_eq!(fee_cents(199, 450), 9);
        // 2% of 25 cents = 0.5 cents, rounds up.
        assert_eq!(fee_cents(25, 200), 1);
        // 2% of 24 cents = 0.48 cents, rounds down.
        assert_eq!(fee_cents(24, 200), 0);
    }

    #[test]
    fn installments_rejected_outside_credit() {
        let table = FeeTable::default();
        assert!(table.rate_bps(PaymentMethod::Cash, 2).is_err());
        assert!(table.rate_bps(PaymentMethod::DebitCard, 3).is_err());
        assert!(table.rate_bps(PaymentMethod::CreditCard, 0).is_err());
        assert!(table.rate_bps(PaymentMethod::CreditCard, 4).is_err());
    }
}
