use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Cleared,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Cleared => "cleared",
        }
    }

    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("cleared") {
            Self::Cleared
        } else {
            Self::Pending
        }
    }
}

/// A payment actually applied to the loan. Rows are immutable once
/// written; corrections are delete-and-reenter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPayment {
    pub payment_id: i64,
    pub payment_date: NaiveDate,
    pub amount_paid: Decimal,
    pub principal_portion: Decimal,
    pub interest_portion: Decimal,
    pub remaining_balance: Decimal,
    pub status: PaymentStatus,
}
