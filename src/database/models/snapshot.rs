use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One weekly balance reading across the household accounts. Keyed by
/// `week_of`; re-entering the same week replaces the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub snapshot_id: i64,
    pub week_of: NaiveDate,
    pub checking: Decimal,
    pub savings: Decimal,
    pub credit_card: Decimal,
    pub cash: Decimal,
    pub created_at: String,
}

impl BalanceSnapshot {
    /// Assets minus the credit card balance.
    pub fn net(&self) -> Decimal {
        self.checking + self.savings + self.cash - self.credit_card
    }
}
