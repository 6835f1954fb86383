use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chore {
    pub chore_id: i64,
    pub name: String,
    /// Target days between completions.
    pub cadence_days: i64,
    pub created_on: NaiveDate,
}
