use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};

use crate::chores::{self, ChoreStatus};
use crate::database::db::queries;
use crate::database::models::{BalanceSnapshot, LoanPayment};
use crate::engine::ScheduledPayment;

/// Thin async facade over the store. Every method is one round trip; the
/// TUI reloads and recomputes after each call instead of patching local
/// state.
#[derive(Clone)]
pub struct Client {
    pool: Pool<Sqlite>,
}

impl Client {
    pub async fn sqlite(db_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    // ============= Snapshots =============

    pub async fn list_snapshots(&self) -> Result<Vec<BalanceSnapshot>> {
        Ok(queries::list_snapshots(&self.pool).await?)
    }

    pub async fn save_snapshot(
        &self,
        week_of: NaiveDate,
        checking: Decimal,
        savings: Decimal,
        credit_card: Decimal,
        cash: Decimal,
    ) -> Result<BalanceSnapshot> {
        Ok(queries::upsert_snapshot(&self.pool, week_of, checking, savings, credit_card, cash).await?)
    }

    pub async fn delete_snapshot(&self, snapshot_id: i64) -> Result<bool> {
        Ok(queries::delete_snapshot(&self.pool, snapshot_id).await?)
    }

    // ============= Chores =============

    pub async fn chore_board(&self, today: NaiveDate) -> Result<Vec<ChoreStatus>> {
        let list = queries::list_chores(&self.pool).await?;
        let last_done = queries::last_completions(&self.pool).await?;
        Ok(chores::prioritize(list, &last_done, today))
    }

    pub async fn add_chore(&self, name: &str, cadence_days: i64, today: NaiveDate) -> Result<i64> {
        Ok(queries::create_chore(&self.pool, name, cadence_days, today).await?)
    }

    pub async fn complete_chore(&self, chore_id: i64, on: NaiveDate) -> Result<i64> {
        Ok(queries::log_completion(&self.pool, chore_id, on).await?)
    }

    pub async fn delete_chore(&self, chore_id: i64) -> Result<bool> {
        Ok(queries::delete_chore(&self.pool, chore_id).await?)
    }

    // ============= Loan =============

    pub async fn loan_ledger(&self) -> Result<Vec<LoanPayment>> {
        Ok(queries::list_cleared_payments(&self.pool).await?)
    }

    pub async fn clear_payment(&self, payment: &ScheduledPayment) -> Result<LoanPayment> {
        Ok(queries::insert_cleared_payment(&self.pool, payment).await?)
    }

    pub async fn delete_payment(&self, payment_id: i64) -> Result<bool> {
        Ok(queries::delete_payment(&self.pool, payment_id).await?)
    }
}
