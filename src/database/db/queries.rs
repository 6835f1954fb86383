use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use std::collections::HashMap;

use crate::database::models::{BalanceSnapshot, Chore, LoanPayment, PaymentStatus};
use crate::engine::ScheduledPayment;

/*
All SQL lives here. Amounts are stored as canonical decimal text and dates
as %Y-%m-%d text; decoding back into Decimal/NaiveDate happens at this
boundary so the rest of the crate never sees raw strings.
 */

fn decimal_col(row: &SqliteRow, col: &str) -> Result<Decimal, sqlx::Error> {
    let text: String = row.try_get(col)?;
    Decimal::from_str_exact(text.trim())
        .map_err(|e| sqlx::Error::Decode(format!("invalid decimal in {col}: {e}").into()))
}

fn date_col(row: &SqliteRow, col: &str) -> Result<NaiveDate, sqlx::Error> {
    let text: String = row.try_get(col)?;
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|e| sqlx::Error::Decode(format!("invalid date in {col}: {e}").into()))
}

fn iso(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/*==========Snapshot queries===========*/

fn map_snapshot(row: &SqliteRow) -> Result<BalanceSnapshot, sqlx::Error> {
    Ok(BalanceSnapshot {
        snapshot_id: row.try_get("snapshot_id")?,
        week_of: date_col(row, "week_of")?,
        checking: decimal_col(row, "checking")?,
        savings: decimal_col(row, "savings")?,
        credit_card: decimal_col(row, "credit_card")?,
        cash: decimal_col(row, "cash")?,
        created_at: row.try_get("created_at")?,
    })
}

// Insert or replace the reading for a week. Re-entering a week the user
// already recorded overwrites that row rather than duplicating it.
pub async fn upsert_snapshot(
    pool: &Pool<Sqlite>,
    week_of: NaiveDate,
    checking: Decimal,
    savings: Decimal,
    credit_card: Decimal,
    cash: Decimal,
) -> Result<BalanceSnapshot, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO snapshots (week_of, checking, savings, credit_card, cash)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(week_of) DO UPDATE SET
            checking    = excluded.checking,
            savings     = excluded.savings,
            credit_card = excluded.credit_card,
            cash        = excluded.cash
        RETURNING snapshot_id, week_of, checking, savings, credit_card, cash, created_at
        "#,
    )
    .bind(iso(&week_of))
    .bind(checking.to_string())
    .bind(savings.to_string())
    .bind(credit_card.to_string())
    .bind(cash.to_string())
    .fetch_one(pool)
    .await?;

    map_snapshot(&row)
}

pub async fn list_snapshots(pool: &Pool<Sqlite>) -> Result<Vec<BalanceSnapshot>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT snapshot_id, week_of, checking, savings, credit_card, cash, created_at
        FROM snapshots
        ORDER BY week_of ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_snapshot).collect()
}

pub async fn delete_snapshot(pool: &Pool<Sqlite>, snapshot_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM snapshots WHERE snapshot_id = ?")
        .bind(snapshot_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/*==========Chore queries===========*/

fn map_chore(row: &SqliteRow) -> Result<Chore, sqlx::Error> {
    Ok(Chore {
        chore_id: row.try_get("chore_id")?,
        name: row.try_get("name")?,
        cadence_days: row.try_get("cadence_days")?,
        created_on: date_col(row, "created_on")?,
    })
}

pub async fn create_chore(
    pool: &Pool<Sqlite>,
    name: &str,
    cadence_days: i64,
    created_on: NaiveDate,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO chores (name, cadence_days, created_on)
        VALUES (?, ?, ?)
        RETURNING chore_id
        "#,
    )
    .bind(name)
    .bind(cadence_days)
    .bind(iso(&created_on))
    .fetch_one(pool)
    .await?;

    row.try_get("chore_id")
}

pub async fn list_chores(pool: &Pool<Sqlite>) -> Result<Vec<Chore>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT chore_id, name, cadence_days, created_on
        FROM chores
        ORDER BY name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_chore).collect()
}

// Removing a chore takes its completion history with it, atomically.
pub async fn delete_chore(pool: &Pool<Sqlite>, chore_id: i64) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM chore_log WHERE chore_id = ?")
        .bind(chore_id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM chores WHERE chore_id = ?")
        .bind(chore_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

pub async fn log_completion(
    pool: &Pool<Sqlite>,
    chore_id: i64,
    completed_on: NaiveDate,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO chore_log (chore_id, completed_on)
        VALUES (?, ?)
        RETURNING log_id
        "#,
    )
    .bind(chore_id)
    .bind(iso(&completed_on))
    .fetch_one(pool)
    .await?;

    row.try_get("log_id")
}

/// Most recent completion date per chore. Chores never completed are
/// simply absent from the map.
pub async fn last_completions(
    pool: &Pool<Sqlite>,
) -> Result<HashMap<i64, NaiveDate>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT chore_id, MAX(completed_on) AS last_done
        FROM chore_log
        GROUP BY chore_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut out = HashMap::with_capacity(rows.len());
    for row in &rows {
        let chore_id: i64 = row.try_get("chore_id")?;
        out.insert(chore_id, date_col(row, "last_done")?);
    }
    Ok(out)
}

const DEFAULT_CHORES: &[(&str, i64)] = &[
    ("Dishes", 1),
    ("Laundry", 4),
    ("Vacuum", 7),
    ("Clean bathroom", 7),
    ("Mow lawn", 14),
    ("Change furnace filter", 90),
];

// Idempotent: the unique name constraint makes re-runs no-ops.
pub async fn seed_default_chores(pool: &Pool<Sqlite>, today: NaiveDate) -> Result<(), sqlx::Error> {
    for &(name, cadence_days) in DEFAULT_CHORES {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO chores (name, cadence_days, created_on)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(cadence_days)
        .bind(iso(&today))
        .execute(pool)
        .await?;
    }
    Ok(())
}

/*==========Loan ledger queries===========*/

fn map_payment(row: &SqliteRow) -> Result<LoanPayment, sqlx::Error> {
    let status: String = row.try_get("status")?;
    Ok(LoanPayment {
        payment_id: row.try_get("payment_id")?,
        payment_date: date_col(row, "payment_date")?,
        amount_paid: decimal_col(row, "amount_paid")?,
        principal_portion: decimal_col(row, "principal_portion")?,
        interest_portion: decimal_col(row, "interest_portion")?,
        remaining_balance: decimal_col(row, "remaining_balance")?,
        status: PaymentStatus::parse(&status),
    })
}

/// Appends a computed payment to the ledger as cleared. Prior rows are
/// never touched; projections rebuild from the ledger tail on the next
/// read.
pub async fn insert_cleared_payment(
    pool: &Pool<Sqlite>,
    payment: &ScheduledPayment,
) -> Result<LoanPayment, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO loan_payments
            (payment_date, amount_paid, principal_portion, interest_portion, remaining_balance, status)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING payment_id, payment_date, amount_paid, principal_portion,
                  interest_portion, remaining_balance, status
        "#,
    )
    .bind(iso(&payment.date))
    .bind(payment.amount.to_string())
    .bind(payment.principal.to_string())
    .bind(payment.interest.to_string())
    .bind(payment.balance.to_string())
    .bind(PaymentStatus::Cleared.as_str())
    .fetch_one(pool)
    .await?;

    map_payment(&row)
}

/// The cleared ledger in payment order, the engine's only persisted input.
pub async fn list_cleared_payments(pool: &Pool<Sqlite>) -> Result<Vec<LoanPayment>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT payment_id, payment_date, amount_paid, principal_portion,
               interest_portion, remaining_balance, status
        FROM loan_payments
        WHERE status = 'cleared'
        ORDER BY payment_date ASC, payment_id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_payment).collect()
}

pub async fn delete_payment(pool: &Pool<Sqlite>, payment_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM loan_payments WHERE payment_id = ?")
        .bind(payment_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
