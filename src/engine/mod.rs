//! Loan amortization engine.
//!
//! Pure functions that project a bi-weekly payment schedule forward from a
//! balance and date, reconcile the cleared-payment ledger into a current
//! state, and split an out-of-cycle extra payment into interest and
//! principal. Nothing here touches the database; callers fetch the ledger,
//! call in, and persist the results.
//!
//! Two interest conventions coexist on purpose, matching the tracked loan's
//! actual servicing behavior:
//! - scheduled payments accrue at a fixed per-period rate, `annual_rate / 26`;
//! - extra payments accrue daily simple interest, `annual_rate / 365` per
//!   elapsed day since the last payment.
//! They are implemented separately and must not be mixed in one computation.

use chrono::{Days, NaiveDate};
use log::trace;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::database::models::LoanPayment;

/// Bi-weekly periods in a year. The per-period rate divisor for scheduled
/// payments, regardless of calendar drift.
const PERIODS_PER_YEAR: u32 = 26;

/// Divisor for the daily simple-interest rate used by extra payments.
const DAYS_PER_YEAR: u32 = 365;

/// Upper bound on payoff projection length. A loan whose payment barely
/// covers interest never reaches zero; tripping this guard is reported as
/// `DoesNotAmortize` rather than returning a truncated schedule.
const MAX_PROJECTION_PERIODS: usize = 1000;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("payment {payment} does not cover interest {interest} accrued by {date}")]
    PaymentBelowInterest {
        date: NaiveDate,
        payment: Decimal,
        interest: Decimal,
    },

    #[error("balance does not reach zero within {periods} periods under current terms")]
    DoesNotAmortize { periods: usize },
}

/// Fixed terms of the tracked loan. Loaded once at startup from the
/// environment; every projection derives from these plus the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanTerms {
    pub principal: Decimal,
    pub annual_rate: Decimal,
    pub payment_amount: Decimal,
    /// Calendar days between scheduled payments. Raw day arithmetic, not
    /// locale-aware "two weeks".
    pub period_days: u64,
    /// Date the first scheduled payment falls due.
    pub start_date: NaiveDate,
}

impl LoanTerms {
    /// Reads `LOAN_PRINCIPAL`, `LOAN_ANNUAL_RATE`, `LOAN_PAYMENT_AMOUNT`
    /// and `LOAN_START_DATE`, falling back to the defaults below for any
    /// that are unset. A variable that is set but malformed is an error,
    /// not a silent zero.
    pub fn from_env() -> Result<Self, EngineError> {
        Ok(Self {
            principal: env_decimal("LOAN_PRINCIPAL", "22000")?,
            annual_rate: env_decimal("LOAN_ANNUAL_RATE", "0.05")?,
            payment_amount: env_decimal("LOAN_PAYMENT_AMOUNT", "275")?,
            period_days: 14,
            start_date: env_date("LOAN_START_DATE", "2025-01-03")?,
        })
    }

    fn period_rate(&self) -> Decimal {
        self.annual_rate / Decimal::from(PERIODS_PER_YEAR)
    }

    fn daily_rate(&self) -> Decimal {
        self.annual_rate / Decimal::from(DAYS_PER_YEAR)
    }
}

fn env_decimal(key: &'static str, default: &str) -> Result<Decimal, EngineError> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    Decimal::from_str(raw.trim()).map_err(|e| EngineError::InvalidInput {
        field: key,
        reason: format!("{raw:?}: {e}"),
    })
}

fn env_date(key: &'static str, default: &str) -> Result<NaiveDate, EngineError> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| EngineError::InvalidInput {
        field: key,
        reason: format!("{raw:?}: {e}"),
    })
}

/// A projected future payment. Same shape as a ledger row minus id and
/// status; recomputed from the ledger tail on every read, never stored
/// until the user clears it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPayment {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub interest: Decimal,
    pub principal: Decimal,
    pub balance: Decimal,
}

/// Current position of the loan, reconciled from the cleared ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanState {
    pub remaining_balance: Decimal,
    pub total_interest_paid: Decimal,
    pub total_principal_paid: Decimal,
    pub last_payment_date: NaiveDate,
    pub next_payment_date: NaiveDate,
}

/// Projects up to `period_count` scheduled payments starting at
/// `start_date`. Stops early once the balance reaches zero. A step where
/// the payment does not cover accrued interest aborts the projection with
/// `PaymentBelowInterest`.
pub fn project_schedule(
    start_balance: Decimal,
    start_date: NaiveDate,
    period_count: usize,
    terms: &LoanTerms,
) -> Result<Vec<ScheduledPayment>, EngineError> {
    let period_rate = terms.period_rate();
    let mut schedule = Vec::new();
    let mut balance = start_balance;
    let mut date = start_date;

    while balance > Decimal::ZERO && schedule.len() < period_count {
        let interest = balance * period_rate;
        if terms.payment_amount <= interest {
            return Err(EngineError::PaymentBelowInterest {
                date,
                payment: terms.payment_amount,
                interest,
            });
        }

        let principal = (terms.payment_amount - interest).min(balance);
        balance = (balance - principal).max(Decimal::ZERO);
        trace!("projected {date}: interest {interest}, principal {principal}, balance {balance}");

        schedule.push(ScheduledPayment {
            date,
            amount: interest + principal,
            interest,
            principal,
            balance,
        });
        date = date + Days::new(terms.period_days);
    }
    Ok(schedule)
}

/// Folds the cleared ledger (ordered by payment date ascending) into the
/// loan's current state. An empty ledger reconciles to the original
/// principal with the first payment due on the start date.
pub fn reconcile_current_state(ledger: &[LoanPayment], terms: &LoanTerms) -> LoanState {
    let remaining_balance = ledger
        .last()
        .map(|p| p.remaining_balance)
        .unwrap_or(terms.principal);
    let last_payment_date = ledger
        .last()
        .map(|p| p.payment_date)
        .unwrap_or(terms.start_date - Days::new(terms.period_days));

    LoanState {
        remaining_balance,
        total_interest_paid: ledger.iter().map(|p| p.interest_portion).sum(),
        total_principal_paid: ledger.iter().map(|p| p.principal_portion).sum(),
        last_payment_date,
        next_payment_date: last_payment_date + Days::new(terms.period_days),
    }
}

/// Reconciles the ledger and projects the next `count` scheduled payments
/// from where it left off.
pub fn project_upcoming(
    ledger: &[LoanPayment],
    terms: &LoanTerms,
    count: usize,
) -> Result<Vec<ScheduledPayment>, EngineError> {
    let state = reconcile_current_state(ledger, terms);
    project_schedule(state.remaining_balance, state.next_payment_date, count, terms)
}

/// Projects all the way to payoff. The schedule ends with a zero balance;
/// if zero is not reached within the iteration guard the terms do not
/// amortize and that is reported as a distinct condition.
pub fn project_to_payoff(
    ledger: &[LoanPayment],
    terms: &LoanTerms,
) -> Result<Vec<ScheduledPayment>, EngineError> {
    let schedule = project_upcoming(ledger, terms, MAX_PROJECTION_PERIODS)?;
    match schedule.last() {
        Some(last) if last.balance > Decimal::ZERO => Err(EngineError::DoesNotAmortize {
            periods: MAX_PROJECTION_PERIODS,
        }),
        _ => Ok(schedule),
    }
}

/// Splits an ad hoc extra payment into interest and principal. Interest
/// accrues at the daily simple rate over the whole days elapsed since the
/// last payment (truncating). Rejects non-positive amounts, a date before
/// the last payment, and a payment that does not cover accrued interest.
pub fn extra_payment(
    amount: Decimal,
    payment_date: NaiveDate,
    current_balance: Decimal,
    last_payment_date: NaiveDate,
    terms: &LoanTerms,
) -> Result<ScheduledPayment, EngineError> {
    if amount <= Decimal::ZERO {
        return Err(EngineError::InvalidInput {
            field: "amount",
            reason: format!("must be positive, got {amount}"),
        });
    }
    if payment_date < last_payment_date {
        return Err(EngineError::InvalidInput {
            field: "payment_date",
            reason: format!("{payment_date} is before the last payment on {last_payment_date}"),
        });
    }

    let days = payment_date
        .signed_duration_since(last_payment_date)
        .num_days();
    let interest = current_balance * terms.daily_rate() * Decimal::from(days);
    if amount <= interest {
        return Err(EngineError::PaymentBelowInterest {
            date: payment_date,
            payment: amount,
            interest,
        });
    }

    let principal = (amount - interest).min(current_balance);
    let balance = (current_balance - principal).max(Decimal::ZERO);
    trace!("extra payment {payment_date}: {days} days accrued, interest {interest}, principal {principal}");

    Ok(ScheduledPayment {
        date: payment_date,
        amount: interest + principal,
        interest,
        principal,
        balance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::PaymentStatus;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use test_log::test;

    fn terms() -> LoanTerms {
        LoanTerms {
            principal: dec!(22000),
            annual_rate: dec!(0.05),
            payment_amount: dec!(275),
            period_days: 14,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
        }
    }

    fn cleared(date: NaiveDate, interest: Decimal, principal: Decimal, balance: Decimal) -> LoanPayment {
        LoanPayment {
            payment_id: 1,
            payment_date: date,
            amount_paid: interest + principal,
            principal_portion: principal,
            interest_portion: interest,
            remaining_balance: balance,
            status: PaymentStatus::Cleared,
        }
    }

    #[test]
    fn first_period_splits_at_biweekly_rate() {
        let t = terms();
        let schedule = project_schedule(t.principal, t.start_date, 1, &t).unwrap();
        assert_eq!(schedule.len(), 1);

        let first = &schedule[0];
        assert_eq!(first.date, t.start_date);
        assert_eq!(first.interest.round_dp(2), dec!(42.31));
        assert_eq!(first.principal.round_dp(2), dec!(232.69));
        assert_eq!(first.balance.round_dp(2), dec!(21767.31));
        assert_eq!(first.amount, t.payment_amount);
    }

    #[test]
    fn dates_advance_fourteen_calendar_days() {
        let t = terms();
        let schedule = project_schedule(t.principal, t.start_date, 4, &t).unwrap();
        let dates: Vec<NaiveDate> = schedule.iter().map(|p| p.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 17).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
                NaiveDate::from_ymd_opt(2025, 2, 14).unwrap(),
            ]
        );
    }

    #[test]
    fn balance_is_monotonic_and_ends_at_exactly_zero() {
        let t = terms();
        let schedule = project_to_payoff(&[], &t).unwrap();
        assert!(schedule.len() < MAX_PROJECTION_PERIODS);

        let mut prev = t.principal;
        for p in &schedule {
            assert!(p.balance <= prev, "balance rose at {}", p.date);
            assert_eq!(p.amount, p.interest + p.principal);
            prev = p.balance;
        }
        assert_eq!(schedule.last().unwrap().balance, Decimal::ZERO);
        // Final payment covers only what is left, not the full installment.
        assert!(schedule.last().unwrap().amount < t.payment_amount);
    }

    #[test]
    fn empty_ledger_reconciles_to_fresh_loan() {
        let t = terms();
        let state = reconcile_current_state(&[], &t);
        assert_eq!(state.remaining_balance, dec!(22000));
        assert_eq!(state.total_interest_paid, Decimal::ZERO);
        assert_eq!(state.total_principal_paid, Decimal::ZERO);
        assert_eq!(state.next_payment_date, t.start_date);
    }

    #[test]
    fn reconcile_sums_portions_and_takes_tail_balance() {
        let t = terms();
        let d1 = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 1, 17).unwrap();
        let ledger = vec![
            cleared(d1, dec!(42.31), dec!(232.69), dec!(21767.31)),
            cleared(d2, dec!(41.86), dec!(233.14), dec!(21534.17)),
        ];

        let state = reconcile_current_state(&ledger, &t);
        assert_eq!(state.remaining_balance, dec!(21534.17));
        assert_eq!(state.total_interest_paid, dec!(84.17));
        assert_eq!(state.total_principal_paid, dec!(465.83));
        assert_eq!(state.last_payment_date, d2);
        assert_eq!(state.next_payment_date, NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
    }

    #[test]
    fn upcoming_projection_is_idempotent() {
        let t = terms();
        let ledger = vec![cleared(
            t.start_date,
            dec!(42.31),
            dec!(232.69),
            dec!(21767.31),
        )];
        let a = project_upcoming(&ledger, &t, 20).unwrap();
        let b = project_upcoming(&ledger, &t, 20).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 20);
        assert_eq!(a[0].date, t.start_date + Days::new(14));
    }

    #[test]
    fn payment_below_interest_is_rejected() {
        let mut t = terms();
        t.payment_amount = dec!(40);
        let err = project_schedule(t.principal, t.start_date, 10, &t).unwrap_err();
        match err {
            EngineError::PaymentBelowInterest { date, payment, interest } => {
                assert_eq!(date, t.start_date);
                assert_eq!(payment, dec!(40));
                assert_eq!(interest.round_dp(2), dec!(42.31));
            }
            other => panic!("expected PaymentBelowInterest, got {other:?}"),
        }
    }

    #[test]
    fn stalling_terms_report_does_not_amortize() {
        // 43 covers the first period's interest of ~42.31 but payoff would
        // take well over a thousand periods.
        let mut t = terms();
        t.payment_amount = dec!(43);
        assert_eq!(
            project_to_payoff(&[], &t).unwrap_err(),
            EngineError::DoesNotAmortize { periods: MAX_PROJECTION_PERIODS }
        );
    }

    #[test]
    fn extra_payment_accrues_daily_simple_interest() {
        let t = terms();
        let last = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
        let paid = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();

        let p = extra_payment(dec!(500), paid, dec!(21767.31), last, &t).unwrap();
        assert_eq!(p.date, paid);
        assert_eq!(p.interest.round_dp(2), dec!(29.82));
        assert_eq!(p.principal.round_dp(2), dec!(470.18));
        assert_eq!(p.balance.round_dp(2), dec!(21297.13));
        assert_eq!(p.amount, dec!(500));
    }

    #[test]
    fn extra_payment_same_day_accrues_nothing() {
        let t = terms();
        let day = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
        let p = extra_payment(dec!(100), day, dec!(1000), day, &t).unwrap();
        assert_eq!(p.interest, Decimal::ZERO);
        assert_eq!(p.principal, dec!(100));
        assert_eq!(p.balance, dec!(900));
    }

    #[test]
    fn extra_payment_larger_than_balance_pays_off() {
        let t = terms();
        let last = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
        let paid = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let p = extra_payment(dec!(500), paid, dec!(200), last, &t).unwrap();
        assert_eq!(p.principal, dec!(200));
        assert_eq!(p.balance, Decimal::ZERO);
        // Only interest plus the remaining principal is applied.
        assert!(p.amount < dec!(500));
    }

    #[test]
    fn extra_payment_rejects_bad_input() {
        let t = terms();
        let last = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
        let paid = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();

        assert!(matches!(
            extra_payment(Decimal::ZERO, paid, dec!(1000), last, &t),
            Err(EngineError::InvalidInput { field: "amount", .. })
        ));
        assert!(matches!(
            extra_payment(dec!(-5), paid, dec!(1000), last, &t),
            Err(EngineError::InvalidInput { field: "amount", .. })
        ));
        assert!(matches!(
            extra_payment(dec!(100), last, dec!(1000), paid, &t),
            Err(EngineError::InvalidInput { field: "payment_date", .. })
        ));
    }
}
