// src/backend/handlers.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::backend::AppState;
use crate::chores;
use crate::database::db::queries;
use crate::engine::{self, EngineError, LoanState, ScheduledPayment};

// Store failures leave prior state untouched; the message is all the
// caller gets, retrying the whole action is on them.
fn store_error(e: sqlx::Error) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(e.to_string())).into_response()
}

fn engine_error(e: EngineError) -> Response {
    let code = match e {
        EngineError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        // Computable but reportable conditions, distinct from bad requests.
        EngineError::PaymentBelowInterest { .. } | EngineError::DoesNotAmortize { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    };
    (code, Json(e.to_string())).into_response()
}

fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/*==========Snapshots===========*/

#[derive(Debug, Deserialize, Serialize)]
pub struct UpsertSnapshot {
    pub week_of: NaiveDate,
    pub checking: Decimal,
    pub savings: Decimal,
    pub credit_card: Decimal,
    pub cash: Decimal,
}

pub async fn list_snapshots(State(state): State<AppState>) -> Response {
    match queries::list_snapshots(&state.db).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => store_error(e),
    }
}

pub async fn upsert_snapshot(
    State(state): State<AppState>,
    Json(payload): Json<UpsertSnapshot>,
) -> Response {
    match queries::upsert_snapshot(
        &state.db,
        payload.week_of,
        payload.checking,
        payload.savings,
        payload.credit_card,
        payload.cash,
    )
    .await
    {
        Ok(row) => (StatusCode::OK, Json(row)).into_response(),
        Err(e) => store_error(e),
    }
}

pub async fn delete_snapshot(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match queries::delete_snapshot(&state.db, id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => store_error(e),
    }
}

/*==========Chores===========*/

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateChore {
    pub name: String,
    pub cadence_days: i64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CompleteChore {
    pub completed_on: Option<NaiveDate>,
}

pub async fn chore_board(State(state): State<AppState>) -> Response {
    let chores_list = match queries::list_chores(&state.db).await {
        Ok(c) => c,
        Err(e) => return store_error(e),
    };
    let last_done = match queries::last_completions(&state.db).await {
        Ok(m) => m,
        Err(e) => return store_error(e),
    };
    let board = chores::prioritize(chores_list, &last_done, today());
    (StatusCode::OK, Json(board)).into_response()
}

pub async fn create_chore(
    State(state): State<AppState>,
    Json(payload): Json<CreateChore>,
) -> Response {
    if payload.name.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, Json("name is required".to_string())).into_response();
    }
    if payload.cadence_days < 1 {
        return (
            StatusCode::BAD_REQUEST,
            Json("cadence_days must be at least 1".to_string()),
        )
            .into_response();
    }

    match queries::create_chore(&state.db, payload.name.trim(), payload.cadence_days, today()).await
    {
        Ok(id) => (StatusCode::CREATED, Json(id)).into_response(),
        Err(e) => store_error(e),
    }
}

pub async fn complete_chore(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CompleteChore>,
) -> Response {
    let on = payload.completed_on.unwrap_or_else(today);
    match queries::log_completion(&state.db, id, on).await {
        Ok(log_id) => (StatusCode::CREATED, Json(log_id)).into_response(),
        Err(e) => store_error(e),
    }
}

pub async fn delete_chore(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match queries::delete_chore(&state.db, id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => store_error(e),
    }
}

/*==========Loan===========*/

#[derive(Debug, Serialize)]
pub struct LoanOverview {
    pub state: LoanState,
    pub ledger: Vec<crate::database::models::LoanPayment>,
}

#[derive(Debug, Deserialize)]
pub struct UpcomingParams {
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ExtraPayment {
    pub amount: Decimal,
    pub payment_date: NaiveDate,
}

pub async fn loan_overview(State(state): State<AppState>) -> Response {
    match queries::list_cleared_payments(&state.db).await {
        Ok(ledger) => {
            let loan_state = engine::reconcile_current_state(&ledger, &state.terms);
            (StatusCode::OK, Json(LoanOverview { state: loan_state, ledger })).into_response()
        }
        Err(e) => store_error(e),
    }
}

pub async fn upcoming_payments(
    State(state): State<AppState>,
    Query(params): Query<UpcomingParams>,
) -> Response {
    let ledger = match queries::list_cleared_payments(&state.db).await {
        Ok(l) => l,
        Err(e) => return store_error(e),
    };
    match engine::project_upcoming(&ledger, &state.terms, params.count.unwrap_or(20)) {
        Ok(schedule) => (StatusCode::OK, Json(schedule)).into_response(),
        Err(e) => engine_error(e),
    }
}

pub async fn payoff_projection(State(state): State<AppState>) -> Response {
    let ledger = match queries::list_cleared_payments(&state.db).await {
        Ok(l) => l,
        Err(e) => return store_error(e),
    };
    match engine::project_to_payoff(&ledger, &state.terms) {
        Ok(schedule) => (StatusCode::OK, Json(schedule)).into_response(),
        Err(e) => engine_error(e),
    }
}

pub async fn clear_payment(
    State(state): State<AppState>,
    Json(payload): Json<ScheduledPayment>,
) -> Response {
    match queries::insert_cleared_payment(&state.db, &payload).await {
        Ok(row) => (StatusCode::CREATED, Json(row)).into_response(),
        Err(e) => store_error(e),
    }
}

pub async fn record_extra_payment(
    State(state): State<AppState>,
    Json(payload): Json<ExtraPayment>,
) -> Response {
    let ledger = match queries::list_cleared_payments(&state.db).await {
        Ok(l) => l,
        Err(e) => return store_error(e),
    };
    let loan_state = engine::reconcile_current_state(&ledger, &state.terms);

    let breakdown = match engine::extra_payment(
        payload.amount,
        payload.payment_date,
        loan_state.remaining_balance,
        loan_state.last_payment_date,
        &state.terms,
    ) {
        Ok(b) => b,
        Err(e) => return engine_error(e),
    };

    match queries::insert_cleared_payment(&state.db, &breakdown).await {
        Ok(row) => (StatusCode::CREATED, Json(row)).into_response(),
        Err(e) => store_error(e),
    }
}

pub async fn delete_payment(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match queries::delete_payment(&state.db, id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => store_error(e),
    }
}
