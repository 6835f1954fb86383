use axum::{
    routing::{delete, get, post},
    Router,
};
use crate::backend::{handlers, AppState};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/snapshots",
            get(handlers::list_snapshots).post(handlers::upsert_snapshot),
        )
        .route("/api/snapshots/:id", delete(handlers::delete_snapshot))
        .route(
            "/api/chores",
            get(handlers::chore_board).post(handlers::create_chore),
        )
        .route("/api/chores/:id/complete", post(handlers::complete_chore))
        .route("/api/chores/:id", delete(handlers::delete_chore))
        .route("/api/loan", get(handlers::loan_overview))
        .route("/api/loan/upcoming", get(handlers::upcoming_payments))
        .route("/api/loan/payoff", get(handlers::payoff_projection))
        .route("/api/loan/payments", post(handlers::clear_payment))
        .route("/api/loan/payments/:id", delete(handlers::delete_payment))
        .route("/api/loan/extra", post(handlers::record_extra_payment))
}
