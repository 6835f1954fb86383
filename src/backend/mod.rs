mod handlers;
mod routes;

use axum::{routing::get, Router};
use log::info;
use sqlx::{Pool, Sqlite};
use std::net::SocketAddr;

use crate::engine::LoanTerms;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
    pub terms: LoanTerms,
}

pub async fn run_server(pool: Pool<Sqlite>, terms: LoanTerms) -> anyhow::Result<()> {
    let state = AppState { db: pool, terms };

    let app = Router::new()
        .route("/health", get(|| async { "Tracker backend is running" }))
        .merge(routes::api_routes())
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
