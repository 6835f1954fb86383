// src/main.rs
use std::env;

use dotenvy::dotenv;
use household_tracker::database::db::{connection, queries};
use household_tracker::engine::LoanTerms;
use household_tracker::{backend, cli};
use log::LevelFilter;
use simple_logger::SimpleLogger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()?;

    let terms = LoanTerms::from_env()?;

    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && args[1] == "server" {
        let pool = connection::get_db_pool().await?;
        connection::run_migrations(&pool).await?;
        queries::seed_default_chores(&pool, cli::util::today()).await?;

        backend::run_server(pool, terms).await?;
    } else {
        cli::run(terms).await?;
    }
    Ok(())
}
