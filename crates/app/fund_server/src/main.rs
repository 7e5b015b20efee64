//! fund REST API server binary.

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use fund_api::config::ApiConfig;

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "fund_server", about = "fund REST API server")]
struct Args {
    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/fund"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fund_api=debug,fund_core=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    let config = ApiConfig::from_env()?;

    info!(database_url = %args.database_url, "starting fund_server");

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&args.database_url)
        .await?;

    info!("running database migrations");
    fund_api::migrate(&pool).await?;

    let bind_addr = config.bind_addr.clone();
    let state = fund_api::AppState { pool, config };
    let app = fund_api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app).await?;
    Ok(())
}
