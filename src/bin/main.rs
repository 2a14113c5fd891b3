//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Entry point: loads configuration, connects to Postgres and runs migrations, spawns the
// processor worker, wires the submission facade into the axum HTTP surface, and serves until
// shutdown. To run migrations and exit without starting the server: `--migrate-only`.
//--------------------------------------------------------------------------------------------------

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use lemon_matching_engine::api::{self, AppState};
use lemon_matching_engine::facade::SubmissionFacade;
use lemon_matching_engine::processor::Processor;
use lemon_matching_engine::{Config, HttpExchangeClient, PgOrderStore};

#[derive(Parser, Debug)]
#[command(name = "matching-engine", about = "Order ingestion and matching engine")]
struct Opt {
    /// Run pending schema migrations and exit, without starting the worker or HTTP server.
    #[arg(long)]
    migrate_only: bool,

    /// Overrides `API_PORT` from the environment.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let opt = Opt::parse();
    let config = Config::from_env();

    let store = PgOrderStore::connect(&config.database_url()).await?;
    store.run_migrations().await?;
    tracing::info!("schema migrations applied");

    if opt.migrate_only {
        return Ok(());
    }

    let store = Arc::new(store);
    let exchange = Arc::new(HttpExchangeClient::new(config.exchange_url.clone()));
    let (processor_handle, _processor_join) = Processor::spawn(
        store.clone(),
        exchange,
        config.max_retries,
        config.retry_delay,
    );

    let facade = SubmissionFacade::new(store.clone(), processor_handle);
    let state = Arc::new(AppState::new(facade, store));
    let router = api::build_router(state);

    let port = opt.port.unwrap_or(config.api_port);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    api::serve(addr, router).await?;

    Ok(())
}
