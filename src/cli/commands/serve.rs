use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::server::{AppState, build_app};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Handle the `serve` command: bring up the ingestion listener and block
/// until it exits.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Serve {
        host,
        port,
        received_dir,
    } = cmd
    else {
        return Ok(());
    };

    let host = host.clone().unwrap_or_else(|| cfg.host.clone());
    let port = port.unwrap_or(cfg.port);
    let received_dir = PathBuf::from(
        received_dir
            .clone()
            .unwrap_or_else(|| cfg.received_dir.clone()),
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_server(&cfg.database, &host, port, received_dir))
}

async fn run_server(
    db_path: &str,
    host: &str,
    port: u16,
    received_dir: PathBuf,
) -> AppResult<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pomolog=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting pomolog ingestion server");

    let pool = DbPool::new(db_path)?;
    init_db(&pool.conn)?;
    tracing::info!(database = db_path, "Database ready");

    let state = AppState::new(pool.conn, received_dir.clone());
    let app = build_app(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        addr = %addr,
        received_dir = %received_dir.display(),
        "Listening for transitions"
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Other(format!("server error: {}", e)))?;

    Ok(())
}
