use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use panopticon_core::store::StatsStore;
use panopticon_duckdb::DuckDbBackend;
use panopticon_server::{app::build_app, config::Config, state::AppState};

/// `panopticon health`: liveness check for container health checks.
///
/// Calls `GET http://localhost:$PANOPTICON_PORT/health`.
/// Exits 0 if the server responds with HTTP 200, exits 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("PANOPTICON_PORT").unwrap_or_else(|_| "9001".to_string());
    let url = format!("http://localhost:{}/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }
    // Structured JSON logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("panopticon=info".parse()?),
        )
        .json()
        .init();

    let cfg = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    if let Some(parent) = std::path::Path::new(&cfg.db_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)?;
    }

    // Opening provisions both stats tables; any failure here is fatal.
    let db = DuckDbBackend::open(&cfg.db_path, &cfg.duckdb_memory_limit, cfg.placeholder)?;
    let store: Arc<dyn StatsStore> = Arc::new(db);
    let state = Arc::new(AppState::new(store, cfg.clone()));

    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = build_app(state);

    info!(port = cfg.port, placeholder = ?cfg.placeholder, "Panopticon listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        tokio::signal::ctrl_c().await.ok();
    })
    .await?;

    Ok(())
}
