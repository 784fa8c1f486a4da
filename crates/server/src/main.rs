//! `sheetshape`: serve the column reorder / prune / revert API.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use sheetshape_config::{ConfigError, Settings};
use sheetshape_core::{OperationsConfig, RetryPolicy, SheetOperations};
use sheetshape_server::{build_router, AppState};
use sheetshape_sheets_client::{load_auth, ClientOptions, SheetsClient};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sheetshape", version, about = "Reorder or prune spreadsheet columns over HTTP")]
struct Args {
    /// Settings file (default: <config dir>/sheetshape/settings.toml)
    #[arg(long, env = "SHEETSHAPE_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides server.bind
    #[arg(long)]
    bind: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let settings = match load_settings(&args) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::from(2);
        }
    };

    let state = match build_state(&settings) {
        Ok(state) => state,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let bind = args.bind.unwrap_or_else(|| settings.server.bind.clone());
    match serve(&bind, state) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_settings(args: &Args) -> Result<Settings, ConfigError> {
    match &args.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
}

fn operations_config(settings: &Settings) -> OperationsConfig {
    OperationsConfig {
        retry: RetryPolicy {
            max_attempts: settings.retry.max_attempts,
            base_delay: settings.retry.base_delay(),
            max_jitter: settings.retry.max_jitter(),
            ..RetryPolicy::default()
        },
        on_prune_failure: settings.snapshot.on_prune_failure,
    }
}

/// Without credentials the server still runs; the API reports the problem.
fn build_state(settings: &Settings) -> Result<AppState, String> {
    let Some(creds) = load_auth() else {
        log::warn!("no access token found; API calls will fail until one is configured");
        return Ok(AppState::unauthenticated());
    };

    let options = ClientOptions {
        api_base: settings.sheets.api_base.clone(),
        last_column: settings.sheets.last_column.clone(),
        timeout: settings.sheets.timeout(),
    };
    let client = SheetsClient::new(creds, options).map_err(|e| e.to_string())?;
    let operations = SheetOperations::with_memory_store(Arc::new(client), operations_config(settings));
    Ok(AppState::new(Arc::new(operations)))
}

fn serve(bind: &str, state: AppState) -> std::io::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(bind).await?;
        log::info!("sheetshape listening on http://{}", listener.local_addr()?);

        axum::serve(listener, build_router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("shutting down");
}
