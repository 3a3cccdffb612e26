//! podecho: a diagnostic echo service for pods.
//!
//! This is the application entry point. It initializes tracing, resolves the
//! configuration from the environment, logs the build identity and downward
//! API metadata, sets up the Axum router, and starts the HTTP server.

mod config;
mod env;
mod http;
mod middleware;
mod podinfo;
mod routes;
mod state;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{
    LogFormat, ServiceConfig, DEFAULT_LOG_FILTER, DOWNWARD_ENV_KEYS, EMPTY_VALUE,
};
use env::{EnvSource, ProcessEnv};
use podinfo::Scan;
use routes::{create_router, shutdown::ProcessExit};
use state::{AppState, BuildInfo};

/// podecho: echoes requests along with pod metadata
#[derive(Parser, Debug)]
#[command(name = "podecho", version, about)]
struct Args {
    /// Log level filter (e.g., "podecho=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Directory of projected downward API files (overrides PODINFO_DIR)
    #[arg(long)]
    podinfo_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    match args.log_format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }

    let env: Arc<dyn EnvSource> = Arc::new(ProcessEnv);
    let mut config = ServiceConfig::from_env(env.as_ref())?;
    if let Some(dir) = args.podinfo_dir {
        config.podinfo_dir = dir;
    }

    let build = BuildInfo::current();
    tracing::info!(
        version = build.version,
        build_time = build.build_time,
        "build version/time: {}/{}",
        build.version,
        build.build_time
    );

    for key in DOWNWARD_ENV_KEYS {
        tracing::info!("ENV {} = {}", key, env.get_value(key, EMPTY_VALUE));
    }

    log_podinfo(&config.podinfo_dir);

    tracing::info!(app_context = %config.app_context, "Echo handler mounted");

    let state = AppState::new(
        build,
        env,
        config.podinfo_dir.clone(),
        Arc::new(ProcessExit),
    );
    let app = create_router(state, &config.app_context);

    http::start_server(app, config.listen_addr()).await?;

    Ok(())
}

/// Logs the metadata entries present at startup.
fn log_podinfo(dir: &Path) {
    match podinfo::scan(dir) {
        Ok(Scan::Missing) => {
            tracing::info!(dir = %dir.display(), "Metadata directory does not exist");
        }
        Ok(Scan::Entries(entries)) => {
            if entries.is_empty() {
                tracing::info!(dir = %dir.display(), "No metadata files found");
            }
            for entry in entries {
                tracing::info!("FILE {}", entry.display());
            }
        }
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Metadata directory scan failed");
        }
    }
}
