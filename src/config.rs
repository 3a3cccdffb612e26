//! Configuration loading and constants.
//!
//! The service is configured entirely from the environment, as is usual for
//! a pod. `ServiceConfig` is resolved once at startup through an [`EnvSource`]
//! so the same code path can be exercised against a fake environment.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::env::EnvSource;

// =============================================================================
// Environment Variable Names
// =============================================================================

/// Listen port
pub const ENV_PORT: &str = "PORT";

/// Base path the echo handler is mounted at
pub const ENV_APP_CONTEXT: &str = "APP_CONTEXT";

/// Listen address
pub const ENV_LISTEN_HOST: &str = "LISTEN_HOST";

/// Directory holding projected downward API files
pub const ENV_PODINFO_DIR: &str = "PODINFO_DIR";

/// Downward API variables surfaced by the echo endpoint, in output order.
pub const DOWNWARD_ENV_KEYS: &[&str] = &[
    "MY_NODE_NAME",
    "MY_POD_NAME",
    "MY_POD_IP",
    "MY_POD_SERVICE_ACCOUNT",
    "MY_POD_LABEL_APP",
    "MY_POD_ANNOTATION_AUTHOR",
    "MY_POD_MEM_LIMIT_MB",
    "MY_POD_MEM_REQUEST_MB",
];

// =============================================================================
// Defaults
// =============================================================================

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_APP_CONTEXT: &str = "/";
pub const DEFAULT_LISTEN_HOST: &str = "0.0.0.0";
pub const DEFAULT_PODINFO_DIR: &str = "/etc/podinfo";

/// Placeholder printed for unset variables and a missing Host header
pub const EMPTY_VALUE: &str = "empty";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "podecho=info,tower_http=info";

/// Cache-Control for every response; diagnostics must never be served stale
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

// =============================================================================
// Routes
// =============================================================================

pub const HEALTH_PATH: &str = "/healthz";
pub const SHUTDOWN_PATH: &str = "/shutdown";

// =============================================================================
// Build Identity
// =============================================================================

/// Version string, stamped at build time via `PODECHO_VERSION`
pub const BUILD_VERSION: &str = match option_env!("PODECHO_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

/// Build timestamp, stamped at build time via `PODECHO_BUILD_TIME`
pub const BUILD_TIME: &str = match option_env!("PODECHO_BUILD_TIME") {
    Some(t) => t,
    None => "unknown",
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Base route for the echo handler, always starting with '/'
    pub app_context: String,
    pub podinfo_dir: PathBuf,
}

impl ServiceConfig {
    /// Resolves the configuration from the environment, applying defaults
    /// for anything unset or empty.
    pub fn from_env(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let port_raw = env.get_value(ENV_PORT, &DEFAULT_PORT.to_string());
        let port = port_raw
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(port_raw.clone()))?;

        let host_raw = env.get_value(ENV_LISTEN_HOST, DEFAULT_LISTEN_HOST);
        let host = host_raw.parse::<IpAddr>().map_err(|_| {
            ConfigError::Validation(format!("{} is not an IP address: {}", ENV_LISTEN_HOST, host_raw))
        })?;

        let app_context = env.get_value(ENV_APP_CONTEXT, DEFAULT_APP_CONTEXT);
        validate_app_context(&app_context)?;

        let podinfo_dir = PathBuf::from(env.get_value(ENV_PODINFO_DIR, DEFAULT_PODINFO_DIR));

        Ok(Self {
            host,
            port,
            app_context,
            podinfo_dir,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn validate_app_context(context: &str) -> Result<(), ConfigError> {
    if !context.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "{} must start with '/': {}",
            ENV_APP_CONTEXT, context
        )));
    }
    if context == HEALTH_PATH || context == SHUTDOWN_PATH {
        return Err(ConfigError::Validation(format!(
            "{} collides with a reserved route: {}",
            ENV_APP_CONTEXT, context
        )));
    }
    // Braces would be parsed as route parameters
    if context.contains(['{', '}']) {
        return Err(ConfigError::Validation(format!(
            "{} must not contain '{{' or '}}': {}",
            ENV_APP_CONTEXT, context
        )));
    }
    // Legacy `:param` / `*wildcard` segments are rejected by the router
    if context
        .split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
    {
        return Err(ConfigError::Validation(format!(
            "{} segments must not start with ':' or '*': {}",
            ENV_APP_CONTEXT, context
        )));
    }
    Ok(())
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port: {0}")]
    InvalidPort(String),
    #[error("Configuration error: {0}")]
    Validation(String),
}
