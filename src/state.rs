//! Shared application state for request handlers.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::config::{BUILD_TIME, BUILD_VERSION};
use crate::env::EnvSource;
use crate::routes::shutdown::Terminate;

/// Version and build timestamp fixed at compile time.
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    #[serde(rename = "Version")]
    pub version: &'static str,
    #[serde(rename = "BuildTime")]
    pub build_time: &'static str,
}

impl BuildInfo {
    pub const fn current() -> Self {
        Self {
            version: BUILD_VERSION,
            build_time: BUILD_TIME,
        }
    }
}

/// Count of echo requests handled by this process.
#[derive(Debug, Default)]
pub struct RequestCounter(AtomicU64);

impl RequestCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current value and increments it in one atomic step.
    pub fn snapshot_and_increment(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Built once at startup. Handlers reach the environment, the metadata
/// directory, the request counter, and the process termination hook only
/// through this struct.
#[derive(Clone)]
pub struct AppState {
    pub build: Arc<BuildInfo>,
    pub env: Arc<dyn EnvSource>,
    pub podinfo_dir: Arc<PathBuf>,
    pub counter: Arc<RequestCounter>,
    pub terminator: Arc<dyn Terminate>,
}

impl AppState {
    pub fn new(
        build: BuildInfo,
        env: Arc<dyn EnvSource>,
        podinfo_dir: PathBuf,
        terminator: Arc<dyn Terminate>,
    ) -> Self {
        Self {
            build: Arc::new(build),
            env,
            podinfo_dir: Arc::new(podinfo_dir),
            counter: Arc::new(RequestCounter::new()),
            terminator,
        }
    }
}
