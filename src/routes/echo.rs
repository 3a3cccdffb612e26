//! Catch-all echo endpoint.
//!
//! Reports the request line, the Host header, the downward API environment
//! variables and the contents of every projected metadata file. Internal
//! failures only shrink the output; the response is always 200.

use std::fmt::Write as _;
use std::path::Path;

use axum::{
    extract::State,
    http::{header::HOST, HeaderMap, Method, Uri},
};

use crate::config::{DOWNWARD_ENV_KEYS, EMPTY_VALUE};
use crate::env::or_default;
use crate::podinfo::{self, Scan};
use crate::state::AppState;

/// Echo handler.
pub async fn echo(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> String {
    let count = state.counter.snapshot_and_increment();
    let decoded = urlencoding::decode_binary(uri.path().as_bytes());
    let path = String::from_utf8_lossy(&decoded);

    let summary = format!("{} {} {}", count, method, path);
    tracing::info!("{}", summary);

    let host = headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or_default();

    let mut body = String::new();
    let _ = writeln!(body, "{}", summary);
    let _ = writeln!(body, "path: {}", path);
    let _ = writeln!(body, "Host: {}", or_default(host, EMPTY_VALUE));

    for key in DOWNWARD_ENV_KEYS {
        let _ = writeln!(body, "ENV {} = {}", key, state.env.get_value(key, EMPTY_VALUE));
    }

    let dir = state.podinfo_dir.clone();
    match tokio::task::spawn_blocking(move || file_lines(&dir)).await {
        Ok(lines) => body.extend(lines),
        Err(e) => tracing::error!(error = %e, "Metadata file task failed"),
    }

    body
}

/// Builds one `FILE` line per readable metadata entry under `dir`.
fn file_lines(dir: &Path) -> Vec<String> {
    let entries = match podinfo::scan(dir) {
        Ok(Scan::Entries(entries)) => entries,
        Ok(Scan::Missing) => {
            tracing::info!(dir = %dir.display(), "Metadata directory does not exist");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Metadata directory scan failed");
            return Vec::new();
        }
    };

    entries
        .iter()
        .filter_map(|path| match podinfo::read_contents(path) {
            Ok(data) => Some(format!(
                "FILE {} = {}\n",
                path.display(),
                String::from_utf8_lossy(&data)
            )),
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Failed to read metadata file");
                None
            }
        })
        .collect()
}
