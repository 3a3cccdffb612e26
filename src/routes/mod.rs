//! HTTP route handlers.
//!
//! `/healthz` and `/shutdown` are fixed routes. The echo handler is mounted at
//! the configured application context and, for the default context `/`, acts
//! as the fallback for every other path.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod echo;
pub mod health;
pub mod shutdown;

use axum::{middleware, routing::any, Router};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{CACHE_CONTROL_NO_STORE, HEALTH_PATH, SHUTDOWN_PATH};
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Creates the Axum router with all routes mounted.
///
/// A context ending in `/` covers its whole subtree; any other context is an
/// exact path. `app_context` must already be validated.
pub fn create_router(state: AppState, app_context: &str) -> Router {
    let router = Router::new()
        .route(HEALTH_PATH, any(health::health))
        .route(SHUTDOWN_PATH, any(shutdown::shutdown));

    let router = if app_context == "/" {
        router.fallback(echo::echo)
    } else if let Some(prefix) = app_context.strip_suffix('/') {
        router
            .route(app_context, any(echo::echo))
            .route(&format!("{}/{{*rest}}", prefix), any(echo::echo))
    } else {
        router.route(app_context, any(echo::echo))
    };

    router
        .with_state(state)
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_NO_STORE),
        ))
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
