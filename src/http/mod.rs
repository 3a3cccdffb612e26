//! HTTP server module.
//!
//! Binds the listener, serves the router, and stops gracefully on
//! SIGTERM/SIGINT. The `/shutdown` route is separate and exits abruptly.

mod server;
mod shutdown;

pub use server::start_server;
