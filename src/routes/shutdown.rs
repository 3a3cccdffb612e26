//! Abrupt process termination endpoint.
//!
//! The handler does not exit by itself. It calls the [`Terminate`] hook it
//! was given through [`AppState`], which in production is [`ProcessExit`].

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Capability to end the process.
pub trait Terminate: Send + Sync {
    fn terminate(&self, code: i32);
}

/// Exits immediately. In-flight requests and unsent responses are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExit;

impl Terminate for ProcessExit {
    fn terminate(&self, code: i32) {
        std::process::exit(code);
    }
}

/// Shutdown handler. Only returns if the terminator does.
pub async fn shutdown(State(state): State<AppState>) -> StatusCode {
    tracing::warn!(requests = state.counter.current(), "About to abruptly exit");
    state.terminator.terminate(0);
    StatusCode::OK
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::Terminate;

    /// Records termination requests instead of exiting.
    #[derive(Debug, Default)]
    pub struct RecordingTerminator(Mutex<Vec<i32>>);

    impl RecordingTerminator {
        pub fn calls(&self) -> Vec<i32> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Terminate for RecordingTerminator {
        fn terminate(&self, code: i32) {
            self.0.lock().unwrap().push(code);
        }
    }
}
