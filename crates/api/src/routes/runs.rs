//! Route definitions for the public run surface.
//!
//! ```text
//! GET  /{token}            get_run
//! POST /{token}/start      start_run
//! POST /{token}/attempts   submit_attempt
//! POST /{token}/override   override_step
//! GET  /{token}/progress   get_progress
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::runs;
use crate::state::AppState;

/// Routes mounted at `/run`. Token-gated, no login.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{token}", get(runs::get_run))
        .route("/{token}/start", post(runs::start_run))
        .route("/{token}/attempts", post(runs::submit_attempt))
        .route("/{token}/override", post(runs::override_step))
        .route("/{token}/progress", get(runs::get_progress))
}
