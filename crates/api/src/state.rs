use std::sync::Arc;

use photoproof_vision::ObjectVerifier;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: photoproof_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// The photo verifier. A trait object so tests can substitute a stub.
    pub verifier: Arc<dyn ObjectVerifier>,
}
