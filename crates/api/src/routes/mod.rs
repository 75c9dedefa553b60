pub mod admin;
pub mod auth;
pub mod health;
pub mod runs;
pub mod surveys;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                       login (public)
/// /auth/refresh                     refresh (public)
/// /auth/logout                      logout (requires auth)
///
/// /admin/users                      list, create (admin only)
/// /admin/users/{id}                 get, update, deactivate
/// /admin/users/{id}/reset-password  reset password
///
/// /surveys                          list, create
/// /surveys/{id}                     get, update, delete (logical)
/// /surveys/{id}/steps               list, create
/// /surveys/{id}/invitations         list, create
/// /steps/{id}                       update, delete
/// /sessions/{id}/attempts           attempt ledger (?step_id=)
///
/// /run/{token}                      access gate resolution (public)
/// /run/{token}/start                start or resume session (public)
/// /run/{token}/attempts             submit photo (public)
/// /run/{token}/override             use photo anyway (public)
/// /run/{token}/progress             read-only progress (public)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (login, refresh, logout).
        .nest("/auth", auth::router())
        // User management (admin role required).
        .nest("/admin", admin::router())
        // Survey CRUD (JWT required per handler).
        .merge(surveys::router())
        // Public run endpoints, gated by the invitation token.
        .nest("/run", runs::router())
}
