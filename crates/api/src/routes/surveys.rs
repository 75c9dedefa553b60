//! Route definitions for the admin CRUD surface.
//!
//! ```text
//! GET    /surveys                      list_surveys
//! POST   /surveys                      create_survey
//! GET    /surveys/{id}                 get_survey
//! PUT    /surveys/{id}                 update_survey
//! DELETE /surveys/{id}                 delete_survey
//! GET    /surveys/{id}/steps           list_steps
//! POST   /surveys/{id}/steps           create_step
//! GET    /surveys/{id}/invitations     list_invitations
//! POST   /surveys/{id}/invitations     create_invitation
//! PUT    /steps/{id}                   update_step
//! DELETE /steps/{id}                   delete_step
//! GET    /sessions/{id}/attempts       list_attempts
//! ```

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{invitations, sessions, steps, surveys};
use crate::state::AppState;

/// Admin CRUD routes, merged directly under `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/surveys",
            get(surveys::list_surveys).post(surveys::create_survey),
        )
        .route(
            "/surveys/{id}",
            get(surveys::get_survey)
                .put(surveys::update_survey)
                .delete(surveys::delete_survey),
        )
        .route(
            "/surveys/{id}/steps",
            get(steps::list_steps).post(steps::create_step),
        )
        .route(
            "/surveys/{id}/invitations",
            get(invitations::list_invitations).post(invitations::create_invitation),
        )
        .route(
            "/steps/{id}",
            put(steps::update_step).delete(steps::delete_step),
        )
        .route("/sessions/{id}/attempts", get(sessions::list_attempts))
}
