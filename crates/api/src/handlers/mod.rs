//! HTTP handlers.
//!
//! Admin endpoints require a JWT via [`crate::middleware::auth::AuthUser`];
//! the public run endpoints are gated by the invitation token in the path.

pub mod auth;
pub mod invitations;
pub mod runs;
pub mod sessions;
pub mod steps;
pub mod surveys;
pub mod users;

use validator::Validate;

use crate::error::AppError;

/// Run `validator` rules on a request DTO, mapping violations to a 400.
pub(crate) fn validate_input<T: Validate>(input: &T) -> Result<(), AppError> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}
