//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) where PATCH exists

pub mod attempt;
pub mod auth_session;
pub mod invitation;
pub mod step;
pub mod survey;
pub mod survey_session;
pub mod user;
