//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or a `&mut PgConnection` where the call participates
//! in a transaction) as the first argument.

pub mod attempt_repo;
pub mod auth_session_repo;
pub mod invitation_repo;
pub mod step_repo;
pub mod survey_repo;
pub mod survey_session_repo;
pub mod user_repo;

pub use attempt_repo::AttemptRepo;
pub use auth_session_repo::AuthSessionRepo;
pub use invitation_repo::InvitationRepo;
pub use step_repo::StepRepo;
pub use survey_repo::SurveyRepo;
pub use survey_session_repo::SurveySessionRepo;
pub use user_repo::UserRepo;
