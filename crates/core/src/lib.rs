//! Pure domain logic for the PhotoProof platform.
//!
//! Everything in this crate is side-effect free: the session state machine,
//! the photo payload rules, the invitation token policy, and the shared
//! error taxonomy. Persistence and HTTP concerns live in the `db` and `api`
//! crates respectively.

pub mod error;
pub mod invitation;
pub mod photo;
pub mod session;
pub mod types;
pub mod verification;
