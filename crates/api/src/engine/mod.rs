//! Orchestration between the HTTP handlers, the core transition policy,
//! the verifier, and the repositories.

pub mod session;
