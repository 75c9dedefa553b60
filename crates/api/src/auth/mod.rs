//! Admin authentication: Argon2id password hashing and JWT tokens.

pub mod jwt;
pub mod password;
