//! Invitation token generation and expiry policy.
//!
//! An invitation is a single-use-per-completion grant: it references one
//! survey, carries an opaque unguessable token, and expires at a timestamp
//! fixed at creation. Expiry is evaluated on every resolution, never cached
//! and never extended.

use chrono::Duration;
use rand::distr::Alphanumeric;
use rand::Rng;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Default invitation lifetime. A policy constant, not a design constraint.
pub const INVITATION_TTL_DAYS: i64 = 30;

/// Token length in alphanumeric characters. 43 chars over a 62-symbol
/// alphabet is ~256 bits of entropy.
pub const TOKEN_LENGTH: usize = 43;

/// Generate an opaque invitation token from the OS-seeded thread RNG.
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Expiry timestamp for an invitation created at `now`.
pub fn default_expiry(now: Timestamp) -> Timestamp {
    now + Duration::days(INVITATION_TTL_DAYS)
}

/// Check that an invitation is still usable at `now`.
pub fn ensure_usable(expires_at: Timestamp, now: Timestamp) -> Result<(), CoreError> {
    if now > expires_at {
        return Err(CoreError::Expired(format!(
            "Invitation expired at {}",
            expires_at.to_rfc3339()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn tokens_are_long_and_alphanumeric() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn default_expiry_is_thirty_days_out() {
        let now = Utc::now();
        assert_eq!(default_expiry(now) - now, Duration::days(INVITATION_TTL_DAYS));
    }

    #[test]
    fn unexpired_invitation_is_usable() {
        let now = Utc::now();
        assert!(ensure_usable(now + Duration::hours(1), now).is_ok());
    }

    #[test]
    fn expired_invitation_is_rejected() {
        let now = Utc::now();
        let err = ensure_usable(now - Duration::seconds(1), now).unwrap_err();
        assert!(matches!(err, CoreError::Expired(_)));
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        // Exactly at expires_at the invitation is still usable; only
        // strictly-after fails.
        let now = Utc::now();
        assert!(ensure_usable(now, now).is_ok());
    }
}
