use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use roomshare_core::UserId;

/// Issuer stamped into every session token.
pub const SESSION_ISSUER: &str = "room-rental-platform";

/// Session token claims (transport-agnostic).
///
/// Only the user identity is carried; the role is looked up per request so a
/// role change or deactivation takes effect without re-issuing tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the authenticated user.
    pub sub: UserId,

    /// Issuer, always [`SESSION_ISSUER`].
    pub iss: String,

    /// Issued-at (seconds since the Unix epoch).
    pub iat: i64,

    /// Expiration (seconds since the Unix epoch).
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(sub: UserId, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub,
            iss: SESSION_ISSUER.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("unexpected token issuer")]
    WrongIssuer,
}

/// Deterministically validate session claims against `now`.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// [`crate::session`].
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.iss != SESSION_ISSUER {
        return Err(TokenValidationError::WrongIssuer);
    }
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims_at(now: DateTime<Utc>) -> SessionClaims {
        SessionClaims::new(UserId::new(), now, now + Duration::days(7))
    }

    #[test]
    fn fresh_claims_are_valid() {
        let now = Utc::now();
        assert_eq!(validate_claims(&claims_at(now), now), Ok(()));
    }

    #[test]
    fn expired_claims_are_rejected() {
        let now = Utc::now();
        let claims = claims_at(now);
        let later = now + Duration::days(7);
        assert_eq!(validate_claims(&claims, later), Err(TokenValidationError::Expired));
    }

    #[test]
    fn claims_from_the_future_are_rejected() {
        let now = Utc::now();
        let claims = claims_at(now + Duration::minutes(5));
        assert_eq!(validate_claims(&claims, now), Err(TokenValidationError::NotYetValid));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        let mut claims = claims_at(now);
        claims.exp = claims.iat;
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let now = Utc::now();
        let mut claims = claims_at(now);
        claims.iss = "someone-else".to_string();
        assert_eq!(validate_claims(&claims, now), Err(TokenValidationError::WrongIssuer));
    }
}
