//! Session issuing and verification (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use roomshare_core::UserId;

use crate::claims::{SessionClaims, TokenValidationError, validate_claims};

/// Default session lifetime (seven days).
pub fn default_session_ttl() -> Duration {
    Duration::days(7)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("failed to sign session token: {0}")]
    Signing(String),

    #[error("invalid or expired session")]
    InvalidOrExpired,
}

impl From<TokenValidationError> for SessionError {
    fn from(_: TokenValidationError) -> Self {
        SessionError::InvalidOrExpired
    }
}

/// A freshly issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies opaque bearer tokens bound to a user identity.
pub trait SessionIssuer: Send + Sync {
    fn issue(&self, user_id: UserId, now: DateTime<Utc>) -> Result<IssuedSession, SessionError>;

    /// Returns the claims of a valid, unexpired token.
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, SessionError>;
}

/// HMAC-SHA256 signed JWT sessions with a fixed lifetime.
pub struct Hs256SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Hs256SessionIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }
}

impl SessionIssuer for Hs256SessionIssuer {
    fn issue(&self, user_id: UserId, now: DateTime<Utc>) -> Result<IssuedSession, SessionError> {
        let expires_at = now + self.ttl;
        let claims = SessionClaims::new(user_id, now, expires_at);
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| SessionError::Signing(e.to_string()))?;
        Ok(IssuedSession { token, expires_at })
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, SessionError> {
        // Time checks run against the caller's clock in `validate_claims`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "session token rejected");
                SessionError::InvalidOrExpired
            })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

/// Parse a session lifetime such as `7d`, `12h`, `30m`, `45s` or bare seconds.
pub fn parse_expiry(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (digits, unit) = match raw.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&raw[..idx], Some(c)),
        _ => (raw, None),
    };
    let n: i64 = digits.parse().ok().filter(|n| *n > 0)?;

    match unit {
        None | Some('s') => Duration::try_seconds(n),
        Some('m') => Duration::try_minutes(n),
        Some('h') => Duration::try_hours(n),
        Some('d') => Duration::try_days(n),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> Hs256SessionIssuer {
        Hs256SessionIssuer::new(b"test-secret", default_session_ttl())
    }

    #[test]
    fn issued_token_verifies_to_same_subject() {
        let now = Utc::now();
        let user_id = UserId::new();
        let session = issuer().issue(user_id, now).unwrap();

        let claims = issuer().verify(&session.token, now).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(session.expires_at, now + default_session_ttl());
    }

    #[test]
    fn token_expires_after_ttl() {
        let now = Utc::now();
        let session = issuer().issue(UserId::new(), now).unwrap();

        let err = issuer()
            .verify(&session.token, now + default_session_ttl() + Duration::seconds(1))
            .unwrap_err();
        assert_eq!(err, SessionError::InvalidOrExpired);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let now = Utc::now();
        let other = Hs256SessionIssuer::new(b"other-secret", default_session_ttl());
        let session = other.issue(UserId::new(), now).unwrap();

        assert_eq!(
            issuer().verify(&session.token, now).unwrap_err(),
            SessionError::InvalidOrExpired
        );
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert_eq!(
            issuer().verify("not.a.jwt", Utc::now()).unwrap_err(),
            SessionError::InvalidOrExpired
        );
    }

    #[test]
    fn parse_expiry_understands_units() {
        assert_eq!(parse_expiry("7d"), Some(Duration::days(7)));
        assert_eq!(parse_expiry("12h"), Some(Duration::hours(12)));
        assert_eq!(parse_expiry("30m"), Some(Duration::minutes(30)));
        assert_eq!(parse_expiry("45s"), Some(Duration::seconds(45)));
        assert_eq!(parse_expiry("3600"), Some(Duration::seconds(3600)));
    }

    #[test]
    fn parse_expiry_rejects_nonsense() {
        assert_eq!(parse_expiry(""), None);
        assert_eq!(parse_expiry("0d"), None);
        assert_eq!(parse_expiry("-1h"), None);
        assert_eq!(parse_expiry("7w"), None);
        assert_eq!(parse_expiry("days"), None);
    }
}
