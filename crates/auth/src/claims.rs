use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use farmhub_core::{SessionId, UserId};

/// Token lifetime for a regular login.
pub const SHORT_TOKEN_LIFETIME_HOURS: i64 = 12;
/// Token lifetime when the user asked to stay signed in.
pub const LONG_TOKEN_LIFETIME_DAYS: i64 = 30;

pub fn token_lifetime(long_valid: bool) -> Duration {
    if long_valid {
        Duration::days(LONG_TOKEN_LIFETIME_DAYS)
    } else {
        Duration::hours(SHORT_TOKEN_LIFETIME_HOURS)
    }
}

/// JWT claims model (transport-agnostic).
///
/// `iat`/`exp` are seconds since the Unix epoch, as in RFC 7519.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the user id.
    pub sub: UserId,

    /// Server-side session the token belongs to.
    pub sid: SessionId,

    pub login: String,

    /// Issued for an extended ("remember me") lifetime.
    pub long_valid: bool,

    pub iat: i64,

    pub exp: i64,
}

impl JwtClaims {
    pub fn new(
        user_id: UserId,
        session_id: SessionId,
        login: impl Into<String>,
        long_valid: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: user_id,
            sid: session_id,
            login: login.into(),
            long_valid,
            iat: now.timestamp(),
            exp: (now + token_lifetime(long_valid)).timestamp(),
        }
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.iat, 0).single()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate JWT claims against `now`.
///
/// Note: this validates the *claims* only. Signature verification / decoding
/// happens in [`crate::token`].
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
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

    fn claims(long_valid: bool, now: DateTime<Utc>) -> JwtClaims {
        JwtClaims::new(UserId::new(), SessionId::new(), "ola", long_valid, now)
    }

    #[test]
    fn lifetime_depends_on_long_valid() {
        let now = Utc::now();
        let short = claims(false, now);
        let long = claims(true, now);
        assert_eq!(short.exp - short.iat, 12 * 3600);
        assert_eq!(long.exp - long.iat, 30 * 24 * 3600);
    }

    #[test]
    fn window_checks() {
        let now = Utc::now();
        let c = claims(false, now);
        assert_eq!(validate_claims(&c, now), Ok(()));
        assert_eq!(
            validate_claims(&c, now - Duration::minutes(1)),
            Err(TokenValidationError::NotYetValid)
        );
        assert_eq!(
            validate_claims(&c, now + Duration::hours(12)),
            Err(TokenValidationError::Expired)
        );

        let mut broken = c.clone();
        broken.exp = broken.iat;
        assert_eq!(validate_claims(&broken, now), Err(TokenValidationError::InvalidTimeWindow));
    }
}
