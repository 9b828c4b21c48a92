//! `farmhub-auth`: users, sessions and the permission check.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod permissions;
pub mod session;
pub mod token;
pub mod user;

pub use authorize::{AuthzError, authorize, check_permission, has_permission};
pub use claims::{JwtClaims, TokenValidationError, token_lifetime, validate_claims};
pub use password::{PasswordError, hash_password, verify_password};
pub use permissions::{Permission, catalog};
pub use session::{SessionOrderBy, UserSession};
pub use token::{Hs256Jwt, JwtIssuer, JwtValidator, TokenError};
pub use user::{User, UserOrderBy, UserPermission};

/// Named query specifications used by the auth handlers and middleware.
pub mod specs {
    use farmhub_core::{SessionId, Specification, UserId};

    use crate::{User, UserPermission, UserSession};

    pub fn user_by_login(login: &str) -> Specification<User> {
        Specification::new().eq("login", login.trim())
    }

    pub fn permissions_of(user_id: UserId) -> Specification<UserPermission> {
        Specification::new().eq("user_id", user_id)
    }

    pub fn sessions_of(user_id: UserId) -> Specification<UserSession> {
        Specification::new().eq("user_id", user_id)
    }

    pub fn active_sessions_of(user_id: UserId) -> Specification<UserSession> {
        sessions_of(user_id).is_null("deactivated_at")
    }

    /// Lookup by the token's `sid`; deactivated sessions never match.
    pub fn active_session(session_id: SessionId) -> Specification<UserSession> {
        Specification::new()
            .eq("session_id", session_id)
            .is_null("deactivated_at")
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use farmhub_core::UserId;

    use super::*;

    #[test]
    fn deactivated_session_is_not_found_by_sid() {
        let now = Utc::now();
        let mut session = UserSession::start(UserId::new(), false, now);
        let spec = specs::active_session(session.session_id());
        assert!(spec.is_satisfied_by(&session));

        session.deactivate(now);
        session.update_last_seen_at(now + Duration::minutes(5));
        assert!(!session.is_active());
        assert!(!spec.is_satisfied_by(&session));
        assert!(specs::sessions_of(session.user_id()).is_satisfied_by(&session));
    }

    #[test]
    fn login_lookup_trims() {
        let user = User::create("ola", "Ola", false, None, Utc::now()).unwrap();
        assert!(specs::user_by_login(" ola ").is_satisfied_by(&user));
        assert!(!specs::user_by_login("Ola").is_satisfied_by(&user));
    }
}
