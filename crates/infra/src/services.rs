//! Shared application services: repositories plus the token codec, and the
//! session/permission checks every request goes through.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use farmhub_auth::{Hs256Jwt, JwtClaims, JwtIssuer, JwtValidator, Permission, User, hash_password, specs};
use farmhub_core::{Entity, UserId, ValidationErrors};

use crate::dispatch::RequestContext;
use crate::error::AppError;
use crate::handlers::auth::check_new_password;
use crate::repository::Repository;
use crate::store::Repositories;

pub struct Services {
    pub repos: Repositories,
    jwt: Hs256Jwt,
}

impl Services {
    pub fn new(repos: Repositories, jwt_secret: &[u8]) -> Self {
        Self {
            repos,
            jwt: Hs256Jwt::new(jwt_secret),
        }
    }

    pub fn issue_token(&self, claims: &JwtClaims) -> Result<String, AppError> {
        Ok(self.jwt.issue(claims)?)
    }

    /// Names of the user's live permission grants.
    pub async fn granted_permissions(&self, user_id: UserId) -> Result<Vec<String>, AppError> {
        let grants = self.repos.permissions.list(&specs::permissions_of(user_id)).await?;
        Ok(grants.into_iter().map(|g| g.permission_name().to_string()).collect())
    }

    /// `Unauthorized` when there is no live user behind `user_id`; otherwise
    /// whether `required` is granted (admins always pass).
    pub async fn check_permission(&self, user_id: Option<UserId>, required: &Permission) -> Result<bool, AppError> {
        let user = match user_id {
            Some(id) => self.repos.users.get(id).await?,
            None => None,
        };
        let granted = match &user {
            Some(u) if !u.is_admin() => self.granted_permissions(*u.id()).await?,
            _ => Vec::new(),
        };
        Ok(farmhub_auth::check_permission(
            user.as_ref(),
            granted.iter().map(String::as_str),
            required,
        )?)
    }

    /// Resolve a bearer token to a request context.
    ///
    /// The token must verify and be inside its time window, its `sid` must
    /// name an active session of its `sub`, and that user must still exist.
    /// The session's last-seen time is moved forward on success.
    pub async fn authenticate(&self, token: &str, now: DateTime<Utc>) -> Result<RequestContext, AppError> {
        let claims = self.jwt.validate(token, now).map_err(|e| {
            debug!(error = %e, "token rejected");
            AppError::Unauthorized
        })?;

        let mut session = self
            .repos
            .sessions
            .first(&specs::active_session(claims.sid))
            .await?
            .ok_or(AppError::Unauthorized)?;
        if session.user_id() != claims.sub {
            return Err(AppError::Unauthorized);
        }
        if self.repos.users.get(claims.sub).await?.is_none() {
            return Err(AppError::Unauthorized);
        }

        if session.update_last_seen_at(now) {
            self.repos.sessions.update(&session).await?;
        }
        Ok(RequestContext::authenticated(claims.sub, claims.sid, now))
    }

    /// Create an admin account unless a user with this login already exists.
    ///
    /// Returns whether a user was created.
    pub async fn seed_admin(&self, login: &str, password: &str, now: DateTime<Utc>) -> Result<bool, AppError> {
        let mut errors = ValidationErrors::new();
        check_new_password(&mut errors, "password", password);
        errors.into_result()?;
        if self.repos.users.exists(&specs::user_by_login(login)).await? {
            debug!(login, "admin seed skipped; login exists");
            return Ok(false);
        }
        let mut admin = User::create(login, "Administrator", true, None, now)?;
        admin.set_password(hash_password(password)?, None, now)?;
        self.repos.users.add(&admin).await?;
        info!(login = admin.login(), "seeded admin user");
        Ok(true)
    }
}
