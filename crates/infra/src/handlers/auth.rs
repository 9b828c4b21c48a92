//! Login, logout and self-service session handling.

use serde::{Deserialize, Serialize};
use tracing::info;

use farmhub_auth::{
    JwtClaims, SessionOrderBy, User, UserSession, catalog, hash_password, specs, verify_password,
};
use farmhub_core::{Entity, Page, PageRequest, UserSessionId, Validate, ValidationErrors};

use crate::dispatch::{Access, Handler, Request, RequestContext};
use crate::error::AppError;
use crate::handlers::load;
use crate::repository::{Repository, paged};
use crate::services::Services;

pub const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn check_new_password(errors: &mut ValidationErrors, field: &str, password: &str) {
    errors.check(
        password.chars().count() >= MIN_PASSWORD_LEN,
        field,
        format!("must be at least {MIN_PASSWORD_LEN} characters"),
    );
}

#[derive(Debug, Clone, Deserialize)]
pub struct Login {
    pub login: String,
    pub password: String,
    #[serde(default)]
    pub long_valid: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub claims: JwtClaims,
    pub user: User,
}

impl Request for Login {
    type Response = LoginResult;
    const NAME: &'static str = "Login";
    const ACCESS: Access = Access::Public;

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .require_non_blank("login", &self.login)
            .check(!self.password.is_empty(), "password", "must not be empty");
        errors.into_result()
    }
}

#[async_trait::async_trait]
impl Handler<Login> for Services {
    async fn handle(&self, ctx: &RequestContext, request: Login) -> Result<LoginResult, AppError> {
        // Unknown login, missing password and wrong password all look the same.
        let user = self
            .repos
            .users
            .first(&specs::user_by_login(&request.login))
            .await?
            .ok_or(AppError::Unauthorized)?;
        let hash = user.password_hash().ok_or(AppError::Unauthorized)?;
        if !verify_password(&request.password, hash)? {
            return Err(AppError::Unauthorized);
        }

        let session = UserSession::start(*user.id(), request.long_valid, ctx.now);
        self.repos.sessions.add(&session).await?;

        let claims = JwtClaims::new(*user.id(), session.session_id(), user.login(), request.long_valid, ctx.now);
        let token = self.issue_token(&claims)?;
        info!(login = user.login(), session_id = %session.session_id(), "user logged in");

        Ok(LoginResult { token, claims, user })
    }
}

/// Deactivate the caller's own session.
#[derive(Debug, Clone, Copy, Default)]
pub struct Logout;

impl Request for Logout {
    type Response = ();
    const NAME: &'static str = "Logout";
    const ACCESS: Access = Access::Authenticated;
}

#[async_trait::async_trait]
impl Handler<Logout> for Services {
    async fn handle(&self, ctx: &RequestContext, _request: Logout) -> Result<(), AppError> {
        let Some(session_id) = ctx.session_id else {
            return Err(AppError::Unauthorized);
        };
        if let Some(mut session) = self.repos.sessions.first(&specs::active_session(session_id)).await? {
            session.deactivate(ctx.now);
            self.repos.sessions.update(&session).await?;
            info!(session_id = %session_id, "user logged out");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserWithPermissions {
    pub user: User,
    pub permissions: Vec<String>,
}

impl Services {
    pub(crate) async fn with_permissions(&self, user: User) -> Result<UserWithPermissions, AppError> {
        let mut permissions = self.granted_permissions(*user.id()).await?;
        permissions.sort();
        Ok(UserWithPermissions { user, permissions })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GetCurrentUser;

impl Request for GetCurrentUser {
    type Response = UserWithPermissions;
    const NAME: &'static str = "GetCurrentUser";
    const ACCESS: Access = Access::Authenticated;
}

#[async_trait::async_trait]
impl Handler<GetCurrentUser> for Services {
    async fn handle(&self, ctx: &RequestContext, _request: GetCurrentUser) -> Result<UserWithPermissions, AppError> {
        let user = load(self.repos.users.as_ref(), ctx.require_user()?, "user").await?;
        self.with_permissions(user).await
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListMySessions {
    pub page: PageRequest<SessionOrderBy>,
}

impl Request for ListMySessions {
    type Response = Page<UserSession>;
    const NAME: &'static str = "ListMySessions";
    const ACCESS: Access = Access::Authenticated;

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.page.validate()
    }
}

#[async_trait::async_trait]
impl Handler<ListMySessions> for Services {
    async fn handle(&self, ctx: &RequestContext, request: ListMySessions) -> Result<Page<UserSession>, AppError> {
        let spec = specs::sessions_of(ctx.require_user()?);
        Ok(paged(self.repos.sessions.as_ref(), spec, &request.page).await?)
    }
}

/// Force a session out (administrative).
#[derive(Debug, Clone, Copy)]
pub struct RevokeSession {
    pub id: UserSessionId,
}

impl Request for RevokeSession {
    type Response = UserSession;
    const NAME: &'static str = "RevokeSession";
    const ACCESS: Access = Access::Permission(catalog::USERS_MANAGE);
}

#[async_trait::async_trait]
impl Handler<RevokeSession> for Services {
    async fn handle(&self, ctx: &RequestContext, request: RevokeSession) -> Result<UserSession, AppError> {
        let mut session = load(self.repos.sessions.as_ref(), request.id, "session").await?;
        session.deactivate(ctx.now);
        self.repos.sessions.update(&session).await?;
        info!(session_id = %session.session_id(), user_id = %session.user_id(), "session revoked");
        Ok(session)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeOwnPassword {
    pub current_password: String,
    pub new_password: String,
}

impl Request for ChangeOwnPassword {
    type Response = ();
    const NAME: &'static str = "ChangeOwnPassword";
    const ACCESS: Access = Access::Authenticated;

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(!self.current_password.is_empty(), "current_password", "must not be empty");
        check_new_password(&mut errors, "new_password", &self.new_password);
        errors.into_result()
    }
}

#[async_trait::async_trait]
impl Handler<ChangeOwnPassword> for Services {
    async fn handle(&self, ctx: &RequestContext, request: ChangeOwnPassword) -> Result<(), AppError> {
        let mut user = load(self.repos.users.as_ref(), ctx.require_user()?, "user").await?;
        let matches = match user.password_hash() {
            Some(hash) => verify_password(&request.current_password, hash)?,
            None => false,
        };
        if !matches {
            return Err(AppError::validation("current_password", "is incorrect"));
        }
        user.set_password(hash_password(&request.new_password)?, ctx.actor(), ctx.now)?;
        self.repos.users.update(&user).await?;
        Ok(())
    }
}
