//! User administration and the permission-check query.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use farmhub_auth::{Permission, User, UserOrderBy, UserPermission, catalog, hash_password, specs};
use farmhub_core::{Entity, Page, PageRequest, UserId, Validate, ValidationErrors, soft_delete};

use crate::dispatch::{Access, Handler, Request, RequestContext};
use crate::error::AppError;
use crate::handlers::auth::{UserWithPermissions, check_new_password};
use crate::handlers::load;
use crate::repository::{Repository, paged};
use crate::services::Services;

fn check_permission_names(errors: &mut ValidationErrors, names: &[String]) {
    for name in names {
        errors.check(Permission::is_known(name), "permissions", format!("unknown permission '{name}'"));
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub login: String,
    pub name: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Request for CreateUser {
    type Response = UserWithPermissions;
    const NAME: &'static str = "CreateUser";
    const ACCESS: Access = Access::Permission(catalog::USERS_MANAGE);

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .require_non_blank("login", &self.login)
            .require_non_blank("name", &self.name);
        if let Some(password) = &self.password {
            check_new_password(&mut errors, "password", password);
        }
        check_permission_names(&mut errors, &self.permissions);
        errors.into_result()
    }
}

#[async_trait::async_trait]
impl Handler<CreateUser> for Services {
    async fn handle(&self, ctx: &RequestContext, request: CreateUser) -> Result<UserWithPermissions, AppError> {
        if self.repos.users.exists(&specs::user_by_login(&request.login)).await? {
            return Err(AppError::conflict(format!("login '{}' is already taken", request.login.trim())));
        }

        let mut user = User::create(&request.login, &request.name, request.is_admin, ctx.actor(), ctx.now)?;
        if let Some(password) = &request.password {
            user.set_password(hash_password(password)?, ctx.actor(), ctx.now)?;
        }
        self.repos.users.add(&user).await?;
        self.replace_permissions(*user.id(), &request.permissions, ctx).await?;
        info!(login = user.login(), "user created");

        self.with_permissions(user).await
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListUsers {
    pub page: PageRequest<UserOrderBy>,
}

impl Request for ListUsers {
    type Response = Page<User>;
    const NAME: &'static str = "ListUsers";
    const ACCESS: Access = Access::Permission(catalog::USERS_MANAGE);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.page.validate()
    }
}

#[async_trait::async_trait]
impl Handler<ListUsers> for Services {
    async fn handle(&self, _ctx: &RequestContext, request: ListUsers) -> Result<Page<User>, AppError> {
        Ok(paged(self.repos.users.as_ref(), farmhub_core::Specification::new(), &request.page).await?)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetUser {
    pub id: UserId,
}

impl Request for GetUser {
    type Response = UserWithPermissions;
    const NAME: &'static str = "GetUser";
    const ACCESS: Access = Access::Permission(catalog::USERS_MANAGE);
}

#[async_trait::async_trait]
impl Handler<GetUser> for Services {
    async fn handle(&self, _ctx: &RequestContext, request: GetUser) -> Result<UserWithPermissions, AppError> {
        let user = load(self.repos.users.as_ref(), request.id, "user").await?;
        self.with_permissions(user).await
    }
}

#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub id: UserId,
    pub name: String,
    pub is_admin: bool,
}

impl Request for UpdateUser {
    type Response = User;
    const NAME: &'static str = "UpdateUser";
    const ACCESS: Access = Access::Permission(catalog::USERS_MANAGE);

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_non_blank("name", &self.name);
        errors.into_result()
    }
}

#[async_trait::async_trait]
impl Handler<UpdateUser> for Services {
    async fn handle(&self, ctx: &RequestContext, request: UpdateUser) -> Result<User, AppError> {
        let mut user = load(self.repos.users.as_ref(), request.id, "user").await?;
        user.change_name(&request.name, ctx.actor(), ctx.now)?;
        user.set_admin(request.is_admin, ctx.actor(), ctx.now);
        self.repos.users.update(&user).await?;
        Ok(user)
    }
}

#[derive(Debug, Clone)]
pub struct SetUserPassword {
    pub id: UserId,
    pub password: String,
}

impl Request for SetUserPassword {
    type Response = ();
    const NAME: &'static str = "SetUserPassword";
    const ACCESS: Access = Access::Permission(catalog::USERS_MANAGE);

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_new_password(&mut errors, "password", &self.password);
        errors.into_result()
    }
}

#[async_trait::async_trait]
impl Handler<SetUserPassword> for Services {
    async fn handle(&self, ctx: &RequestContext, request: SetUserPassword) -> Result<(), AppError> {
        let mut user = load(self.repos.users.as_ref(), request.id, "user").await?;
        user.set_password(hash_password(&request.password)?, ctx.actor(), ctx.now)?;
        self.repos.users.update(&user).await?;
        Ok(())
    }
}

/// Replace the user's grants with exactly `permissions` (duplicates ignored).
#[derive(Debug, Clone)]
pub struct UpdateUserPermissions {
    pub id: UserId,
    pub permissions: Vec<String>,
}

impl Request for UpdateUserPermissions {
    type Response = Vec<String>;
    const NAME: &'static str = "UpdateUserPermissions";
    const ACCESS: Access = Access::Permission(catalog::USERS_MANAGE);

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_permission_names(&mut errors, &self.permissions);
        errors.into_result()
    }
}

impl Services {
    /// Revoke grants not in `wanted`, grant the missing ones. Existing grants
    /// that stay are left untouched.
    async fn replace_permissions(
        &self,
        user_id: UserId,
        wanted: &[String],
        ctx: &RequestContext,
    ) -> Result<(), AppError> {
        let wanted: BTreeSet<&str> = wanted.iter().map(String::as_str).collect();
        let current = self.repos.permissions.list(&specs::permissions_of(user_id)).await?;

        let mut kept = BTreeSet::new();
        for mut grant in current {
            if wanted.contains(grant.permission_name()) && kept.insert(grant.permission_name().to_string()) {
                continue;
            }
            soft_delete(&mut grant, ctx.actor(), ctx.now);
            self.repos.permissions.update(&grant).await?;
        }

        for name in wanted.into_iter().filter(|n| !kept.contains(*n)) {
            let grant = UserPermission::grant(user_id, &Permission::new(name.to_string()), ctx.actor(), ctx.now)?;
            self.repos.permissions.add(&grant).await?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Handler<UpdateUserPermissions> for Services {
    async fn handle(&self, ctx: &RequestContext, request: UpdateUserPermissions) -> Result<Vec<String>, AppError> {
        let user = load(self.repos.users.as_ref(), request.id, "user").await?;
        self.replace_permissions(*user.id(), &request.permissions, ctx).await?;
        info!(user_id = %user.id(), "permissions replaced");
        Ok(self.with_permissions(user).await?.permissions)
    }
}

/// Soft-delete a user, revoke their grants and end their sessions.
#[derive(Debug, Clone, Copy)]
pub struct DeleteUser {
    pub id: UserId,
}

impl Request for DeleteUser {
    type Response = ();
    const NAME: &'static str = "DeleteUser";
    const ACCESS: Access = Access::Permission(catalog::USERS_MANAGE);
}

#[async_trait::async_trait]
impl Handler<DeleteUser> for Services {
    async fn handle(&self, ctx: &RequestContext, request: DeleteUser) -> Result<(), AppError> {
        if ctx.user_id == Some(request.id) {
            return Err(AppError::conflict("cannot delete the signed-in user"));
        }
        let mut user = load(self.repos.users.as_ref(), request.id, "user").await?;

        for mut session in self.repos.sessions.list(&specs::active_sessions_of(request.id)).await? {
            session.deactivate(ctx.now);
            self.repos.sessions.update(&session).await?;
        }
        self.replace_permissions(request.id, &[], ctx).await?;

        soft_delete(&mut user, ctx.actor(), ctx.now);
        self.repos.users.update(&user).await?;
        info!(login = user.login(), "user deleted");
        Ok(())
    }
}

/// Whether the caller holds `permission`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckPermission {
    pub permission: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PermissionCheck {
    pub permission: String,
    pub granted: bool,
}

impl Request for CheckPermission {
    type Response = PermissionCheck;
    const NAME: &'static str = "CheckPermission";
    const ACCESS: Access = Access::Authenticated;

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_non_blank("permission", &self.permission);
        errors.into_result()
    }
}

#[async_trait::async_trait]
impl Handler<CheckPermission> for Services {
    async fn handle(&self, ctx: &RequestContext, request: CheckPermission) -> Result<PermissionCheck, AppError> {
        let permission = request.permission.trim().to_string();
        let granted = self
            .check_permission(ctx.user_id, &Permission::new(permission.clone()))
            .await?;
        Ok(PermissionCheck { permission, granted })
    }
}
