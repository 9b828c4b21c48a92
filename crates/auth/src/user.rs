//! User and granted-permission entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farmhub_core::{
    Audit, DomainError, DomainResult, Entity, OrderField, UserId, UserPermissionId, ValidationErrors,
};

use crate::Permission;

pub const MAX_LOGIN_LEN: usize = 64;
pub const MAX_NAME_LEN: usize = 128;

/// Application user.
///
/// # Invariants
/// - `login` and `name` are never blank (trimmed on the way in).
/// - A password hash, once set, is never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    login: String,
    name: String,
    password_hash: Option<String>,
    is_admin: bool,
    #[serde(flatten)]
    audit: Audit,
}

impl User {
    pub fn create(
        login: &str,
        name: &str,
        is_admin: bool,
        by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let mut errors = ValidationErrors::new();
        errors
            .require_non_blank("login", login)
            .require_max_len("login", login.trim(), MAX_LOGIN_LEN)
            .require_non_blank("name", name)
            .require_max_len("name", name.trim(), MAX_NAME_LEN);
        errors.into_result()?;

        Ok(Self {
            id: UserId::new(),
            login: login.trim().to_string(),
            name: name.trim().to_string(),
            password_hash: None,
            is_admin,
            audit: Audit::new(by, now),
        })
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn password_hash(&self) -> Option<&str> {
        self.password_hash.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.audit.created_at
    }

    /// Store an already-hashed password. Hashing lives in [`crate::password`].
    pub fn set_password(
        &mut self,
        hash: impl Into<String>,
        by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let hash = hash.into();
        if hash.trim().is_empty() {
            return Err(DomainError::validation("password", "must not be empty"));
        }
        self.password_hash = Some(hash);
        self.audit.touch(by, now);
        Ok(())
    }

    pub fn change_name(&mut self, name: &str, by: Option<UserId>, now: DateTime<Utc>) -> DomainResult<()> {
        let mut errors = ValidationErrors::new();
        errors
            .require_non_blank("name", name)
            .require_max_len("name", name.trim(), MAX_NAME_LEN);
        errors.into_result()?;
        self.name = name.trim().to_string();
        self.audit.touch(by, now);
        Ok(())
    }

    pub fn set_admin(&mut self, is_admin: bool, by: Option<UserId>, now: DateTime<Utc>) {
        self.is_admin = is_admin;
        self.audit.touch(by, now);
    }
}

impl Entity for User {
    type Id = UserId;
    const KIND: &'static str = "users";

    fn id(&self) -> &UserId {
        &self.id
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserOrderBy {
    Login,
    Name,
    CreatedAt,
}

impl OrderField for UserOrderBy {
    fn field(&self) -> &'static str {
        match self {
            UserOrderBy::Login => "login",
            UserOrderBy::Name => "name",
            UserOrderBy::CreatedAt => "created_at",
        }
    }
}

/// A (user, permission name) grant. Revoking soft-deletes the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermission {
    id: UserPermissionId,
    user_id: UserId,
    permission_name: String,
    #[serde(flatten)]
    audit: Audit,
}

impl UserPermission {
    pub fn grant(
        user_id: UserId,
        permission: &Permission,
        by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if permission.as_str().trim().is_empty() {
            return Err(DomainError::validation("permission_name", "must not be empty"));
        }
        Ok(Self {
            id: UserPermissionId::new(),
            user_id,
            permission_name: permission.as_str().to_string(),
            audit: Audit::new(by, now),
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn permission_name(&self) -> &str {
        &self.permission_name
    }
}

impl Entity for UserPermission {
    type Id = UserPermissionId;
    const KIND: &'static str = "user_permissions";

    fn id(&self) -> &UserPermissionId {
        &self.id
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }
}
