use thiserror::Error;

use crate::{Permission, User};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("unauthorized: no authenticated user")]
    Unauthorized,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Pure permission check.
///
/// `true` iff `required` is granted by exact name or the user is an admin.
pub fn has_permission<'a, I>(user: &User, granted: I, required: &Permission) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    user.is_admin() || granted.into_iter().any(|name| name == required.as_str())
}

/// Check a possibly-unresolved user against a required permission.
///
/// - No IO
/// - `user` is `None` when the session could not be resolved to a live user
pub fn check_permission<'a, I>(
    user: Option<&User>,
    granted: I,
    required: &Permission,
) -> Result<bool, AuthzError>
where
    I: IntoIterator<Item = &'a str>,
{
    let user = user.ok_or(AuthzError::Unauthorized)?;
    Ok(has_permission(user, granted, required))
}

/// Like [`check_permission`] but turns a `false` answer into `Forbidden`.
pub fn authorize<'a, I>(user: Option<&User>, granted: I, required: &Permission) -> Result<(), AuthzError>
where
    I: IntoIterator<Item = &'a str>,
{
    if check_permission(user, granted, required)? {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}
