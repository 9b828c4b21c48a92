use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are opaque strings (e.g. "farms.view") compared by exact value.
/// Admin users bypass the check entirely; there is no wildcard permission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this name belongs to the catalog below.
    pub fn is_known(name: &str) -> bool {
        catalog::ALL.iter().any(|p| p.as_str() == name)
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Every permission an endpoint can require.
pub mod catalog {
    use super::Permission;

    pub const FARMS_VIEW: Permission = Permission::from_static("farms.view");
    pub const FARMS_MANAGE: Permission = Permission::from_static("farms.manage");
    pub const FEEDS_VIEW: Permission = Permission::from_static("feeds.view");
    pub const FEEDS_MANAGE: Permission = Permission::from_static("feeds.manage");
    pub const SALES_VIEW: Permission = Permission::from_static("sales.view");
    pub const SALES_MANAGE: Permission = Permission::from_static("sales.manage");
    pub const EXPENSES_VIEW: Permission = Permission::from_static("expenses.view");
    pub const EXPENSES_MANAGE: Permission = Permission::from_static("expenses.manage");
    pub const EMPLOYEES_VIEW: Permission = Permission::from_static("employees.view");
    pub const EMPLOYEES_MANAGE: Permission = Permission::from_static("employees.manage");
    pub const USERS_MANAGE: Permission = Permission::from_static("users.manage");

    pub const ALL: &[Permission] = &[
        FARMS_VIEW,
        FARMS_MANAGE,
        FEEDS_VIEW,
        FEEDS_MANAGE,
        SALES_VIEW,
        SALES_MANAGE,
        EXPENSES_VIEW,
        EXPENSES_MANAGE,
        EMPLOYEES_VIEW,
        EMPLOYEES_MANAGE,
        USERS_MANAGE,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_names_are_unique_and_known() {
        let mut names: Vec<&str> = catalog::ALL.iter().map(|p| p.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), catalog::ALL.len());
        assert!(Permission::is_known("farms.view"));
        assert!(!Permission::is_known("farms.*"));
    }
}
