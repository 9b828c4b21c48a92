//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(Uuid);

        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

uuid_id!(
    /// Identifier of a user (actor identity).
    UserId, "UserId"
);
uuid_id!(
    /// Row id of a granted permission.
    UserPermissionId, "UserPermissionId"
);
uuid_id!(
    /// Row id of a stored session.
    UserSessionId, "UserSessionId"
);
uuid_id!(
    /// Session identifier carried in the `sid` token claim.
    SessionId, "SessionId"
);
uuid_id!(FarmId, "FarmId");
uuid_id!(HenhouseId, "HenhouseId");
uuid_id!(CycleId, "CycleId");
uuid_id!(FeedDeliveryId, "FeedDeliveryId");
uuid_id!(SlaughterhouseId, "SlaughterhouseId");
uuid_id!(SaleId, "SaleId");
uuid_id!(ExpenseContractorId, "ExpenseContractorId");
uuid_id!(ExpenseId, "ExpenseId");
uuid_id!(EmployeeId, "EmployeeId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_display() {
        let id = FarmId::new();
        let parsed: FarmId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_error_names_the_type() {
        let err = "not-a-uuid".parse::<HenhouseId>().unwrap_err();
        assert!(err.to_string().contains("HenhouseId"));
    }
}
