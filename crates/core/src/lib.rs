//! `farmhub-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, errors, the audit/soft-delete trail, query specifications,
//! paging and shared value objects.

pub mod entity;
pub mod error;
pub mod id;
pub mod nip;
pub mod pagination;
pub mod specification;
pub mod validation;
pub mod value_object;

pub use entity::{Audit, Entity, soft_delete};
pub use error::{DomainError, DomainResult};
pub use id::{
    CycleId, EmployeeId, ExpenseContractorId, ExpenseId, FarmId, FeedDeliveryId, HenhouseId,
    SaleId, SessionId, SlaughterhouseId, UserId, UserPermissionId, UserSessionId,
};
pub use nip::Nip;
pub use pagination::{OrderField, Page, PageRequest};
pub use specification::{Criterion, OrderClause, Specification};
pub use validation::{FieldError, Validate, ValidationErrors, trim_optional};
pub use value_object::ValueObject;
