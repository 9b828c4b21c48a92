//! Entity trait: identity + continuity across state changes, plus the audit
//! trail every stored aggregate carries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::UserId;

/// Entity marker + minimal interface.
///
/// `KIND` names the storage collection (table) the entity lives in.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + Into<Uuid> + Send + Sync;

    const KIND: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    fn audit(&self) -> &Audit;

    fn audit_mut(&mut self) -> &mut Audit;

    fn is_deleted(&self) -> bool {
        self.audit().is_deleted()
    }
}

/// Creation/modification/deletion trail.
///
/// Rows are never physically removed: `mark_deleted` sets `deleted_at` and every
/// repository query filters such rows out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<UserId>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<UserId>,
}

impl Audit {
    pub fn new(by: Option<UserId>, now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            created_by: by,
            modified_at: None,
            modified_by: None,
            deleted_at: None,
            deleted_by: None,
        }
    }

    pub fn touch(&mut self, by: Option<UserId>, now: DateTime<Utc>) {
        self.modified_at = Some(now);
        self.modified_by = by;
    }

    pub fn mark_deleted(&mut self, by: Option<UserId>, now: DateTime<Utc>) {
        self.deleted_at = Some(now);
        self.deleted_by = by;
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Soft-delete an entity, recording the actor.
pub fn soft_delete<E: Entity>(entity: &mut E, by: Option<UserId>, now: DateTime<Utc>) {
    entity.audit_mut().mark_deleted(by, now);
}
