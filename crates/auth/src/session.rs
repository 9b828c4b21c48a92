//! Login sessions.
//!
//! A session is created at login and referenced by the `sid` token claim.
//! Lifecycle: Active → Deactivated (terminal). Tokens whose session is no
//! longer active are rejected even when the signature and expiry are fine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farmhub_core::{Audit, Entity, OrderField, SessionId, UserId, UserSessionId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    id: UserSessionId,
    user_id: UserId,
    session_id: SessionId,
    long_valid: bool,
    last_seen_at: DateTime<Utc>,
    deactivated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    audit: Audit,
}

impl UserSession {
    pub fn start(user_id: UserId, long_valid: bool, now: DateTime<Utc>) -> Self {
        Self {
            id: UserSessionId::new(),
            user_id,
            session_id: SessionId::new(),
            long_valid,
            last_seen_at: now,
            deactivated_at: None,
            audit: Audit::new(Some(user_id), now),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn long_valid(&self) -> bool {
        self.long_valid
    }

    pub fn last_seen_at(&self) -> DateTime<Utc> {
        self.last_seen_at
    }

    pub fn deactivated_at(&self) -> Option<DateTime<Utc>> {
        self.deactivated_at
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.audit.created_at
    }

    pub fn is_active(&self) -> bool {
        self.deactivated_at.is_none()
    }

    /// Move `last_seen_at` forward to `at`. Earlier instants are ignored.
    ///
    /// Returns whether the timestamp changed.
    pub fn update_last_seen_at(&mut self, at: DateTime<Utc>) -> bool {
        if at <= self.last_seen_at {
            return false;
        }
        self.last_seen_at = at;
        true
    }

    /// Deactivate the session. Calling again only moves the timestamp.
    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.deactivated_at = Some(now);
    }
}

impl Entity for UserSession {
    type Id = UserSessionId;
    const KIND: &'static str = "user_sessions";

    fn id(&self) -> &UserSessionId {
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
pub enum SessionOrderBy {
    LastSeenAt,
    CreatedAt,
}

impl OrderField for SessionOrderBy {
    fn field(&self) -> &'static str {
        match self {
            SessionOrderBy::LastSeenAt => "last_seen_at",
            SessionOrderBy::CreatedAt => "created_at",
        }
    }

    fn is_instant(&self) -> bool {
        matches!(self, SessionOrderBy::LastSeenAt)
    }
}
