//! Request dispatch pipeline (application-level orchestration).
//!
//! ```text
//! Request
//!   ↓
//! 1. Access check (public / authenticated / required permission)
//!   ↓
//! 2. Request validation (per-field errors, nothing touched yet)
//!   ↓
//! 3. Handler (loads entities, applies domain rules, persists)
//! ```
//!
//! Handlers are plain `impl Handler<R> for Services` blocks; the dispatcher
//! owns the cross-cutting steps so no handler can skip them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use farmhub_auth::Permission;
use farmhub_core::{SessionId, UserId, ValidationErrors};

use crate::error::AppError;
use crate::services::Services;

/// Who is calling, and when.
///
/// Built by the HTTP auth middleware from a validated token; `now` is read
/// once per request so every timestamp written by a handler agrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: Option<UserId>,
    pub session_id: Option<SessionId>,
    pub now: DateTime<Utc>,
}

impl RequestContext {
    pub fn anonymous(now: DateTime<Utc>) -> Self {
        Self {
            user_id: None,
            session_id: None,
            now,
        }
    }

    pub fn authenticated(user_id: UserId, session_id: SessionId, now: DateTime<Utc>) -> Self {
        Self {
            user_id: Some(user_id),
            session_id: Some(session_id),
            now,
        }
    }

    /// Recorded in audit trails.
    pub fn actor(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn require_user(&self) -> Result<UserId, AppError> {
        self.user_id.ok_or(AppError::Unauthorized)
    }
}

/// Who may send a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Permission(Permission),
}

/// A use case input.
pub trait Request: Send + 'static {
    type Response: Send;

    /// Logged for every dispatch.
    const NAME: &'static str;

    const ACCESS: Access;

    /// Field-level checks that need no storage access.
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

#[async_trait::async_trait]
pub trait Handler<R: Request>: Send + Sync {
    async fn handle(&self, ctx: &RequestContext, request: R) -> Result<R::Response, AppError>;
}

#[derive(Clone)]
pub struct Dispatcher {
    services: Arc<Services>,
}

impl Dispatcher {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    #[instrument(skip_all, fields(request = R::NAME, user_id = ?ctx.user_id))]
    pub async fn send<R>(&self, ctx: &RequestContext, request: R) -> Result<R::Response, AppError>
    where
        R: Request,
        Services: Handler<R>,
    {
        debug!("dispatching request");

        match R::ACCESS {
            Access::Public => {}
            Access::Authenticated => {
                ctx.require_user()?;
            }
            Access::Permission(required) => {
                if !self.services.check_permission(ctx.user_id, &required).await? {
                    warn!(permission = %required, "permission denied");
                    return Err(AppError::Forbidden(required.to_string()));
                }
            }
        }

        Request::validate(&request)?;

        let result = self.services.handle(ctx, request).await;
        if let Err(err) = &result {
            match err {
                AppError::Storage(_) | AppError::Internal(_) => warn!(error = %err, "request failed"),
                _ => debug!(error = %err, "request rejected"),
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use farmhub_auth::catalog;

    use crate::services::tests::{services_with_user, test_services};

    struct Echo(String);

    impl Request for Echo {
        type Response = String;
        const NAME: &'static str = "Echo";
        const ACCESS: Access = Access::Permission(catalog::FARMS_VIEW);

        fn validate(&self) -> Result<(), ValidationErrors> {
            let mut errors = ValidationErrors::new();
            errors.require_non_blank("text", &self.0);
            errors.into_result()
        }
    }

    #[async_trait::async_trait]
    impl Handler<Echo> for Services {
        async fn handle(&self, _ctx: &RequestContext, request: Echo) -> Result<String, AppError> {
            Ok(request.0)
        }
    }

    #[tokio::test]
    async fn anonymous_callers_are_unauthorized() {
        let dispatcher = Dispatcher::new(test_services());
        let err = dispatcher
            .send(&RequestContext::anonymous(Utc::now()), Echo("hi".into()))
            .await
            .unwrap_err();
        assert_eq!(err, AppError::Unauthorized);
    }

    #[tokio::test]
    async fn access_is_checked_before_validation() {
        let (services, ctx) = services_with_user(&[]).await;
        let err = Dispatcher::new(services).send(&ctx, Echo("  ".into())).await.unwrap_err();
        assert_eq!(err, AppError::Forbidden("farms.view".into()));
    }

    #[tokio::test]
    async fn validation_runs_before_the_handler() {
        let (services, ctx) = services_with_user(&["farms.view"]).await;
        let dispatcher = Dispatcher::new(services);

        let err = dispatcher.send(&ctx, Echo("  ".into())).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(e) if e.has_field("text")));

        assert_eq!(dispatcher.send(&ctx, Echo("hi".into())).await.unwrap(), "hi");
    }
}
