use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;

use farmhub_auth::SessionOrderBy;
use farmhub_core::{PageRequest, UserSessionId};
use farmhub_infra::handlers::auth::{ChangeOwnPassword, GetCurrentUser, ListMySessions, Login, Logout, RevokeSession};
use farmhub_infra::handlers::users::CheckPermission;
use farmhub_infra::{Dispatcher, RequestContext};

use crate::app::{dto, errors};

/// Session-bound endpoints. `POST /auth/login` is public and mounted by
/// [`crate::app::build_app`].
pub fn router() -> Router {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(current_user))
        .route("/auth/password", put(change_password))
        .route("/auth/sessions", get(my_sessions))
        .route("/auth/sessions/:id", delete(revoke_session))
        .route("/auth/check-permission", get(check_permission))
}

pub async fn login(Extension(dispatcher): Extension<Dispatcher>, Json(body): Json<Login>) -> Response {
    let ctx = RequestContext::anonymous(Utc::now());
    let result = dispatcher.send(&ctx, body).await.map(dto::LoginResponse::from);
    errors::reply(StatusCode::OK, result)
}

pub async fn logout(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    errors::no_content(dispatcher.send(&ctx, Logout).await)
}

pub async fn current_user(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    let result = dispatcher
        .send(&ctx, GetCurrentUser)
        .await
        .map(dto::UserWithPermissionsDto::from);
    errors::reply(StatusCode::OK, result)
}

pub async fn change_password(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<ChangeOwnPassword>,
) -> Response {
    errors::no_content(dispatcher.send(&ctx, body).await)
}

pub async fn my_sessions(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Query(page): Query<PageRequest<SessionOrderBy>>,
) -> Response {
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, ListMySessions { page }).await)
}

pub async fn revoke_session(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Response {
    let id: UserSessionId = match errors::parse_id(&id, "session") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, RevokeSession { id }).await)
}

pub async fn check_permission(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<CheckPermission>,
) -> Response {
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, query).await)
}
