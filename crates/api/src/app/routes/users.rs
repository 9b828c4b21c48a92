use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::{get, put},
    Json, Router,
};

use farmhub_auth::UserOrderBy;
use farmhub_core::{PageRequest, UserId};
use farmhub_infra::handlers::users::{
    CreateUser, DeleteUser, GetUser, ListUsers, SetUserPassword, UpdateUser, UpdateUserPermissions,
};
use farmhub_infra::{Dispatcher, RequestContext};

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:id/password", put(set_password))
        .route("/:id/permissions", put(set_permissions))
}

fn user_id(raw: &str) -> Result<UserId, Response> {
    errors::parse_id(raw, "user")
}

pub async fn create_user(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<CreateUser>,
) -> Response {
    let result = dispatcher.send(&ctx, body).await.map(dto::UserWithPermissionsDto::from);
    errors::reply(StatusCode::CREATED, result)
}

pub async fn list_users(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Query(page): Query<PageRequest<UserOrderBy>>,
) -> Response {
    let result = dispatcher
        .send(&ctx, ListUsers { page })
        .await
        .map(|page| page.map(dto::UserDto::from));
    errors::reply(StatusCode::OK, result)
}

pub async fn get_user(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match user_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let result = dispatcher.send(&ctx, GetUser { id }).await.map(dto::UserWithPermissionsDto::from);
    errors::reply(StatusCode::OK, result)
}

pub async fn update_user(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateUserRequest>,
) -> Response {
    let id = match user_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let request = UpdateUser { id, name: body.name, is_admin: body.is_admin };
    let result = dispatcher.send(&ctx, request).await.map(dto::UserDto::from);
    errors::reply(StatusCode::OK, result)
}

pub async fn set_password(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::SetPasswordRequest>,
) -> Response {
    let id = match user_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::no_content(dispatcher.send(&ctx, SetUserPassword { id, password: body.password }).await)
}

pub async fn set_permissions(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::PermissionsRequest>,
) -> Response {
    let id = match user_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let result = dispatcher
        .send(&ctx, UpdateUserPermissions { id, permissions: body.permissions })
        .await
        .map(|permissions| serde_json::json!({ "permissions": permissions }));
    errors::reply(StatusCode::OK, result)
}

pub async fn delete_user(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match user_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::no_content(dispatcher.send(&ctx, DeleteUser { id }).await)
}
