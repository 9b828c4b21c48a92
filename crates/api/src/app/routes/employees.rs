use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};

use farmhub_core::EmployeeId;
use farmhub_employees::EmployeeDetails;
use farmhub_infra::handlers::employees::{
    AddEmployee, DeleteEmployee, GetEmployee, ListEmployees, TerminateEmployee, UpdateEmployee,
};
use farmhub_infra::{Dispatcher, RequestContext};

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_employees).post(add_employee))
        .route("/:id", get(get_employee).put(update_employee).delete(delete_employee))
        .route("/:id/terminate", post(terminate_employee))
}

fn employee_id(raw: &str) -> Result<EmployeeId, Response> {
    errors::parse_id(raw, "employee")
}

pub async fn add_employee(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<dto::AddEmployeeRequest>,
) -> Response {
    let request = AddEmployee { farm_id: body.farm_id, details: body.details };
    errors::reply(StatusCode::CREATED, dispatcher.send(&ctx, request).await)
}

pub async fn list_employees(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<dto::EmployeeQuery>,
) -> Response {
    let request = ListEmployees { farm_id: query.farm_id, status: query.status, page: query.page() };
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, request).await)
}

pub async fn get_employee(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match employee_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, GetEmployee { id }).await)
}

pub async fn update_employee(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(details): Json<EmployeeDetails>,
) -> Response {
    let id = match employee_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, UpdateEmployee { id, details }).await)
}

pub async fn terminate_employee(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::TerminateRequest>,
) -> Response {
    let id = match employee_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let request = TerminateEmployee { id, contract_end: body.contract_end };
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, request).await)
}

pub async fn delete_employee(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match employee_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::no_content(dispatcher.send(&ctx, DeleteEmployee { id }).await)
}
