use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};

use farmhub_core::{ExpenseContractorId, ExpenseId, PageRequest};
use farmhub_expenses::{ContractorOrderBy, ExpenseDetails};
use farmhub_infra::handlers::expenses::{
    AddExpense, ContractorInput, CreateContractor, DeleteContractor, DeleteExpense, GetContractor, GetExpense,
    ListContractors, ListExpenses, UpdateContractor, UpdateExpense,
};
use farmhub_infra::{Dispatcher, RequestContext};

use crate::app::{dto, errors};

pub fn contractor_router() -> Router {
    Router::new()
        .route("/", get(list_contractors).post(create_contractor))
        .route("/:id", get(get_contractor).put(update_contractor).delete(delete_contractor))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_expenses).post(add_expense))
        .route("/:id", get(get_expense).put(update_expense).delete(delete_expense))
}

fn contractor_id(raw: &str) -> Result<ExpenseContractorId, Response> {
    errors::parse_id(raw, "contractor")
}

fn expense_id(raw: &str) -> Result<ExpenseId, Response> {
    errors::parse_id(raw, "expense")
}

pub async fn create_contractor(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Json(input): Json<ContractorInput>,
) -> Response {
    errors::reply(StatusCode::CREATED, dispatcher.send(&ctx, CreateContractor { input }).await)
}

pub async fn list_contractors(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Query(page): Query<PageRequest<ContractorOrderBy>>,
) -> Response {
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, ListContractors { page }).await)
}

pub async fn get_contractor(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match contractor_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, GetContractor { id }).await)
}

pub async fn update_contractor(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(input): Json<ContractorInput>,
) -> Response {
    let id = match contractor_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, UpdateContractor { id, input }).await)
}

pub async fn delete_contractor(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match contractor_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::no_content(dispatcher.send(&ctx, DeleteContractor { id }).await)
}

pub async fn add_expense(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<dto::AddExpenseRequest>,
) -> Response {
    let request = AddExpense { farm_id: body.farm_id, cycle_id: body.cycle_id, details: body.details };
    errors::reply(StatusCode::CREATED, dispatcher.send(&ctx, request).await)
}

pub async fn list_expenses(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<dto::ExpenseQuery>,
) -> Response {
    let (filter, page) = query.into_parts();
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, ListExpenses { filter, page }).await)
}

pub async fn get_expense(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match expense_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, GetExpense { id }).await)
}

pub async fn update_expense(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(details): Json<ExpenseDetails>,
) -> Response {
    let id = match expense_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, UpdateExpense { id, details }).await)
}

pub async fn delete_expense(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match expense_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::no_content(dispatcher.send(&ctx, DeleteExpense { id }).await)
}
