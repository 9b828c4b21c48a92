use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};

use farmhub_core::{PageRequest, SaleId, SlaughterhouseId};
use farmhub_infra::handlers::sales::{
    AddSale, CreateSlaughterhouse, DeleteSale, DeleteSlaughterhouse, GetSale, GetSlaughterhouse, ListSales,
    ListSlaughterhouses, SlaughterhouseInput, UpdateSale, UpdateSlaughterhouse,
};
use farmhub_infra::{Dispatcher, RequestContext};
use farmhub_sales::{SaleDetails, SlaughterhouseOrderBy};

use crate::app::{dto, errors};

pub fn slaughterhouse_router() -> Router {
    Router::new()
        .route("/", get(list_slaughterhouses).post(create_slaughterhouse))
        .route(
            "/:id",
            get(get_slaughterhouse).put(update_slaughterhouse).delete(delete_slaughterhouse),
        )
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_sales).post(add_sale))
        .route("/:id", get(get_sale).put(update_sale).delete(delete_sale))
}

fn slaughterhouse_id(raw: &str) -> Result<SlaughterhouseId, Response> {
    errors::parse_id(raw, "slaughterhouse")
}

fn sale_id(raw: &str) -> Result<SaleId, Response> {
    errors::parse_id(raw, "sale")
}

pub async fn create_slaughterhouse(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Json(input): Json<SlaughterhouseInput>,
) -> Response {
    errors::reply(StatusCode::CREATED, dispatcher.send(&ctx, CreateSlaughterhouse { input }).await)
}

pub async fn list_slaughterhouses(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Query(page): Query<PageRequest<SlaughterhouseOrderBy>>,
) -> Response {
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, ListSlaughterhouses { page }).await)
}

pub async fn get_slaughterhouse(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match slaughterhouse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, GetSlaughterhouse { id }).await)
}

pub async fn update_slaughterhouse(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(input): Json<SlaughterhouseInput>,
) -> Response {
    let id = match slaughterhouse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, UpdateSlaughterhouse { id, input }).await)
}

pub async fn delete_slaughterhouse(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match slaughterhouse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::no_content(dispatcher.send(&ctx, DeleteSlaughterhouse { id }).await)
}

pub async fn add_sale(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<dto::AddSaleRequest>,
) -> Response {
    let request = AddSale {
        farm_id: body.farm_id,
        henhouse_id: body.henhouse_id,
        cycle_id: body.cycle_id,
        details: body.details,
    };
    errors::reply(StatusCode::CREATED, dispatcher.send(&ctx, request).await)
}

pub async fn list_sales(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<dto::SaleQuery>,
) -> Response {
    let (filter, page) = query.into_parts();
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, ListSales { filter, page }).await)
}

pub async fn get_sale(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match sale_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, GetSale { id }).await)
}

pub async fn update_sale(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(details): Json<SaleDetails>,
) -> Response {
    let id = match sale_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, UpdateSale { id, details }).await)
}

pub async fn delete_sale(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match sale_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::no_content(dispatcher.send(&ctx, DeleteSale { id }).await)
}
