use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};

use farmhub_core::FeedDeliveryId;
use farmhub_feeds::FeedDeliveryDetails;
use farmhub_infra::handlers::feeds::{
    AddFeedDelivery, DeleteFeedDelivery, GetFeedDelivery, ListFeedDeliveries, MarkFeedDeliveryPaid,
    UpdateFeedDelivery,
};
use farmhub_infra::{Dispatcher, RequestContext};

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_deliveries).post(add_delivery))
        .route("/:id", get(get_delivery).put(update_delivery).delete(delete_delivery))
        .route("/:id/paid", post(mark_paid))
}

fn delivery_id(raw: &str) -> Result<FeedDeliveryId, Response> {
    errors::parse_id(raw, "feed delivery")
}

pub async fn add_delivery(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<dto::AddFeedDeliveryRequest>,
) -> Response {
    let request = AddFeedDelivery {
        farm_id: body.farm_id,
        henhouse_id: body.henhouse_id,
        cycle_id: body.cycle_id,
        details: body.details,
    };
    errors::reply(StatusCode::CREATED, dispatcher.send(&ctx, request).await)
}

pub async fn list_deliveries(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<dto::FeedDeliveryQuery>,
) -> Response {
    let (filter, page) = query.into_parts();
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, ListFeedDeliveries { filter, page }).await)
}

pub async fn get_delivery(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match delivery_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, GetFeedDelivery { id }).await)
}

pub async fn update_delivery(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(details): Json<FeedDeliveryDetails>,
) -> Response {
    let id = match delivery_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, UpdateFeedDelivery { id, details }).await)
}

pub async fn mark_paid(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::MarkPaidRequest>,
) -> Response {
    let id = match delivery_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let request = MarkFeedDeliveryPaid { id, paid_at: body.paid_at };
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, request).await)
}

pub async fn delete_delivery(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match delivery_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::no_content(dispatcher.send(&ctx, DeleteFeedDelivery { id }).await)
}
