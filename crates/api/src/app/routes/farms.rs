use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::{get, put},
    Json, Router,
};

use farmhub_core::{FarmId, HenhouseId, PageRequest};
use farmhub_farms::{CycleOrderBy, FarmOrderBy, HenhouseDetails, HenhouseOrderBy};
use farmhub_infra::handlers::farms::{
    AddHenhouse, CreateCycle, CreateFarm, DeleteFarm, DeleteHenhouse, FarmInput, GetFarm, ListCycles, ListFarms,
    ListHenhouses, SetActiveCycle, UpdateFarm, UpdateHenhouse,
};
use farmhub_infra::{Dispatcher, RequestContext};

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_farms).post(create_farm))
        .route("/:id", get(get_farm).put(update_farm).delete(delete_farm))
        .route("/:id/henhouses", get(list_henhouses).post(add_henhouse))
        .route("/:id/henhouses/:henhouse_id", put(update_henhouse).delete(delete_henhouse))
        .route("/:id/cycles", get(list_cycles).post(create_cycle))
        .route("/:id/active-cycle", put(set_active_cycle))
}

fn farm_id(raw: &str) -> Result<FarmId, Response> {
    errors::parse_id(raw, "farm")
}

fn henhouse_path(farm: &str, henhouse: &str) -> Result<(FarmId, HenhouseId), Response> {
    Ok((farm_id(farm)?, errors::parse_id(henhouse, "henhouse")?))
}

pub async fn create_farm(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Json(input): Json<FarmInput>,
) -> Response {
    errors::reply(StatusCode::CREATED, dispatcher.send(&ctx, CreateFarm { input }).await)
}

pub async fn list_farms(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Query(page): Query<PageRequest<FarmOrderBy>>,
) -> Response {
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, ListFarms { page }).await)
}

pub async fn get_farm(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match farm_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, GetFarm { id }).await)
}

pub async fn update_farm(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(input): Json<FarmInput>,
) -> Response {
    let id = match farm_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, UpdateFarm { id, input }).await)
}

pub async fn delete_farm(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match farm_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::no_content(dispatcher.send(&ctx, DeleteFarm { id }).await)
}

pub async fn add_henhouse(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(details): Json<HenhouseDetails>,
) -> Response {
    let farm_id = match farm_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::reply(StatusCode::CREATED, dispatcher.send(&ctx, AddHenhouse { farm_id, details }).await)
}

pub async fn list_henhouses(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Query(page): Query<PageRequest<HenhouseOrderBy>>,
) -> Response {
    let farm_id = match farm_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, ListHenhouses { farm_id, page }).await)
}

pub async fn update_henhouse(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path((farm, henhouse)): Path<(String, String)>,
    Json(details): Json<HenhouseDetails>,
) -> Response {
    let (farm_id, id) = match henhouse_path(&farm, &henhouse) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let request = UpdateHenhouse { farm_id, id, details };
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, request).await)
}

pub async fn delete_henhouse(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path((farm, henhouse)): Path<(String, String)>,
) -> Response {
    let (farm_id, id) = match henhouse_path(&farm, &henhouse) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::no_content(dispatcher.send(&ctx, DeleteHenhouse { farm_id, id }).await)
}

pub async fn create_cycle(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::CreateCycleRequest>,
) -> Response {
    let farm_id = match farm_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let request = CreateCycle {
        farm_id,
        identifier: body.identifier,
        year: body.year,
        started_at: body.started_at,
    };
    errors::reply(StatusCode::CREATED, dispatcher.send(&ctx, request).await)
}

pub async fn list_cycles(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Query(page): Query<PageRequest<CycleOrderBy>>,
) -> Response {
    let farm_id = match farm_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, ListCycles { farm_id, page }).await)
}

pub async fn set_active_cycle(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::SetActiveCycleRequest>,
) -> Response {
    let farm_id = match farm_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let request = SetActiveCycle { farm_id, cycle_id: body.cycle_id };
    errors::reply(StatusCode::OK, dispatcher.send(&ctx, request).await)
}
