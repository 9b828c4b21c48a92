//! HTTP API application wiring (Axum router + dispatcher).
//!
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and query-string mapping
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower::ServiceBuilder;

use farmhub_infra::{Dispatcher, Services};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<Services>) -> Router {
    let dispatcher = Dispatcher::new(services);
    let auth_state = middleware::AuthState {
        dispatcher: dispatcher.clone(),
    };

    // Protected routes: require a bearer token bound to an active session.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/auth/login", post(routes::auth::login))
        .merge(protected)
        .layer(Extension(dispatcher))
        .layer(ServiceBuilder::new())
}
