use axum::Router;

pub mod auth;
pub mod employees;
pub mod expenses;
pub mod farms;
pub mod feeds;
pub mod sales;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .merge(auth::router())
        .nest("/users", users::router())
        .nest("/farms", farms::router())
        .nest("/feed-deliveries", feeds::router())
        .nest("/slaughterhouses", sales::slaughterhouse_router())
        .nest("/sales", sales::router())
        .nest("/expense-contractors", expenses::contractor_router())
        .nest("/expenses", expenses::router())
        .nest("/employees", employees::router())
}
