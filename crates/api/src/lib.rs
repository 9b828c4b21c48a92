//! HTTP API: router, auth middleware, and request/response mapping.

pub mod app;
pub mod middleware;
