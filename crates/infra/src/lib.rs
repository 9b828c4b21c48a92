//! Infrastructure layer: storage, configuration, request dispatch and the
//! use-case handlers built on top of the domain crates.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod repository;
pub mod services;
pub mod store;

pub use config::{AdminSeed, AppConfig, ConfigError};
pub use dispatch::{Access, Dispatcher, Handler, Request, RequestContext};
pub use error::AppError;
pub use services::Services;
pub use store::Repositories;
