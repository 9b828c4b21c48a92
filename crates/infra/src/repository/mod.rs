//! Generic entity repositories.
//!
//! One repository per entity kind. Reads never return soft-deleted rows unless
//! the specification explicitly asks for them; `get` never does.

use std::sync::Arc;

use thiserror::Error;

use farmhub_core::{Entity, OrderField, Page, PageRequest, Specification};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryRepository;
pub use postgres::{PostgresRepository, ensure_table};

/// Repository operation error (infrastructure, not domain).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// `update` targeted a row that does not exist.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// `add` collided with an existing primary key.
    #[error("duplicate {kind} {id}")]
    Duplicate { kind: &'static str, id: String },

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

#[async_trait::async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    async fn add(&self, entity: &T) -> Result<(), RepositoryError>;

    /// Replace the stored row. Soft deletion is an update that sets `deleted_at`.
    async fn update(&self, entity: &T) -> Result<(), RepositoryError>;

    /// Load a non-deleted entity by id.
    async fn get(&self, id: T::Id) -> Result<Option<T>, RepositoryError>;

    /// All matches, in the specification's order.
    async fn list(&self, spec: &Specification<T>) -> Result<Vec<T>, RepositoryError>;

    /// A window of matches, in the specification's order.
    async fn slice(&self, spec: &Specification<T>, skip: u64, take: u64) -> Result<Vec<T>, RepositoryError>;

    async fn count(&self, spec: &Specification<T>) -> Result<u64, RepositoryError>;

    async fn first(&self, spec: &Specification<T>) -> Result<Option<T>, RepositoryError> {
        Ok(self.slice(spec, 0, 1).await?.into_iter().next())
    }

    async fn exists(&self, spec: &Specification<T>) -> Result<bool, RepositoryError> {
        Ok(self.first(spec).await?.is_some())
    }
}

#[async_trait::async_trait]
impl<T, R> Repository<T> for Arc<R>
where
    T: Entity,
    R: Repository<T> + ?Sized,
{
    async fn add(&self, entity: &T) -> Result<(), RepositoryError> {
        (**self).add(entity).await
    }

    async fn update(&self, entity: &T) -> Result<(), RepositoryError> {
        (**self).update(entity).await
    }

    async fn get(&self, id: T::Id) -> Result<Option<T>, RepositoryError> {
        (**self).get(id).await
    }

    async fn list(&self, spec: &Specification<T>) -> Result<Vec<T>, RepositoryError> {
        (**self).list(spec).await
    }

    async fn slice(&self, spec: &Specification<T>, skip: u64, take: u64) -> Result<Vec<T>, RepositoryError> {
        (**self).slice(spec, skip, take).await
    }

    async fn count(&self, spec: &Specification<T>) -> Result<u64, RepositoryError> {
        (**self).count(spec).await
    }
}

/// Run a paged listing: the request's ordering (creation time when absent)
/// replaces any ordering on `spec`.
pub async fn paged<T, O, R>(
    repo: &R,
    spec: Specification<T>,
    request: &PageRequest<O>,
) -> Result<Page<T>, RepositoryError>
where
    T: Entity,
    O: OrderField,
    R: Repository<T> + ?Sized,
{
    let spec = match request.order_by {
        Some(order) if order.is_instant() => spec.order_by_instant(order.field(), request.is_descending),
        Some(order) => spec.order_by(order.field(), request.is_descending),
        None => spec.order_by("created_at", request.is_descending),
    };

    let total = repo.count(&spec).await?;
    let items = repo.slice(&spec, request.skip(), request.take()).await?;
    Ok(Page::new(items, total, request))
}
