//! Repository wiring: one repository per entity kind, behind trait objects so
//! handlers never know which backend they talk to.

use std::sync::Arc;

use sqlx::PgPool;

use farmhub_auth::{User, UserPermission, UserSession};
use farmhub_employees::Employee;
use farmhub_expenses::{Expense, ExpenseContractor};
use farmhub_farms::{Cycle, Farm, Henhouse};
use farmhub_feeds::FeedDelivery;
use farmhub_sales::{Sale, Slaughterhouse};

use crate::repository::{InMemoryRepository, PostgresRepository, Repository, RepositoryError, ensure_table};

#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn Repository<User>>,
    pub permissions: Arc<dyn Repository<UserPermission>>,
    pub sessions: Arc<dyn Repository<UserSession>>,
    pub farms: Arc<dyn Repository<Farm>>,
    pub henhouses: Arc<dyn Repository<Henhouse>>,
    pub cycles: Arc<dyn Repository<Cycle>>,
    pub feed_deliveries: Arc<dyn Repository<FeedDelivery>>,
    pub slaughterhouses: Arc<dyn Repository<Slaughterhouse>>,
    pub sales: Arc<dyn Repository<Sale>>,
    pub contractors: Arc<dyn Repository<ExpenseContractor>>,
    pub expenses: Arc<dyn Repository<Expense>>,
    pub employees: Arc<dyn Repository<Employee>>,
}

impl Repositories {
    /// In-memory wiring (dev/test). Data lives as long as the process.
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryRepository::new()),
            permissions: Arc::new(InMemoryRepository::new()),
            sessions: Arc::new(InMemoryRepository::new()),
            farms: Arc::new(InMemoryRepository::new()),
            henhouses: Arc::new(InMemoryRepository::new()),
            cycles: Arc::new(InMemoryRepository::new()),
            feed_deliveries: Arc::new(InMemoryRepository::new()),
            slaughterhouses: Arc::new(InMemoryRepository::new()),
            sales: Arc::new(InMemoryRepository::new()),
            contractors: Arc::new(InMemoryRepository::new()),
            expenses: Arc::new(InMemoryRepository::new()),
            employees: Arc::new(InMemoryRepository::new()),
        }
    }

    /// Postgres wiring. Call [`ensure_schema`] once before serving traffic.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresRepository::new(pool.clone())),
            permissions: Arc::new(PostgresRepository::new(pool.clone())),
            sessions: Arc::new(PostgresRepository::new(pool.clone())),
            farms: Arc::new(PostgresRepository::new(pool.clone())),
            henhouses: Arc::new(PostgresRepository::new(pool.clone())),
            cycles: Arc::new(PostgresRepository::new(pool.clone())),
            feed_deliveries: Arc::new(PostgresRepository::new(pool.clone())),
            slaughterhouses: Arc::new(PostgresRepository::new(pool.clone())),
            sales: Arc::new(PostgresRepository::new(pool.clone())),
            contractors: Arc::new(PostgresRepository::new(pool.clone())),
            expenses: Arc::new(PostgresRepository::new(pool.clone())),
            employees: Arc::new(PostgresRepository::new(pool)),
        }
    }
}

/// Create every entity table that does not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), RepositoryError> {
    ensure_table::<User>(pool).await?;
    ensure_table::<UserPermission>(pool).await?;
    ensure_table::<UserSession>(pool).await?;
    ensure_table::<Farm>(pool).await?;
    ensure_table::<Henhouse>(pool).await?;
    ensure_table::<Cycle>(pool).await?;
    ensure_table::<FeedDelivery>(pool).await?;
    ensure_table::<Slaughterhouse>(pool).await?;
    ensure_table::<Sale>(pool).await?;
    ensure_table::<ExpenseContractor>(pool).await?;
    ensure_table::<Expense>(pool).await?;
    ensure_table::<Employee>(pool).await?;
    Ok(())
}
