//! Postgres-backed repositories.
//!
//! Every entity kind lives in its own table, named after [`Entity::KIND`]:
//!
//! | column       | type          | notes                                  |
//! |--------------|---------------|----------------------------------------|
//! | `id`         | `uuid`        | primary key                            |
//! | `data`       | `jsonb`       | the entity's serialized form           |
//! | `created_at` | `timestamptz` | copied from the audit trail (ordering) |
//! | `deleted_at` | `timestamptz` | copied from the audit trail (filter)   |
//!
//! Specifications are compiled to `WHERE`/`ORDER BY` clauses over `data`, so the
//! same predicate evaluated in memory and in SQL selects the same rows.
//!
//! ## Error mapping
//!
//! | sqlx error                  | code    | `RepositoryError` |
//! |-----------------------------|---------|-------------------|
//! | Database (unique violation) | `23505` | `Duplicate`       |
//! | anything else               |         | `Backend`         |

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::{Span, instrument};
use uuid::Uuid;

use farmhub_core::{Criterion, Entity, Specification};

use super::{Repository, RepositoryError};

pub struct PostgresRepository<T> {
    pool: Arc<PgPool>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> PostgresRepository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
            _entity: PhantomData,
        }
    }
}

impl<T> Clone for PostgresRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

/// Create the table (and its ordering index) for `T` if missing.
pub async fn ensure_table<T: Entity>(pool: &PgPool) -> Result<(), RepositoryError> {
    let table = T::KIND;
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id UUID PRIMARY KEY,
            data JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            deleted_at TIMESTAMPTZ
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| map_sqlx_error(T::KIND, "ensure_table", e))?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS {table}_created_at_idx ON {table} (created_at)"
    ))
    .execute(pool)
    .await
    .map_err(|e| map_sqlx_error(T::KIND, "ensure_table", e))?;

    Ok(())
}

fn to_document<T: Entity>(entity: &T) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(entity)
        .map_err(|e| RepositoryError::Serialization(format!("failed to serialize {}: {e}", T::KIND)))
}

fn from_row<T: Entity>(row: &PgRow) -> Result<T, RepositoryError> {
    let Json(data): Json<serde_json::Value> = row
        .try_get("data")
        .map_err(|e| RepositoryError::Serialization(format!("failed to read {} row: {e}", T::KIND)))?;
    serde_json::from_value(data)
        .map_err(|e| RepositoryError::Serialization(format!("failed to deserialize {}: {e}", T::KIND)))
}

/// Append `WHERE ...` for the specification's criteria and soft-delete filter.
fn push_filter<T>(qb: &mut QueryBuilder<'_, Postgres>, spec: &Specification<T>) {
    qb.push(" WHERE TRUE");
    if !spec.includes_deleted() {
        qb.push(" AND deleted_at IS NULL");
    }
    for criterion in spec.criteria() {
        match criterion {
            Criterion::Eq { field, value } => {
                qb.push(" AND data -> ")
                    .push_bind(*field)
                    .push(" = ")
                    .push_bind(Json(value.clone()));
            }
            Criterion::Gte { field, value } => push_comparison(qb, *field, ">=", value),
            Criterion::Lte { field, value } => push_comparison(qb, *field, "<=", value),
            Criterion::IsNull { field } => {
                // Absent keys and explicit JSON nulls both count as null.
                qb.push(" AND (data -> ")
                    .push_bind(*field)
                    .push(" IS NULL OR data -> ")
                    .push_bind(*field)
                    .push(" = 'null'::jsonb)");
            }
        }
    }
}

/// Timestamps are RFC 3339 strings with a variable number of fractional
/// digits, so jsonb text order is not time order. Those compare as
/// `timestamptz`; everything else compares as jsonb.
fn instant(value: &serde_json::Value) -> Option<&str> {
    value.as_str().filter(|s| DateTime::<FixedOffset>::parse_from_rfc3339(s).is_ok())
}

fn push_comparison(
    qb: &mut QueryBuilder<'_, Postgres>,
    field: &'static str,
    op: &str,
    value: &serde_json::Value,
) {
    match instant(value) {
        Some(at) => {
            qb.push(" AND (data ->> ")
                .push_bind(field)
                .push(")::timestamptz ")
                .push(op)
                .push(" ")
                .push_bind(at.to_string())
                .push("::timestamptz");
        }
        None => {
            qb.push(" AND data -> ")
                .push_bind(field)
                .push(" ")
                .push(op)
                .push(" ")
                .push_bind(Json(value.clone()));
        }
    }
}

/// Append `ORDER BY ...`; `id` breaks ties so pages never overlap.
fn push_order<T>(qb: &mut QueryBuilder<'_, Postgres>, spec: &Specification<T>) {
    qb.push(" ORDER BY ");
    if let Some(order) = spec.order() {
        if order.field == "created_at" {
            qb.push("created_at");
        } else if order.instant {
            qb.push("(data ->> ").push_bind(order.field).push(")::timestamptz");
        } else {
            qb.push("data -> ").push_bind(order.field);
        }
        qb.push(if order.descending { " DESC NULLS LAST, " } else { " ASC NULLS FIRST, " });
    }
    qb.push("id ASC");
}

fn map_sqlx_error(kind: &'static str, operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation} on {kind}: {}", db_err.message());
            match db_err.code() {
                Some(code) if code.as_ref() == "23505" => RepositoryError::Duplicate {
                    kind,
                    id: msg,
                },
                _ => RepositoryError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            RepositoryError::Backend(format!("connection pool closed in {operation} on {kind}"))
        }
        _ => RepositoryError::Backend(format!("sqlx error in {operation} on {kind}: {err}")),
    }
}

#[async_trait::async_trait]
impl<T: Entity> Repository<T> for PostgresRepository<T> {
    #[instrument(skip_all, fields(kind = T::KIND), err)]
    async fn add(&self, entity: &T) -> Result<(), RepositoryError> {
        let id: Uuid = (*entity.id()).into();
        let data = to_document(entity)?;
        let audit = entity.audit();

        sqlx::query(&format!(
            "INSERT INTO {} (id, data, created_at, deleted_at) VALUES ($1, $2, $3, $4)",
            T::KIND
        ))
        .bind(id)
        .bind(Json(data))
        .bind(audit.created_at)
        .bind(audit.deleted_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| match map_sqlx_error(T::KIND, "add", e) {
            RepositoryError::Duplicate { kind, .. } => RepositoryError::Duplicate {
                kind,
                id: id.to_string(),
            },
            other => other,
        })?;
        Ok(())
    }

    #[instrument(skip_all, fields(kind = T::KIND), err)]
    async fn update(&self, entity: &T) -> Result<(), RepositoryError> {
        let id: Uuid = (*entity.id()).into();
        let data = to_document(entity)?;

        let result = sqlx::query(&format!(
            "UPDATE {} SET data = $2, deleted_at = $3 WHERE id = $1",
            T::KIND
        ))
        .bind(id)
        .bind(Json(data))
        .bind(entity.audit().deleted_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error(T::KIND, "update", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound {
                kind: T::KIND,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    #[instrument(skip_all, fields(kind = T::KIND), err)]
    async fn get(&self, id: T::Id) -> Result<Option<T>, RepositoryError> {
        let id: Uuid = id.into();
        let row = sqlx::query(&format!(
            "SELECT data FROM {} WHERE id = $1 AND deleted_at IS NULL",
            T::KIND
        ))
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error(T::KIND, "get", e))?;

        row.as_ref().map(from_row::<T>).transpose()
    }

    #[instrument(skip_all, fields(kind = T::KIND, rows), err)]
    async fn list(&self, spec: &Specification<T>) -> Result<Vec<T>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT data FROM {}", T::KIND));
        push_filter(&mut qb, spec);
        push_order(&mut qb, spec);

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(T::KIND, "list", e))?;

        Span::current().record("rows", rows.len());
        rows.iter().map(from_row::<T>).collect()
    }

    #[instrument(skip_all, fields(kind = T::KIND, skip = skip, take = take), err)]
    async fn slice(&self, spec: &Specification<T>, skip: u64, take: u64) -> Result<Vec<T>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT data FROM {}", T::KIND));
        push_filter(&mut qb, spec);
        push_order(&mut qb, spec);
        qb.push(" LIMIT ")
            .push_bind(i64::try_from(take).unwrap_or(i64::MAX))
            .push(" OFFSET ")
            .push_bind(i64::try_from(skip).unwrap_or(i64::MAX));

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(T::KIND, "slice", e))?;

        rows.iter().map(from_row::<T>).collect()
    }

    #[instrument(skip_all, fields(kind = T::KIND), err)]
    async fn count(&self, spec: &Specification<T>) -> Result<u64, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) AS total FROM {}", T::KIND));
        push_filter(&mut qb, spec);

        let row = qb
            .build()
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(T::KIND, "count", e))?;
        let total: i64 = row
            .try_get("total")
            .map_err(|e| map_sqlx_error(T::KIND, "count", e))?;
        Ok(u64::try_from(total).unwrap_or(0))
    }
}
