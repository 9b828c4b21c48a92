//! Use-case handlers, one module per area.
//!
//! Each request type implements [`crate::dispatch::Request`] (access rule and
//! field validation) and is handled by an `impl Handler<_> for Services`.

use farmhub_core::{CycleId, Entity, FarmId, HenhouseId, ValidationErrors, soft_delete};
use farmhub_farms::{Farm, Henhouse};

use crate::dispatch::RequestContext;
use crate::error::AppError;
use crate::repository::Repository;
use crate::services::Services;

pub mod auth;
pub mod employees;
pub mod expenses;
pub mod farms;
pub mod feeds;
pub mod sales;
pub mod users;

/// Load a live entity or fail with `NotFound(what)`.
pub(crate) async fn load<T: Entity>(
    repo: &dyn Repository<T>,
    id: T::Id,
    what: &'static str,
) -> Result<T, AppError> {
    repo.get(id).await?.ok_or_else(|| AppError::not_found(what))
}

/// Soft-delete and persist.
pub(crate) async fn remove<T: Entity>(
    repo: &dyn Repository<T>,
    mut entity: T,
    ctx: &RequestContext,
) -> Result<(), AppError> {
    soft_delete(&mut entity, ctx.actor(), ctx.now);
    repo.update(&entity).await?;
    Ok(())
}

/// Reject an inverted optional date range.
pub(crate) fn check_range<D: PartialOrd>(
    errors: &mut ValidationErrors,
    field: &str,
    from: Option<D>,
    to: Option<D>,
) {
    if let (Some(from), Some(to)) = (from, to) {
        errors.check(from <= to, field, "range start must not be after its end");
    }
}

impl Services {
    pub(crate) async fn load_farm(&self, farm_id: FarmId) -> Result<Farm, AppError> {
        load(self.repos.farms.as_ref(), farm_id, "farm").await
    }

    /// A henhouse that belongs to `farm_id`; anything else is not found.
    pub(crate) async fn load_henhouse(&self, farm_id: FarmId, henhouse_id: HenhouseId) -> Result<Henhouse, AppError> {
        let henhouse = load(self.repos.henhouses.as_ref(), henhouse_id, "henhouse").await?;
        if henhouse.farm_id() != farm_id {
            return Err(AppError::not_found("henhouse"));
        }
        Ok(henhouse)
    }

    /// The explicit cycle (which must belong to the farm) or the farm's
    /// active cycle.
    pub(crate) async fn resolve_cycle(&self, farm: &Farm, cycle_id: Option<CycleId>) -> Result<CycleId, AppError> {
        match cycle_id {
            Some(id) => {
                let cycle = load(self.repos.cycles.as_ref(), id, "cycle").await?;
                if cycle.farm_id() != *farm.id() {
                    return Err(AppError::not_found("cycle"));
                }
                Ok(id)
            }
            None => farm
                .active_cycle_id()
                .ok_or_else(|| AppError::validation("cycle_id", "farm has no active cycle")),
        }
    }
}
