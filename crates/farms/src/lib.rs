//! Farms, their henhouses and production cycles.
//!
//! Pure domain logic: no IO, no HTTP, no storage.

pub mod cycle;
pub mod farm;
pub mod henhouse;

pub use cycle::{Cycle, CycleOrderBy, validate_cycle_number};
pub use farm::{Farm, FarmDetails, FarmOrderBy};
pub use henhouse::{Henhouse, HenhouseDetails, HenhouseOrderBy};

/// Named query specifications used by the farm handlers.
pub mod specs {
    use farmhub_core::{FarmId, Specification};

    use crate::{Cycle, Farm, Henhouse};

    pub fn farms() -> Specification<Farm> {
        Specification::new()
    }

    pub fn henhouses_of_farm(farm_id: FarmId) -> Specification<Henhouse> {
        Specification::new().eq("farm_id", farm_id)
    }

    pub fn henhouse_code_taken(farm_id: FarmId, code: &str) -> Specification<Henhouse> {
        henhouses_of_farm(farm_id).eq("code", code.trim())
    }

    pub fn cycles_of_farm(farm_id: FarmId) -> Specification<Cycle> {
        Specification::new().eq("farm_id", farm_id)
    }

    pub fn cycle_number(farm_id: FarmId, identifier: u32, year: i32) -> Specification<Cycle> {
        cycles_of_farm(farm_id).eq("identifier", identifier).eq("year", year)
    }
}
