//! Bird sales to slaughterhouses.
//!
//! This crate contains business rules for sales, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod sale;
pub mod slaughterhouse;

pub use sale::{Sale, SaleDetails, SaleKind, SaleOrderBy};
pub use slaughterhouse::{Slaughterhouse, SlaughterhouseDetails, SlaughterhouseOrderBy};

pub mod specs {
    use chrono::NaiveDate;
    use farmhub_core::{CycleId, FarmId, HenhouseId, SlaughterhouseId, Specification};

    use crate::{Sale, SaleKind};

    #[derive(Debug, Clone, Copy, Default)]
    pub struct SaleFilter {
        pub farm_id: Option<FarmId>,
        pub henhouse_id: Option<HenhouseId>,
        pub cycle_id: Option<CycleId>,
        pub slaughterhouse_id: Option<SlaughterhouseId>,
        pub kind: Option<SaleKind>,
        pub date_from: Option<NaiveDate>,
        pub date_to: Option<NaiveDate>,
    }

    pub fn sales(filter: &SaleFilter) -> Specification<Sale> {
        let mut spec = Specification::new()
            .eq_opt("farm_id", filter.farm_id)
            .eq_opt("henhouse_id", filter.henhouse_id)
            .eq_opt("cycle_id", filter.cycle_id)
            .eq_opt("slaughterhouse_id", filter.slaughterhouse_id)
            .eq_opt("kind", filter.kind);
        if let Some(from) = filter.date_from {
            spec = spec.gte("sale_date", from);
        }
        if let Some(to) = filter.date_to {
            spec = spec.lte("sale_date", to);
        }
        spec
    }

    pub fn sales_to(slaughterhouse_id: SlaughterhouseId) -> Specification<Sale> {
        Specification::new().eq("slaughterhouse_id", slaughterhouse_id)
    }
}
