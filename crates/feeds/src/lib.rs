//! Feed deliveries (invoices for feed delivered to a henhouse).

pub mod delivery;

pub use delivery::{FeedDelivery, FeedDeliveryDetails, FeedDeliveryOrderBy};

pub mod specs {
    use chrono::NaiveDate;
    use farmhub_core::{CycleId, FarmId, HenhouseId, Specification};

    use crate::FeedDelivery;

    /// Optional list filters; every `Some` narrows the result.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct FeedDeliveryFilter {
        pub farm_id: Option<FarmId>,
        pub henhouse_id: Option<HenhouseId>,
        pub cycle_id: Option<CycleId>,
        pub invoice_date_from: Option<NaiveDate>,
        pub invoice_date_to: Option<NaiveDate>,
        pub unpaid_only: bool,
    }

    pub fn deliveries(filter: &FeedDeliveryFilter) -> Specification<FeedDelivery> {
        let mut spec = Specification::new()
            .eq_opt("farm_id", filter.farm_id)
            .eq_opt("henhouse_id", filter.henhouse_id)
            .eq_opt("cycle_id", filter.cycle_id);
        if let Some(from) = filter.invoice_date_from {
            spec = spec.gte("invoice_date", from);
        }
        if let Some(to) = filter.invoice_date_to {
            spec = spec.lte("invoice_date", to);
        }
        if filter.unpaid_only {
            spec = spec.is_null("paid_at");
        }
        spec
    }

    pub fn deliveries_of_henhouse(henhouse_id: HenhouseId) -> Specification<FeedDelivery> {
        Specification::new().eq("henhouse_id", henhouse_id)
    }
}
