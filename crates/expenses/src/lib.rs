//! Expenses and the contractors that invoice them.

pub mod contractor;
pub mod expense;

pub use contractor::{ContractorDetails, ContractorOrderBy, ExpenseContractor};
pub use expense::{Expense, ExpenseDetails, ExpenseKind, ExpenseOrderBy};

pub mod specs {
    use chrono::NaiveDate;
    use farmhub_core::{CycleId, ExpenseContractorId, FarmId, Specification};

    use crate::{Expense, ExpenseKind};

    #[derive(Debug, Clone, Copy, Default)]
    pub struct ExpenseFilter {
        pub farm_id: Option<FarmId>,
        pub cycle_id: Option<CycleId>,
        pub contractor_id: Option<ExpenseContractorId>,
        pub kind: Option<ExpenseKind>,
        pub date_from: Option<NaiveDate>,
        pub date_to: Option<NaiveDate>,
    }

    pub fn expenses(filter: &ExpenseFilter) -> Specification<Expense> {
        let mut spec = Specification::new()
            .eq_opt("farm_id", filter.farm_id)
            .eq_opt("cycle_id", filter.cycle_id)
            .eq_opt("contractor_id", filter.contractor_id)
            .eq_opt("kind", filter.kind);
        if let Some(from) = filter.date_from {
            spec = spec.gte("invoice_date", from);
        }
        if let Some(to) = filter.date_to {
            spec = spec.lte("invoice_date", to);
        }
        spec
    }

    pub fn expenses_of_contractor(contractor_id: ExpenseContractorId) -> Specification<Expense> {
        Specification::new().eq("contractor_id", contractor_id)
    }
}
