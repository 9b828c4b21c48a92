//! Employee records per farm.

pub mod employee;

pub use employee::{Employee, EmployeeDetails, EmployeeOrderBy, EmployeeStatus};

pub mod specs {
    use farmhub_core::{FarmId, Specification};

    use crate::{Employee, EmployeeStatus};

    pub fn employees(farm_id: Option<FarmId>, status: Option<EmployeeStatus>) -> Specification<Employee> {
        Specification::new()
            .eq_opt("farm_id", farm_id)
            .eq_opt("status", status)
    }
}
