use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use farmhub_core::{
    Audit, DomainError, DomainResult, Entity, EmployeeId, FarmId, OrderField, UserId, Validate,
    ValidationErrors, trim_optional,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDetails {
    pub full_name: String,
    pub position: String,
    /// Monthly gross salary in grosze.
    pub salary: i64,
    pub contract_start: NaiveDate,
    pub contract_end: Option<NaiveDate>,
    pub comment: Option<String>,
}

impl EmployeeDetails {
    fn normalized(self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            position: self.position.trim().to_string(),
            comment: trim_optional(self.comment),
            ..self
        }
    }
}

impl Validate for EmployeeDetails {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .require_non_blank("full_name", &self.full_name)
            .require_non_blank("position", &self.position)
            .check(self.salary >= 0, "salary", "must not be negative")
            .check(
                self.contract_end.is_none_or(|end| end >= self.contract_start),
                "contract_end",
                "must not be before contract_start",
            );
        errors.into_result()
    }
}

/// Employment record. `Inactive` once the contract has been terminated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    id: EmployeeId,
    farm_id: FarmId,
    #[serde(flatten)]
    details: EmployeeDetails,
    status: EmployeeStatus,
    #[serde(flatten)]
    audit: Audit,
}

impl Employee {
    pub fn hire(
        farm_id: FarmId,
        details: EmployeeDetails,
        by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        details.validate()?;
        Ok(Self {
            id: EmployeeId::new(),
            farm_id,
            details: details.normalized(),
            status: EmployeeStatus::Active,
            audit: Audit::new(by, now),
        })
    }

    pub fn farm_id(&self) -> FarmId {
        self.farm_id
    }

    pub fn details(&self) -> &EmployeeDetails {
        &self.details
    }

    pub fn status(&self) -> EmployeeStatus {
        self.status
    }

    pub fn update_details(
        &mut self,
        details: EmployeeDetails,
        by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        details.validate()?;
        if self.status == EmployeeStatus::Inactive && details.contract_end != self.details.contract_end {
            return Err(DomainError::invariant("contract end of a terminated employee cannot change"));
        }
        self.details = details.normalized();
        self.audit.touch(by, now);
        Ok(())
    }

    /// End the contract on `end` and mark the employee inactive.
    pub fn terminate(&mut self, end: NaiveDate, by: Option<UserId>, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status == EmployeeStatus::Inactive {
            return Err(DomainError::invariant("employee is already inactive"));
        }
        if end < self.details.contract_start {
            return Err(DomainError::validation("contract_end", "must not be before contract_start"));
        }
        self.details.contract_end = Some(end);
        self.status = EmployeeStatus::Inactive;
        self.audit.touch(by, now);
        Ok(())
    }
}

impl Entity for Employee {
    type Id = EmployeeId;
    const KIND: &'static str = "employees";

    fn id(&self) -> &EmployeeId {
        &self.id
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeOrderBy {
    FullName,
    Position,
    Salary,
    ContractStart,
    CreatedAt,
}

impl OrderField for EmployeeOrderBy {
    fn field(&self) -> &'static str {
        match self {
            EmployeeOrderBy::FullName => "full_name",
            EmployeeOrderBy::Position => "position",
            EmployeeOrderBy::Salary => "salary",
            EmployeeOrderBy::ContractStart => "contract_start",
            EmployeeOrderBy::CreatedAt => "created_at",
        }
    }
}
