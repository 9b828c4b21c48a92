use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farmhub_core::{
    Audit, DomainResult, Entity, ExpenseContractorId, Nip, OrderField, UserId, Validate,
    ValidationErrors, trim_optional,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractorDetails {
    pub name: String,
    pub nip: Nip,
    pub address: Option<String>,
}

impl Validate for ContractorDetails {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_non_blank("name", &self.name);
        errors.into_result()
    }
}

/// Supplier an expense invoice is issued by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseContractor {
    id: ExpenseContractorId,
    #[serde(flatten)]
    details: ContractorDetails,
    #[serde(flatten)]
    audit: Audit,
}

fn normalized(details: ContractorDetails) -> ContractorDetails {
    ContractorDetails {
        name: details.name.trim().to_string(),
        nip: details.nip,
        address: trim_optional(details.address),
    }
}

impl ExpenseContractor {
    pub fn create(details: ContractorDetails, by: Option<UserId>, now: DateTime<Utc>) -> DomainResult<Self> {
        details.validate()?;
        Ok(Self {
            id: ExpenseContractorId::new(),
            details: normalized(details),
            audit: Audit::new(by, now),
        })
    }

    pub fn details(&self) -> &ContractorDetails {
        &self.details
    }

    pub fn update_details(
        &mut self,
        details: ContractorDetails,
        by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        details.validate()?;
        self.details = normalized(details);
        self.audit.touch(by, now);
        Ok(())
    }
}

impl Entity for ExpenseContractor {
    type Id = ExpenseContractorId;
    const KIND: &'static str = "expense_contractors";

    fn id(&self) -> &ExpenseContractorId {
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
pub enum ContractorOrderBy {
    Name,
    CreatedAt,
}

impl OrderField for ContractorOrderBy {
    fn field(&self) -> &'static str {
        match self {
            ContractorOrderBy::Name => "name",
            ContractorOrderBy::CreatedAt => "created_at",
        }
    }
}
