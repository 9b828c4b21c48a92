use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use farmhub_core::{
    Audit, CycleId, DomainResult, Entity, ExpenseContractorId, ExpenseId, FarmId, OrderField,
    UserId, Validate, ValidationErrors, trim_optional,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseKind {
    Veterinary,
    Utilities,
    Bedding,
    Chicks,
    Transport,
    Gas,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseDetails {
    pub contractor_id: ExpenseContractorId,
    pub kind: ExpenseKind,
    /// Grosze.
    pub amount: i64,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub comment: Option<String>,
}

impl ExpenseDetails {
    fn normalized(self) -> Self {
        Self {
            invoice_number: self.invoice_number.trim().to_string(),
            comment: trim_optional(self.comment),
            ..self
        }
    }
}

impl Validate for ExpenseDetails {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .check(self.amount > 0, "amount", "must be greater than 0")
            .require_non_blank("invoice_number", &self.invoice_number);
        errors.into_result()
    }
}

/// Cost booked against a farm's production cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    id: ExpenseId,
    farm_id: FarmId,
    cycle_id: CycleId,
    #[serde(flatten)]
    details: ExpenseDetails,
    #[serde(flatten)]
    audit: Audit,
}

impl Expense {
    pub fn create(
        farm_id: FarmId,
        cycle_id: CycleId,
        details: ExpenseDetails,
        by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        details.validate()?;
        Ok(Self {
            id: ExpenseId::new(),
            farm_id,
            cycle_id,
            details: details.normalized(),
            audit: Audit::new(by, now),
        })
    }

    pub fn farm_id(&self) -> FarmId {
        self.farm_id
    }

    pub fn cycle_id(&self) -> CycleId {
        self.cycle_id
    }

    pub fn details(&self) -> &ExpenseDetails {
        &self.details
    }

    pub fn update_details(
        &mut self,
        details: ExpenseDetails,
        by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        details.validate()?;
        self.details = details.normalized();
        self.audit.touch(by, now);
        Ok(())
    }
}

impl Entity for Expense {
    type Id = ExpenseId;
    const KIND: &'static str = "expenses";

    fn id(&self) -> &ExpenseId {
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
pub enum ExpenseOrderBy {
    InvoiceDate,
    Amount,
    Kind,
    CreatedAt,
}

impl OrderField for ExpenseOrderBy {
    fn field(&self) -> &'static str {
        match self {
            ExpenseOrderBy::InvoiceDate => "invoice_date",
            ExpenseOrderBy::Amount => "amount",
            ExpenseOrderBy::Kind => "kind",
            ExpenseOrderBy::CreatedAt => "created_at",
        }
    }
}
