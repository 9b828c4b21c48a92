use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farmhub_core::{
    Audit, CycleId, DomainResult, Entity, FarmId, Nip, OrderField, UserId, Validate,
    ValidationErrors, trim_optional,
};

pub const MAX_NAME_LEN: usize = 200;

/// Editable farm data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmDetails {
    pub name: String,
    pub producer_number: String,
    pub nip: Nip,
    pub address: Option<String>,
}

impl FarmDetails {
    fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            producer_number: self.producer_number.trim().to_string(),
            nip: self.nip,
            address: trim_optional(self.address),
        }
    }
}

impl Validate for FarmDetails {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .require_non_blank("name", &self.name)
            .require_max_len("name", self.name.trim(), MAX_NAME_LEN)
            .require_non_blank("producer_number", &self.producer_number);
        errors.into_result()
    }
}

/// A farm site.
///
/// # Invariants
/// - name and producer number are non-blank
/// - `active_cycle_id`, when set, refers to a cycle of this farm (checked by
///   the handler that sets it)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Farm {
    id: FarmId,
    #[serde(flatten)]
    details: FarmDetails,
    active_cycle_id: Option<CycleId>,
    #[serde(flatten)]
    audit: Audit,
}

impl Farm {
    pub fn create(details: FarmDetails, by: Option<UserId>, now: DateTime<Utc>) -> DomainResult<Self> {
        details.validate()?;
        Ok(Self {
            id: FarmId::new(),
            details: details.normalized(),
            active_cycle_id: None,
            audit: Audit::new(by, now),
        })
    }

    pub fn details(&self) -> &FarmDetails {
        &self.details
    }

    pub fn active_cycle_id(&self) -> Option<CycleId> {
        self.active_cycle_id
    }

    pub fn update_details(
        &mut self,
        details: FarmDetails,
        by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        details.validate()?;
        self.details = details.normalized();
        self.audit.touch(by, now);
        Ok(())
    }

    pub fn set_active_cycle(&mut self, cycle_id: CycleId, by: Option<UserId>, now: DateTime<Utc>) {
        self.active_cycle_id = Some(cycle_id);
        self.audit.touch(by, now);
    }
}

impl Entity for Farm {
    type Id = FarmId;
    const KIND: &'static str = "farms";

    fn id(&self) -> &FarmId {
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
pub enum FarmOrderBy {
    Name,
    ProducerNumber,
    CreatedAt,
}

impl OrderField for FarmOrderBy {
    fn field(&self) -> &'static str {
        match self {
            FarmOrderBy::Name => "name",
            FarmOrderBy::ProducerNumber => "producer_number",
            FarmOrderBy::CreatedAt => "created_at",
        }
    }
}
