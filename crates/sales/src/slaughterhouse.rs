use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farmhub_core::{
    Audit, DomainResult, Entity, Nip, OrderField, SlaughterhouseId, UserId, Validate,
    ValidationErrors, trim_optional,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaughterhouseDetails {
    pub name: String,
    pub producer_number: String,
    pub nip: Nip,
    pub address: Option<String>,
}

impl SlaughterhouseDetails {
    fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            producer_number: self.producer_number.trim().to_string(),
            nip: self.nip,
            address: trim_optional(self.address),
        }
    }
}

impl Validate for SlaughterhouseDetails {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .require_non_blank("name", &self.name)
            .require_non_blank("producer_number", &self.producer_number);
        errors.into_result()
    }
}

/// Buyer of the birds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slaughterhouse {
    id: SlaughterhouseId,
    #[serde(flatten)]
    details: SlaughterhouseDetails,
    #[serde(flatten)]
    audit: Audit,
}

impl Slaughterhouse {
    pub fn create(
        details: SlaughterhouseDetails,
        by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        details.validate()?;
        Ok(Self {
            id: SlaughterhouseId::new(),
            details: details.normalized(),
            audit: Audit::new(by, now),
        })
    }

    pub fn details(&self) -> &SlaughterhouseDetails {
        &self.details
    }

    pub fn update_details(
        &mut self,
        details: SlaughterhouseDetails,
        by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        details.validate()?;
        self.details = details.normalized();
        self.audit.touch(by, now);
        Ok(())
    }
}

impl Entity for Slaughterhouse {
    type Id = SlaughterhouseId;
    const KIND: &'static str = "slaughterhouses";

    fn id(&self) -> &SlaughterhouseId {
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
pub enum SlaughterhouseOrderBy {
    Name,
    CreatedAt,
}

impl OrderField for SlaughterhouseOrderBy {
    fn field(&self) -> &'static str {
        match self {
            SlaughterhouseOrderBy::Name => "name",
            SlaughterhouseOrderBy::CreatedAt => "created_at",
        }
    }
}
