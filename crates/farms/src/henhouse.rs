use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farmhub_core::{
    Audit, DomainResult, Entity, FarmId, HenhouseId, OrderField, UserId, Validate,
    ValidationErrors, trim_optional,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HenhouseDetails {
    pub name: String,
    pub code: String,
    /// Floor area in square metres.
    pub area_m2: f64,
    pub description: Option<String>,
}

impl HenhouseDetails {
    fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            code: self.code.trim().to_string(),
            area_m2: self.area_m2,
            description: trim_optional(self.description),
        }
    }
}

impl Validate for HenhouseDetails {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .require_non_blank("name", &self.name)
            .require_non_blank("code", &self.code)
            .require_positive("area_m2", self.area_m2);
        errors.into_result()
    }
}

/// A building on a farm. Belongs to exactly one farm for its whole life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Henhouse {
    id: HenhouseId,
    farm_id: FarmId,
    #[serde(flatten)]
    details: HenhouseDetails,
    #[serde(flatten)]
    audit: Audit,
}

impl Henhouse {
    pub fn create(
        farm_id: FarmId,
        details: HenhouseDetails,
        by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        details.validate()?;
        Ok(Self {
            id: HenhouseId::new(),
            farm_id,
            details: details.normalized(),
            audit: Audit::new(by, now),
        })
    }

    pub fn farm_id(&self) -> FarmId {
        self.farm_id
    }

    pub fn details(&self) -> &HenhouseDetails {
        &self.details
    }

    pub fn update_details(
        &mut self,
        details: HenhouseDetails,
        by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        details.validate()?;
        self.details = details.normalized();
        self.audit.touch(by, now);
        Ok(())
    }
}

impl Entity for Henhouse {
    type Id = HenhouseId;
    const KIND: &'static str = "henhouses";

    fn id(&self) -> &HenhouseId {
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
pub enum HenhouseOrderBy {
    Name,
    Code,
    Area,
    CreatedAt,
}

impl OrderField for HenhouseOrderBy {
    fn field(&self) -> &'static str {
        match self {
            HenhouseOrderBy::Name => "name",
            HenhouseOrderBy::Code => "code",
            HenhouseOrderBy::Area => "area_m2",
            HenhouseOrderBy::CreatedAt => "created_at",
        }
    }
}
