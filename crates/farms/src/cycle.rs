use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use farmhub_core::{
    Audit, CycleId, DomainResult, Entity, FarmId, OrderField, UserId, ValidationErrors,
};

pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2100;

/// One production run of birds on a farm, labelled `"{identifier}/{year}"`.
///
/// Uniqueness of (farm, identifier, year) is a storage-level concern and is
/// enforced by the create handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    id: CycleId,
    farm_id: FarmId,
    identifier: u32,
    year: i32,
    started_at: NaiveDate,
    #[serde(flatten)]
    audit: Audit,
}

pub fn validate_cycle_number(identifier: u32, year: i32) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors
        .check(identifier >= 1, "identifier", "must be at least 1")
        .check(
            (MIN_YEAR..=MAX_YEAR).contains(&year),
            "year",
            format!("must be between {MIN_YEAR} and {MAX_YEAR}"),
        );
    errors.into_result()
}

impl Cycle {
    pub fn create(
        farm_id: FarmId,
        identifier: u32,
        year: i32,
        started_at: NaiveDate,
        by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        validate_cycle_number(identifier, year)?;
        Ok(Self {
            id: CycleId::new(),
            farm_id,
            identifier,
            year,
            started_at,
            audit: Audit::new(by, now),
        })
    }

    pub fn farm_id(&self) -> FarmId {
        self.farm_id
    }

    pub fn identifier(&self) -> u32 {
        self.identifier
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn started_at(&self) -> NaiveDate {
        self.started_at
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl core::fmt::Display for Cycle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.identifier, self.year)
    }
}

impl Entity for Cycle {
    type Id = CycleId;
    const KIND: &'static str = "cycles";

    fn id(&self) -> &CycleId {
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
pub enum CycleOrderBy {
    Identifier,
    Year,
    StartedAt,
    CreatedAt,
}

impl OrderField for CycleOrderBy {
    fn field(&self) -> &'static str {
        match self {
            CycleOrderBy::Identifier => "identifier",
            CycleOrderBy::Year => "year",
            CycleOrderBy::StartedAt => "started_at",
            CycleOrderBy::CreatedAt => "created_at",
        }
    }
}
