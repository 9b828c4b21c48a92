use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use farmhub_core::{
    Audit, CycleId, DomainResult, Entity, FarmId, HenhouseId, OrderField, SaleId,
    SlaughterhouseId, UserId, Validate, ValidationErrors, trim_optional,
};

/// Partial sales thin the flock; the total sale empties the henhouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleKind {
    Partial,
    Total,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleDetails {
    pub slaughterhouse_id: SlaughterhouseId,
    pub kind: SaleKind,
    pub sale_date: NaiveDate,
    /// Birds loaded.
    pub quantity: u32,
    pub weight_kg: f64,
    /// Birds rejected at the slaughterhouse.
    pub confiscated_count: u32,
    /// Birds dead on arrival.
    pub dead_count: u32,
    /// Grosze per kilogram.
    pub price_per_kg: i64,
    pub comment: Option<String>,
}

impl Validate for SaleDetails {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .check(self.quantity >= 1, "quantity", "must be at least 1")
            .require_positive("weight_kg", self.weight_kg)
            .check(self.price_per_kg >= 0, "price_per_kg", "must not be negative")
            .check(
                u64::from(self.confiscated_count) + u64::from(self.dead_count) <= u64::from(self.quantity),
                "confiscated_count",
                "confiscated and dead birds must not exceed quantity",
            );
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    id: SaleId,
    farm_id: FarmId,
    henhouse_id: HenhouseId,
    cycle_id: CycleId,
    #[serde(flatten)]
    details: SaleDetails,
    #[serde(flatten)]
    audit: Audit,
}

impl Sale {
    pub fn create(
        farm_id: FarmId,
        henhouse_id: HenhouseId,
        cycle_id: CycleId,
        details: SaleDetails,
        by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        details.validate()?;
        Ok(Self {
            id: SaleId::new(),
            farm_id,
            henhouse_id,
            cycle_id,
            details: SaleDetails {
                comment: trim_optional(details.comment),
                ..details
            },
            audit: Audit::new(by, now),
        })
    }

    pub fn farm_id(&self) -> FarmId {
        self.farm_id
    }

    pub fn henhouse_id(&self) -> HenhouseId {
        self.henhouse_id
    }

    pub fn cycle_id(&self) -> CycleId {
        self.cycle_id
    }

    pub fn details(&self) -> &SaleDetails {
        &self.details
    }

    /// Sale value in grosze.
    pub fn total(&self) -> i64 {
        (self.details.weight_kg * self.details.price_per_kg as f64).round() as i64
    }

    /// Mean live weight of a bird, in kilograms.
    pub fn average_weight_kg(&self) -> f64 {
        self.details.weight_kg / f64::from(self.details.quantity)
    }

    pub fn update_details(
        &mut self,
        details: SaleDetails,
        by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        details.validate()?;
        self.details = SaleDetails {
            comment: trim_optional(details.comment),
            ..details
        };
        self.audit.touch(by, now);
        Ok(())
    }
}

impl Entity for Sale {
    type Id = SaleId;
    const KIND: &'static str = "sales";

    fn id(&self) -> &SaleId {
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
pub enum SaleOrderBy {
    SaleDate,
    Quantity,
    Weight,
    CreatedAt,
}

impl OrderField for SaleOrderBy {
    fn field(&self) -> &'static str {
        match self {
            SaleOrderBy::SaleDate => "sale_date",
            SaleOrderBy::Quantity => "quantity",
            SaleOrderBy::Weight => "weight_kg",
            SaleOrderBy::CreatedAt => "created_at",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn details(quantity: u32, confiscated: u32, dead: u32) -> SaleDetails {
        SaleDetails {
            slaughterhouse_id: SlaughterhouseId::new(),
            kind: SaleKind::Partial,
            sale_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            quantity,
            weight_kg: 25_000.0,
            confiscated_count: confiscated,
            dead_count: dead,
            price_per_kg: 520,
            comment: Some(" ".into()),
        }
    }

    #[test]
    fn totals() {
        let sale = Sale::create(
            FarmId::new(),
            HenhouseId::new(),
            CycleId::new(),
            details(10_000, 12, 8),
            None,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(sale.total(), 13_000_000);
        assert_eq!(sale.average_weight_kg(), 2.5);
        assert_eq!(sale.details().comment, None);
    }

    #[test]
    fn kind_serializes_snake_case() {
        assert_eq!(serde_json::to_value(SaleKind::Total).unwrap(), "total");
    }

    proptest! {
        #[test]
        fn losses_never_exceed_quantity(q in 1u32..100_000, c in 0u32..100_000, d in 0u32..100_000) {
            let valid = details(q, c, d).validate().is_ok();
            prop_assert_eq!(valid, u64::from(c) + u64::from(d) <= u64::from(q));
        }
    }
}
