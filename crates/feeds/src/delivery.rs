use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use farmhub_core::{
    Audit, CycleId, DomainError, DomainResult, Entity, FarmId, FeedDeliveryId, HenhouseId,
    OrderField, UserId, Validate, ValidationErrors, trim_optional,
};

/// Invoice-level data of a feed delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedDeliveryDetails {
    pub vendor_name: String,
    pub item_name: String,
    pub quantity_tons: f64,
    /// Net price per ton in grosze.
    pub unit_price: i64,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub comment: Option<String>,
}

impl FeedDeliveryDetails {
    fn normalized(self) -> Self {
        Self {
            vendor_name: self.vendor_name.trim().to_string(),
            item_name: self.item_name.trim().to_string(),
            invoice_number: self.invoice_number.trim().to_string(),
            comment: trim_optional(self.comment),
            ..self
        }
    }
}

impl Validate for FeedDeliveryDetails {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .require_non_blank("vendor_name", &self.vendor_name)
            .require_non_blank("item_name", &self.item_name)
            .require_positive("quantity_tons", self.quantity_tons)
            .check(self.unit_price >= 0, "unit_price", "must not be negative")
            .require_non_blank("invoice_number", &self.invoice_number)
            .check(
                self.due_date.is_none_or(|due| due >= self.invoice_date),
                "due_date",
                "must not be before invoice_date",
            );
        errors.into_result()
    }
}

/// A delivery of feed to one henhouse within a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedDelivery {
    id: FeedDeliveryId,
    farm_id: FarmId,
    henhouse_id: HenhouseId,
    cycle_id: CycleId,
    #[serde(flatten)]
    details: FeedDeliveryDetails,
    paid_at: Option<NaiveDate>,
    #[serde(flatten)]
    audit: Audit,
}

impl FeedDelivery {
    pub fn create(
        farm_id: FarmId,
        henhouse_id: HenhouseId,
        cycle_id: CycleId,
        details: FeedDeliveryDetails,
        by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        details.validate()?;
        Ok(Self {
            id: FeedDeliveryId::new(),
            farm_id,
            henhouse_id,
            cycle_id,
            details: details.normalized(),
            paid_at: None,
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

    pub fn details(&self) -> &FeedDeliveryDetails {
        &self.details
    }

    pub fn paid_at(&self) -> Option<NaiveDate> {
        self.paid_at
    }

    /// Invoice value in grosze, rounded to the nearest unit.
    pub fn total(&self) -> i64 {
        (self.details.quantity_tons * self.details.unit_price as f64).round() as i64
    }

    pub fn update_details(
        &mut self,
        details: FeedDeliveryDetails,
        by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        details.validate()?;
        if self.paid_at.is_some_and(|paid| paid < details.invoice_date) {
            return Err(DomainError::validation("invoice_date", "must not be after paid_at"));
        }
        self.details = details.normalized();
        self.audit.touch(by, now);
        Ok(())
    }

    pub fn mark_paid(&mut self, date: NaiveDate, by: Option<UserId>, now: DateTime<Utc>) -> DomainResult<()> {
        if date < self.details.invoice_date {
            return Err(DomainError::validation("paid_at", "must not be before invoice_date"));
        }
        self.paid_at = Some(date);
        self.audit.touch(by, now);
        Ok(())
    }
}

impl Entity for FeedDelivery {
    type Id = FeedDeliveryId;
    const KIND: &'static str = "feed_deliveries";

    fn id(&self) -> &FeedDeliveryId {
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
pub enum FeedDeliveryOrderBy {
    InvoiceDate,
    DueDate,
    VendorName,
    Quantity,
    CreatedAt,
}

impl OrderField for FeedDeliveryOrderBy {
    fn field(&self) -> &'static str {
        match self {
            FeedDeliveryOrderBy::InvoiceDate => "invoice_date",
            FeedDeliveryOrderBy::DueDate => "due_date",
            FeedDeliveryOrderBy::VendorName => "vendor_name",
            FeedDeliveryOrderBy::Quantity => "quantity_tons",
            FeedDeliveryOrderBy::CreatedAt => "created_at",
        }
    }
}
