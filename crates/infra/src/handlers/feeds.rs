//! Feed deliveries and their payment status.

use chrono::NaiveDate;
use tracing::info;

use farmhub_auth::catalog;
use farmhub_core::{CycleId, Entity, FarmId, FeedDeliveryId, HenhouseId, Page, PageRequest, Validate, ValidationErrors};
use farmhub_feeds::specs::{FeedDeliveryFilter, deliveries};
use farmhub_feeds::{FeedDelivery, FeedDeliveryDetails, FeedDeliveryOrderBy};

use crate::dispatch::{Access, Handler, Request, RequestContext};
use crate::error::AppError;
use crate::handlers::{check_range, load, remove};
use crate::repository::{Repository, paged};
use crate::services::Services;

/// Record a delivery. Without `cycle_id` it lands in the farm's active cycle.
#[derive(Debug, Clone)]
pub struct AddFeedDelivery {
    pub farm_id: FarmId,
    pub henhouse_id: HenhouseId,
    pub cycle_id: Option<CycleId>,
    pub details: FeedDeliveryDetails,
}

impl Request for AddFeedDelivery {
    type Response = FeedDelivery;
    const NAME: &'static str = "AddFeedDelivery";
    const ACCESS: Access = Access::Permission(catalog::FEEDS_MANAGE);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.details.validate()
    }
}

#[async_trait::async_trait]
impl Handler<AddFeedDelivery> for Services {
    async fn handle(&self, ctx: &RequestContext, request: AddFeedDelivery) -> Result<FeedDelivery, AppError> {
        let farm = self.load_farm(request.farm_id).await?;
        self.load_henhouse(request.farm_id, request.henhouse_id).await?;
        let cycle_id = self.resolve_cycle(&farm, request.cycle_id).await?;

        let delivery = FeedDelivery::create(
            request.farm_id,
            request.henhouse_id,
            cycle_id,
            request.details,
            ctx.actor(),
            ctx.now,
        )?;
        self.repos.feed_deliveries.add(&delivery).await?;
        info!(delivery_id = %delivery.id(), farm_id = %request.farm_id, total = delivery.total(), "feed delivery recorded");
        Ok(delivery)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListFeedDeliveries {
    pub filter: FeedDeliveryFilter,
    pub page: PageRequest<FeedDeliveryOrderBy>,
}

impl Request for ListFeedDeliveries {
    type Response = Page<FeedDelivery>;
    const NAME: &'static str = "ListFeedDeliveries";
    const ACCESS: Access = Access::Permission(catalog::FEEDS_VIEW);

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = self.page.validate().err().unwrap_or_default();
        check_range(
            &mut errors,
            "invoice_date_from",
            self.filter.invoice_date_from,
            self.filter.invoice_date_to,
        );
        errors.into_result()
    }
}

#[async_trait::async_trait]
impl Handler<ListFeedDeliveries> for Services {
    async fn handle(
        &self,
        _ctx: &RequestContext,
        request: ListFeedDeliveries,
    ) -> Result<Page<FeedDelivery>, AppError> {
        let spec = deliveries(&request.filter);
        Ok(paged(self.repos.feed_deliveries.as_ref(), spec, &request.page).await?)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetFeedDelivery {
    pub id: FeedDeliveryId,
}

impl Request for GetFeedDelivery {
    type Response = FeedDelivery;
    const NAME: &'static str = "GetFeedDelivery";
    const ACCESS: Access = Access::Permission(catalog::FEEDS_VIEW);
}

#[async_trait::async_trait]
impl Handler<GetFeedDelivery> for Services {
    async fn handle(&self, _ctx: &RequestContext, request: GetFeedDelivery) -> Result<FeedDelivery, AppError> {
        load(self.repos.feed_deliveries.as_ref(), request.id, "feed delivery").await
    }
}

#[derive(Debug, Clone)]
pub struct UpdateFeedDelivery {
    pub id: FeedDeliveryId,
    pub details: FeedDeliveryDetails,
}

impl Request for UpdateFeedDelivery {
    type Response = FeedDelivery;
    const NAME: &'static str = "UpdateFeedDelivery";
    const ACCESS: Access = Access::Permission(catalog::FEEDS_MANAGE);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.details.validate()
    }
}

#[async_trait::async_trait]
impl Handler<UpdateFeedDelivery> for Services {
    async fn handle(&self, ctx: &RequestContext, request: UpdateFeedDelivery) -> Result<FeedDelivery, AppError> {
        let mut delivery = load(self.repos.feed_deliveries.as_ref(), request.id, "feed delivery").await?;
        delivery.update_details(request.details, ctx.actor(), ctx.now)?;
        self.repos.feed_deliveries.update(&delivery).await?;
        Ok(delivery)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MarkFeedDeliveryPaid {
    pub id: FeedDeliveryId,
    pub paid_at: NaiveDate,
}

impl Request for MarkFeedDeliveryPaid {
    type Response = FeedDelivery;
    const NAME: &'static str = "MarkFeedDeliveryPaid";
    const ACCESS: Access = Access::Permission(catalog::FEEDS_MANAGE);
}

#[async_trait::async_trait]
impl Handler<MarkFeedDeliveryPaid> for Services {
    async fn handle(&self, ctx: &RequestContext, request: MarkFeedDeliveryPaid) -> Result<FeedDelivery, AppError> {
        let mut delivery = load(self.repos.feed_deliveries.as_ref(), request.id, "feed delivery").await?;
        delivery.mark_paid(request.paid_at, ctx.actor(), ctx.now)?;
        self.repos.feed_deliveries.update(&delivery).await?;
        Ok(delivery)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteFeedDelivery {
    pub id: FeedDeliveryId,
}

impl Request for DeleteFeedDelivery {
    type Response = ();
    const NAME: &'static str = "DeleteFeedDelivery";
    const ACCESS: Access = Access::Permission(catalog::FEEDS_MANAGE);
}

#[async_trait::async_trait]
impl Handler<DeleteFeedDelivery> for Services {
    async fn handle(&self, ctx: &RequestContext, request: DeleteFeedDelivery) -> Result<(), AppError> {
        let delivery = load(self.repos.feed_deliveries.as_ref(), request.id, "feed delivery").await?;
        remove(self.repos.feed_deliveries.as_ref(), delivery, ctx).await
    }
}
