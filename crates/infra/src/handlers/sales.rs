//! Slaughterhouses and bird sales.

use serde::Deserialize;
use tracing::info;

use farmhub_auth::catalog;
use farmhub_core::{
    CycleId, Entity, FarmId, HenhouseId, Nip, Page, PageRequest, SaleId, SlaughterhouseId, Specification,
    Validate, ValidationErrors,
};
use farmhub_sales::specs::{SaleFilter, sales, sales_to};
use farmhub_sales::{Sale, SaleDetails, SaleOrderBy, Slaughterhouse, SlaughterhouseDetails, SlaughterhouseOrderBy};

use crate::dispatch::{Access, Handler, Request, RequestContext};
use crate::error::AppError;
use crate::handlers::{check_range, load, remove};
use crate::repository::{Repository, paged};
use crate::services::Services;

#[derive(Debug, Clone, Deserialize)]
pub struct SlaughterhouseInput {
    pub name: String,
    pub producer_number: String,
    pub nip: String,
    #[serde(default)]
    pub address: Option<String>,
}

impl Validate for SlaughterhouseInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .require_non_blank("name", &self.name)
            .require_non_blank("producer_number", &self.producer_number)
            .require_nip("nip", &self.nip);
        errors.into_result()
    }
}

impl SlaughterhouseInput {
    fn into_details(self) -> Result<SlaughterhouseDetails, AppError> {
        Ok(SlaughterhouseDetails {
            nip: Nip::parse(&self.nip)?,
            name: self.name,
            producer_number: self.producer_number,
            address: self.address,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CreateSlaughterhouse {
    pub input: SlaughterhouseInput,
}

impl Request for CreateSlaughterhouse {
    type Response = Slaughterhouse;
    const NAME: &'static str = "CreateSlaughterhouse";
    const ACCESS: Access = Access::Permission(catalog::SALES_MANAGE);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.input.validate()
    }
}

#[async_trait::async_trait]
impl Handler<CreateSlaughterhouse> for Services {
    async fn handle(&self, ctx: &RequestContext, request: CreateSlaughterhouse) -> Result<Slaughterhouse, AppError> {
        let slaughterhouse = Slaughterhouse::create(request.input.into_details()?, ctx.actor(), ctx.now)?;
        self.repos.slaughterhouses.add(&slaughterhouse).await?;
        Ok(slaughterhouse)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListSlaughterhouses {
    pub page: PageRequest<SlaughterhouseOrderBy>,
}

impl Request for ListSlaughterhouses {
    type Response = Page<Slaughterhouse>;
    const NAME: &'static str = "ListSlaughterhouses";
    const ACCESS: Access = Access::Permission(catalog::SALES_VIEW);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.page.validate()
    }
}

#[async_trait::async_trait]
impl Handler<ListSlaughterhouses> for Services {
    async fn handle(
        &self,
        _ctx: &RequestContext,
        request: ListSlaughterhouses,
    ) -> Result<Page<Slaughterhouse>, AppError> {
        Ok(paged(self.repos.slaughterhouses.as_ref(), Specification::new(), &request.page).await?)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetSlaughterhouse {
    pub id: SlaughterhouseId,
}

impl Request for GetSlaughterhouse {
    type Response = Slaughterhouse;
    const NAME: &'static str = "GetSlaughterhouse";
    const ACCESS: Access = Access::Permission(catalog::SALES_VIEW);
}

#[async_trait::async_trait]
impl Handler<GetSlaughterhouse> for Services {
    async fn handle(&self, _ctx: &RequestContext, request: GetSlaughterhouse) -> Result<Slaughterhouse, AppError> {
        load(self.repos.slaughterhouses.as_ref(), request.id, "slaughterhouse").await
    }
}

#[derive(Debug, Clone)]
pub struct UpdateSlaughterhouse {
    pub id: SlaughterhouseId,
    pub input: SlaughterhouseInput,
}

impl Request for UpdateSlaughterhouse {
    type Response = Slaughterhouse;
    const NAME: &'static str = "UpdateSlaughterhouse";
    const ACCESS: Access = Access::Permission(catalog::SALES_MANAGE);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.input.validate()
    }
}

#[async_trait::async_trait]
impl Handler<UpdateSlaughterhouse> for Services {
    async fn handle(&self, ctx: &RequestContext, request: UpdateSlaughterhouse) -> Result<Slaughterhouse, AppError> {
        let mut slaughterhouse = load(self.repos.slaughterhouses.as_ref(), request.id, "slaughterhouse").await?;
        slaughterhouse.update_details(request.input.into_details()?, ctx.actor(), ctx.now)?;
        self.repos.slaughterhouses.update(&slaughterhouse).await?;
        Ok(slaughterhouse)
    }
}

/// Conflict while any live sale names the slaughterhouse.
#[derive(Debug, Clone, Copy)]
pub struct DeleteSlaughterhouse {
    pub id: SlaughterhouseId,
}

impl Request for DeleteSlaughterhouse {
    type Response = ();
    const NAME: &'static str = "DeleteSlaughterhouse";
    const ACCESS: Access = Access::Permission(catalog::SALES_MANAGE);
}

#[async_trait::async_trait]
impl Handler<DeleteSlaughterhouse> for Services {
    async fn handle(&self, ctx: &RequestContext, request: DeleteSlaughterhouse) -> Result<(), AppError> {
        let slaughterhouse = load(self.repos.slaughterhouses.as_ref(), request.id, "slaughterhouse").await?;
        if self.repos.sales.exists(&sales_to(request.id)).await? {
            return Err(AppError::conflict("slaughterhouse has recorded sales"));
        }
        remove(self.repos.slaughterhouses.as_ref(), slaughterhouse, ctx).await
    }
}

/// Record a sale. Without `cycle_id` it lands in the farm's active cycle.
#[derive(Debug, Clone)]
pub struct AddSale {
    pub farm_id: FarmId,
    pub henhouse_id: HenhouseId,
    pub cycle_id: Option<CycleId>,
    pub details: SaleDetails,
}

impl Request for AddSale {
    type Response = Sale;
    const NAME: &'static str = "AddSale";
    const ACCESS: Access = Access::Permission(catalog::SALES_MANAGE);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.details.validate()
    }
}

#[async_trait::async_trait]
impl Handler<AddSale> for Services {
    async fn handle(&self, ctx: &RequestContext, request: AddSale) -> Result<Sale, AppError> {
        let farm = self.load_farm(request.farm_id).await?;
        self.load_henhouse(request.farm_id, request.henhouse_id).await?;
        let cycle_id = self.resolve_cycle(&farm, request.cycle_id).await?;
        load(self.repos.slaughterhouses.as_ref(), request.details.slaughterhouse_id, "slaughterhouse").await?;

        let sale = Sale::create(
            request.farm_id,
            request.henhouse_id,
            cycle_id,
            request.details,
            ctx.actor(),
            ctx.now,
        )?;
        self.repos.sales.add(&sale).await?;
        info!(sale_id = %sale.id(), farm_id = %request.farm_id, total = sale.total(), "sale recorded");
        Ok(sale)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListSales {
    pub filter: SaleFilter,
    pub page: PageRequest<SaleOrderBy>,
}

impl Request for ListSales {
    type Response = Page<Sale>;
    const NAME: &'static str = "ListSales";
    const ACCESS: Access = Access::Permission(catalog::SALES_VIEW);

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = self.page.validate().err().unwrap_or_default();
        check_range(&mut errors, "date_from", self.filter.date_from, self.filter.date_to);
        errors.into_result()
    }
}

#[async_trait::async_trait]
impl Handler<ListSales> for Services {
    async fn handle(&self, _ctx: &RequestContext, request: ListSales) -> Result<Page<Sale>, AppError> {
        Ok(paged(self.repos.sales.as_ref(), sales(&request.filter), &request.page).await?)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetSale {
    pub id: SaleId,
}

impl Request for GetSale {
    type Response = Sale;
    const NAME: &'static str = "GetSale";
    const ACCESS: Access = Access::Permission(catalog::SALES_VIEW);
}

#[async_trait::async_trait]
impl Handler<GetSale> for Services {
    async fn handle(&self, _ctx: &RequestContext, request: GetSale) -> Result<Sale, AppError> {
        load(self.repos.sales.as_ref(), request.id, "sale").await
    }
}

#[derive(Debug, Clone)]
pub struct UpdateSale {
    pub id: SaleId,
    pub details: SaleDetails,
}

impl Request for UpdateSale {
    type Response = Sale;
    const NAME: &'static str = "UpdateSale";
    const ACCESS: Access = Access::Permission(catalog::SALES_MANAGE);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.details.validate()
    }
}

#[async_trait::async_trait]
impl Handler<UpdateSale> for Services {
    async fn handle(&self, ctx: &RequestContext, request: UpdateSale) -> Result<Sale, AppError> {
        let mut sale = load(self.repos.sales.as_ref(), request.id, "sale").await?;
        if sale.details().slaughterhouse_id != request.details.slaughterhouse_id {
            load(self.repos.slaughterhouses.as_ref(), request.details.slaughterhouse_id, "slaughterhouse").await?;
        }
        sale.update_details(request.details, ctx.actor(), ctx.now)?;
        self.repos.sales.update(&sale).await?;
        Ok(sale)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteSale {
    pub id: SaleId,
}

impl Request for DeleteSale {
    type Response = ();
    const NAME: &'static str = "DeleteSale";
    const ACCESS: Access = Access::Permission(catalog::SALES_MANAGE);
}

#[async_trait::async_trait]
impl Handler<DeleteSale> for Services {
    async fn handle(&self, ctx: &RequestContext, request: DeleteSale) -> Result<(), AppError> {
        let sale = load(self.repos.sales.as_ref(), request.id, "sale").await?;
        remove(self.repos.sales.as_ref(), sale, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use farmhub_sales::SaleKind;

    use crate::dispatch::Dispatcher;
    use crate::handlers::farms::DeleteHenhouse;
    use crate::handlers::farms::tests::seeded_farm;
    use crate::services::tests::services_with_user;

    const ALL: &[&str] = &["farms.manage", "farms.view", "sales.manage", "sales.view"];

    fn slaughterhouse_input(name: &str) -> SlaughterhouseInput {
        SlaughterhouseInput {
            name: name.into(),
            producer_number: "PL-14-001".into(),
            nip: "7680002466".into(),
            address: Some(" Sieradz ".into()),
        }
    }

    fn sale(slaughterhouse_id: SlaughterhouseId, kind: SaleKind, day: u32) -> SaleDetails {
        SaleDetails {
            slaughterhouse_id,
            kind,
            sale_date: NaiveDate::from_ymd_opt(2025, 2, day).unwrap(),
            quantity: 10_000,
            weight_kg: 25_000.0,
            confiscated_count: 40,
            dead_count: 12,
            price_per_kg: 5_20,
            comment: None,
        }
    }

    #[tokio::test]
    async fn slaughterhouse_crud_with_nip_checks() {
        let (services, ctx) = services_with_user(ALL).await;
        let dispatcher = Dispatcher::new(services);

        let created = dispatcher
            .send(&ctx, CreateSlaughterhouse { input: slaughterhouse_input("Drobex") })
            .await
            .unwrap();
        assert_eq!(created.details().address.as_deref(), Some("Sieradz"));

        let mut bad = slaughterhouse_input("Drobex");
        bad.nip = "123".into();
        let err = dispatcher
            .send(&ctx, UpdateSlaughterhouse { id: *created.id(), input: bad })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(e) if e.has_field("nip")));

        let page = dispatcher.send(&ctx, ListSlaughterhouses::default()).await.unwrap();
        assert_eq!(page.total_count, 1);

        dispatcher.send(&ctx, DeleteSlaughterhouse { id: *created.id() }).await.unwrap();
        let err = dispatcher.send(&ctx, GetSlaughterhouse { id: *created.id() }).await.unwrap_err();
        assert_eq!(err, AppError::NotFound("slaughterhouse".into()));
    }

    #[tokio::test]
    async fn sale_requires_known_slaughterhouse() {
        let (services, ctx) = services_with_user(ALL).await;
        let dispatcher = Dispatcher::new(services);
        let (farm, henhouse, _) = seeded_farm(&dispatcher, &ctx).await;

        let err = dispatcher
            .send(
                &ctx,
                AddSale {
                    farm_id: *farm.id(),
                    henhouse_id: *henhouse.id(),
                    cycle_id: None,
                    details: sale(SlaughterhouseId::new(), SaleKind::Partial, 1),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, AppError::NotFound("slaughterhouse".into()));
    }

    #[tokio::test]
    async fn sales_are_filtered_and_block_deletes() {
        let (services, ctx) = services_with_user(ALL).await;
        let dispatcher = Dispatcher::new(services);
        let (farm, henhouse, cycle) = seeded_farm(&dispatcher, &ctx).await;
        let buyer = dispatcher
            .send(&ctx, CreateSlaughterhouse { input: slaughterhouse_input("Drobex") })
            .await
            .unwrap();

        let add = |kind, day| AddSale {
            farm_id: *farm.id(),
            henhouse_id: *henhouse.id(),
            cycle_id: Some(*cycle.id()),
            details: sale(*buyer.id(), kind, day),
        };
        let partial = dispatcher.send(&ctx, add(SaleKind::Partial, 3)).await.unwrap();
        let total = dispatcher.send(&ctx, add(SaleKind::Total, 20)).await.unwrap();
        assert_eq!(total.total(), 130_000_00);

        let only_total = ListSales {
            filter: SaleFilter { kind: Some(SaleKind::Total), ..Default::default() },
            ..Default::default()
        };
        let page = dispatcher.send(&ctx, only_total).await.unwrap();
        assert_eq!(page.items.iter().map(|s| *s.id()).collect::<Vec<_>>(), vec![*total.id()]);

        let early = ListSales {
            filter: SaleFilter {
                date_to: NaiveDate::from_ymd_opt(2025, 2, 10),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(dispatcher.send(&ctx, early).await.unwrap().items[0].id(), partial.id());

        let err = dispatcher.send(&ctx, DeleteSlaughterhouse { id: *buyer.id() }).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        let err = dispatcher
            .send(&ctx, DeleteHenhouse { farm_id: *farm.id(), id: *henhouse.id() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        dispatcher.send(&ctx, DeleteSale { id: *partial.id() }).await.unwrap();
        dispatcher.send(&ctx, DeleteSale { id: *total.id() }).await.unwrap();
        dispatcher.send(&ctx, DeleteSlaughterhouse { id: *buyer.id() }).await.unwrap();
    }

    #[tokio::test]
    async fn update_rechecks_bird_counts() {
        let (services, ctx) = services_with_user(ALL).await;
        let dispatcher = Dispatcher::new(services);
        let (farm, henhouse, _) = seeded_farm(&dispatcher, &ctx).await;
        let buyer = dispatcher
            .send(&ctx, CreateSlaughterhouse { input: slaughterhouse_input("Drobex") })
            .await
            .unwrap();
        let recorded = dispatcher
            .send(
                &ctx,
                AddSale {
                    farm_id: *farm.id(),
                    henhouse_id: *henhouse.id(),
                    cycle_id: None,
                    details: sale(*buyer.id(), SaleKind::Partial, 5),
                },
            )
            .await
            .unwrap();

        let mut details = sale(*buyer.id(), SaleKind::Partial, 5);
        details.dead_count = 10_000;
        let err = dispatcher.send(&ctx, UpdateSale { id: *recorded.id(), details }).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(e) if e.has_field("confiscated_count")));

        let mut details = sale(*buyer.id(), SaleKind::Total, 6);
        details.weight_kg = 26_000.0;
        let updated = dispatcher.send(&ctx, UpdateSale { id: *recorded.id(), details }).await.unwrap();
        assert_eq!(updated.details().kind, SaleKind::Total);
        assert_eq!(updated.details().weight_kg, 26_000.0);
    }
}
