//! Farms, henhouses and production cycles.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use farmhub_auth::catalog;
use farmhub_core::{
    CycleId, Entity, FarmId, HenhouseId, Nip, Page, PageRequest, Validate, ValidationErrors,
};
use farmhub_farms::{
    Cycle, CycleOrderBy, Farm, FarmDetails, FarmOrderBy, Henhouse, HenhouseDetails, HenhouseOrderBy, specs,
    validate_cycle_number,
};
use farmhub_feeds::specs::deliveries_of_henhouse;
use farmhub_sales::specs::{SaleFilter, sales};

use crate::dispatch::{Access, Handler, Request, RequestContext};
use crate::error::AppError;
use crate::handlers::{load, remove};
use crate::repository::{Repository, paged};
use crate::services::Services;

/// Farm data as submitted; the NIP is still raw text.
#[derive(Debug, Clone, Deserialize)]
pub struct FarmInput {
    pub name: String,
    pub producer_number: String,
    pub nip: String,
    #[serde(default)]
    pub address: Option<String>,
}

impl Validate for FarmInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .require_non_blank("name", &self.name)
            .require_non_blank("producer_number", &self.producer_number)
            .require_nip("nip", &self.nip);
        errors.into_result()
    }
}

impl FarmInput {
    fn into_details(self) -> Result<FarmDetails, AppError> {
        Ok(FarmDetails {
            nip: Nip::parse(&self.nip)?,
            name: self.name,
            producer_number: self.producer_number,
            address: self.address,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CreateFarm {
    pub input: FarmInput,
}

impl Request for CreateFarm {
    type Response = Farm;
    const NAME: &'static str = "CreateFarm";
    const ACCESS: Access = Access::Permission(catalog::FARMS_MANAGE);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.input.validate()
    }
}

#[async_trait::async_trait]
impl Handler<CreateFarm> for Services {
    async fn handle(&self, ctx: &RequestContext, request: CreateFarm) -> Result<Farm, AppError> {
        let farm = Farm::create(request.input.into_details()?, ctx.actor(), ctx.now)?;
        self.repos.farms.add(&farm).await?;
        info!(farm_id = %farm.id(), name = %farm.details().name, "farm created");
        Ok(farm)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListFarms {
    pub page: PageRequest<FarmOrderBy>,
}

impl Request for ListFarms {
    type Response = Page<Farm>;
    const NAME: &'static str = "ListFarms";
    const ACCESS: Access = Access::Permission(catalog::FARMS_VIEW);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.page.validate()
    }
}

#[async_trait::async_trait]
impl Handler<ListFarms> for Services {
    async fn handle(&self, _ctx: &RequestContext, request: ListFarms) -> Result<Page<Farm>, AppError> {
        Ok(paged(self.repos.farms.as_ref(), specs::farms(), &request.page).await?)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetFarm {
    pub id: FarmId,
}

impl Request for GetFarm {
    type Response = Farm;
    const NAME: &'static str = "GetFarm";
    const ACCESS: Access = Access::Permission(catalog::FARMS_VIEW);
}

#[async_trait::async_trait]
impl Handler<GetFarm> for Services {
    async fn handle(&self, _ctx: &RequestContext, request: GetFarm) -> Result<Farm, AppError> {
        self.load_farm(request.id).await
    }
}

#[derive(Debug, Clone)]
pub struct UpdateFarm {
    pub id: FarmId,
    pub input: FarmInput,
}

impl Request for UpdateFarm {
    type Response = Farm;
    const NAME: &'static str = "UpdateFarm";
    const ACCESS: Access = Access::Permission(catalog::FARMS_MANAGE);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.input.validate()
    }
}

#[async_trait::async_trait]
impl Handler<UpdateFarm> for Services {
    async fn handle(&self, ctx: &RequestContext, request: UpdateFarm) -> Result<Farm, AppError> {
        let mut farm = self.load_farm(request.id).await?;
        farm.update_details(request.input.into_details()?, ctx.actor(), ctx.now)?;
        self.repos.farms.update(&farm).await?;
        Ok(farm)
    }
}

/// Conflict while the farm still has henhouses.
#[derive(Debug, Clone, Copy)]
pub struct DeleteFarm {
    pub id: FarmId,
}

impl Request for DeleteFarm {
    type Response = ();
    const NAME: &'static str = "DeleteFarm";
    const ACCESS: Access = Access::Permission(catalog::FARMS_MANAGE);
}

#[async_trait::async_trait]
impl Handler<DeleteFarm> for Services {
    async fn handle(&self, ctx: &RequestContext, request: DeleteFarm) -> Result<(), AppError> {
        let farm = self.load_farm(request.id).await?;
        if self.repos.henhouses.exists(&specs::henhouses_of_farm(request.id)).await? {
            return Err(AppError::conflict("farm still has henhouses"));
        }
        remove(self.repos.farms.as_ref(), farm, ctx).await?;
        info!(farm_id = %request.id, "farm deleted");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AddHenhouse {
    pub farm_id: FarmId,
    pub details: HenhouseDetails,
}

impl Request for AddHenhouse {
    type Response = Henhouse;
    const NAME: &'static str = "AddHenhouse";
    const ACCESS: Access = Access::Permission(catalog::FARMS_MANAGE);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.details.validate()
    }
}

impl Services {
    /// Henhouse codes are unique among the live henhouses of one farm.
    async fn ensure_code_free(&self, farm_id: FarmId, code: &str, except: Option<HenhouseId>) -> Result<(), AppError> {
        let taken = self.repos.henhouses.list(&specs::henhouse_code_taken(farm_id, code)).await?;
        if taken.iter().any(|h| Some(*h.id()) != except) {
            return Err(AppError::conflict(format!("henhouse code '{}' is already used on this farm", code.trim())));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Handler<AddHenhouse> for Services {
    async fn handle(&self, ctx: &RequestContext, request: AddHenhouse) -> Result<Henhouse, AppError> {
        let farm = self.load_farm(request.farm_id).await?;
        self.ensure_code_free(*farm.id(), &request.details.code, None).await?;
        let henhouse = Henhouse::create(*farm.id(), request.details, ctx.actor(), ctx.now)?;
        self.repos.henhouses.add(&henhouse).await?;
        Ok(henhouse)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ListHenhouses {
    pub farm_id: FarmId,
    pub page: PageRequest<HenhouseOrderBy>,
}

impl Request for ListHenhouses {
    type Response = Page<Henhouse>;
    const NAME: &'static str = "ListHenhouses";
    const ACCESS: Access = Access::Permission(catalog::FARMS_VIEW);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.page.validate()
    }
}

#[async_trait::async_trait]
impl Handler<ListHenhouses> for Services {
    async fn handle(&self, _ctx: &RequestContext, request: ListHenhouses) -> Result<Page<Henhouse>, AppError> {
        self.load_farm(request.farm_id).await?;
        let spec = specs::henhouses_of_farm(request.farm_id);
        Ok(paged(self.repos.henhouses.as_ref(), spec, &request.page).await?)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateHenhouse {
    pub farm_id: FarmId,
    pub id: HenhouseId,
    pub details: HenhouseDetails,
}

impl Request for UpdateHenhouse {
    type Response = Henhouse;
    const NAME: &'static str = "UpdateHenhouse";
    const ACCESS: Access = Access::Permission(catalog::FARMS_MANAGE);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.details.validate()
    }
}

#[async_trait::async_trait]
impl Handler<UpdateHenhouse> for Services {
    async fn handle(&self, ctx: &RequestContext, request: UpdateHenhouse) -> Result<Henhouse, AppError> {
        let mut henhouse = self.load_henhouse(request.farm_id, request.id).await?;
        self.ensure_code_free(request.farm_id, &request.details.code, Some(request.id)).await?;
        henhouse.update_details(request.details, ctx.actor(), ctx.now)?;
        self.repos.henhouses.update(&henhouse).await?;
        Ok(henhouse)
    }
}

/// Conflict while feed deliveries or sales still reference the henhouse.
#[derive(Debug, Clone, Copy)]
pub struct DeleteHenhouse {
    pub farm_id: FarmId,
    pub id: HenhouseId,
}

impl Request for DeleteHenhouse {
    type Response = ();
    const NAME: &'static str = "DeleteHenhouse";
    const ACCESS: Access = Access::Permission(catalog::FARMS_MANAGE);
}

#[async_trait::async_trait]
impl Handler<DeleteHenhouse> for Services {
    async fn handle(&self, ctx: &RequestContext, request: DeleteHenhouse) -> Result<(), AppError> {
        let henhouse = self.load_henhouse(request.farm_id, request.id).await?;
        let in_use = self.repos.feed_deliveries.exists(&deliveries_of_henhouse(request.id)).await?
            || self
                .repos
                .sales
                .exists(&sales(&SaleFilter { henhouse_id: Some(request.id), ..Default::default() }))
                .await?;
        if in_use {
            return Err(AppError::conflict("henhouse has feed deliveries or sales"));
        }
        remove(self.repos.henhouses.as_ref(), henhouse, ctx).await
    }
}

/// Open cycle `identifier/year` on a farm; it becomes the active cycle.
#[derive(Debug, Clone, Copy)]
pub struct CreateCycle {
    pub farm_id: FarmId,
    pub identifier: u32,
    pub year: i32,
    pub started_at: NaiveDate,
}

impl Request for CreateCycle {
    type Response = Cycle;
    const NAME: &'static str = "CreateCycle";
    const ACCESS: Access = Access::Permission(catalog::FARMS_MANAGE);

    fn validate(&self) -> Result<(), ValidationErrors> {
        validate_cycle_number(self.identifier, self.year)
    }
}

#[async_trait::async_trait]
impl Handler<CreateCycle> for Services {
    async fn handle(&self, ctx: &RequestContext, request: CreateCycle) -> Result<Cycle, AppError> {
        let mut farm = self.load_farm(request.farm_id).await?;
        let number = specs::cycle_number(request.farm_id, request.identifier, request.year);
        if self.repos.cycles.exists(&number).await? {
            return Err(AppError::conflict(format!(
                "cycle {}/{} already exists on this farm",
                request.identifier, request.year
            )));
        }

        let cycle = Cycle::create(
            request.farm_id,
            request.identifier,
            request.year,
            request.started_at,
            ctx.actor(),
            ctx.now,
        )?;
        self.repos.cycles.add(&cycle).await?;

        farm.set_active_cycle(*cycle.id(), ctx.actor(), ctx.now);
        self.repos.farms.update(&farm).await?;
        info!(farm_id = %request.farm_id, cycle = %cycle, "cycle created");
        Ok(cycle)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ListCycles {
    pub farm_id: FarmId,
    pub page: PageRequest<CycleOrderBy>,
}

impl Request for ListCycles {
    type Response = Page<Cycle>;
    const NAME: &'static str = "ListCycles";
    const ACCESS: Access = Access::Permission(catalog::FARMS_VIEW);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.page.validate()
    }
}

#[async_trait::async_trait]
impl Handler<ListCycles> for Services {
    async fn handle(&self, _ctx: &RequestContext, request: ListCycles) -> Result<Page<Cycle>, AppError> {
        self.load_farm(request.farm_id).await?;
        let spec = specs::cycles_of_farm(request.farm_id);
        Ok(paged(self.repos.cycles.as_ref(), spec, &request.page).await?)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SetActiveCycle {
    pub farm_id: FarmId,
    pub cycle_id: CycleId,
}

impl Request for SetActiveCycle {
    type Response = Farm;
    const NAME: &'static str = "SetActiveCycle";
    const ACCESS: Access = Access::Permission(catalog::FARMS_MANAGE);
}

#[async_trait::async_trait]
impl Handler<SetActiveCycle> for Services {
    async fn handle(&self, ctx: &RequestContext, request: SetActiveCycle) -> Result<Farm, AppError> {
        let mut farm = self.load_farm(request.farm_id).await?;
        let cycle = load(self.repos.cycles.as_ref(), request.cycle_id, "cycle").await?;
        if cycle.farm_id() != request.farm_id {
            return Err(AppError::not_found("cycle"));
        }
        farm.set_active_cycle(request.cycle_id, ctx.actor(), ctx.now);
        self.repos.farms.update(&farm).await?;
        Ok(farm)
    }
}
