//! Expense contractors and the expenses booked against cycles.

use serde::Deserialize;
use tracing::info;

use farmhub_auth::catalog;
use farmhub_core::{
    CycleId, Entity, ExpenseContractorId, ExpenseId, FarmId, Nip, Page, PageRequest, Specification, Validate,
    ValidationErrors,
};
use farmhub_expenses::specs::{ExpenseFilter, expenses, expenses_of_contractor};
use farmhub_expenses::{ContractorDetails, ContractorOrderBy, Expense, ExpenseContractor, ExpenseDetails, ExpenseOrderBy};

use crate::dispatch::{Access, Handler, Request, RequestContext};
use crate::error::AppError;
use crate::handlers::{check_range, load, remove};
use crate::repository::{Repository, paged};
use crate::services::Services;

#[derive(Debug, Clone, Deserialize)]
pub struct ContractorInput {
    pub name: String,
    pub nip: String,
    #[serde(default)]
    pub address: Option<String>,
}

impl Validate for ContractorInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_non_blank("name", &self.name).require_nip("nip", &self.nip);
        errors.into_result()
    }
}

impl ContractorInput {
    fn into_details(self) -> Result<ContractorDetails, AppError> {
        Ok(ContractorDetails { nip: Nip::parse(&self.nip)?, name: self.name, address: self.address })
    }
}

#[derive(Debug, Clone)]
pub struct CreateContractor {
    pub input: ContractorInput,
}

impl Request for CreateContractor {
    type Response = ExpenseContractor;
    const NAME: &'static str = "CreateContractor";
    const ACCESS: Access = Access::Permission(catalog::EXPENSES_MANAGE);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.input.validate()
    }
}

#[async_trait::async_trait]
impl Handler<CreateContractor> for Services {
    async fn handle(&self, ctx: &RequestContext, request: CreateContractor) -> Result<ExpenseContractor, AppError> {
        let contractor = ExpenseContractor::create(request.input.into_details()?, ctx.actor(), ctx.now)?;
        self.repos.contractors.add(&contractor).await?;
        Ok(contractor)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListContractors {
    pub page: PageRequest<ContractorOrderBy>,
}

impl Request for ListContractors {
    type Response = Page<ExpenseContractor>;
    const NAME: &'static str = "ListContractors";
    const ACCESS: Access = Access::Permission(catalog::EXPENSES_VIEW);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.page.validate()
    }
}

#[async_trait::async_trait]
impl Handler<ListContractors> for Services {
    async fn handle(
        &self,
        _ctx: &RequestContext,
        request: ListContractors,
    ) -> Result<Page<ExpenseContractor>, AppError> {
        Ok(paged(self.repos.contractors.as_ref(), Specification::new(), &request.page).await?)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetContractor {
    pub id: ExpenseContractorId,
}

impl Request for GetContractor {
    type Response = ExpenseContractor;
    const NAME: &'static str = "GetContractor";
    const ACCESS: Access = Access::Permission(catalog::EXPENSES_VIEW);
}

#[async_trait::async_trait]
impl Handler<GetContractor> for Services {
    async fn handle(&self, _ctx: &RequestContext, request: GetContractor) -> Result<ExpenseContractor, AppError> {
        load(self.repos.contractors.as_ref(), request.id, "contractor").await
    }
}

#[derive(Debug, Clone)]
pub struct UpdateContractor {
    pub id: ExpenseContractorId,
    pub input: ContractorInput,
}

impl Request for UpdateContractor {
    type Response = ExpenseContractor;
    const NAME: &'static str = "UpdateContractor";
    const ACCESS: Access = Access::Permission(catalog::EXPENSES_MANAGE);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.input.validate()
    }
}

#[async_trait::async_trait]
impl Handler<UpdateContractor> for Services {
    async fn handle(&self, ctx: &RequestContext, request: UpdateContractor) -> Result<ExpenseContractor, AppError> {
        let mut contractor = load(self.repos.contractors.as_ref(), request.id, "contractor").await?;
        contractor.update_details(request.input.into_details()?, ctx.actor(), ctx.now)?;
        self.repos.contractors.update(&contractor).await?;
        Ok(contractor)
    }
}

/// Conflict while live expenses reference the contractor.
#[derive(Debug, Clone, Copy)]
pub struct DeleteContractor {
    pub id: ExpenseContractorId,
}

impl Request for DeleteContractor {
    type Response = ();
    const NAME: &'static str = "DeleteContractor";
    const ACCESS: Access = Access::Permission(catalog::EXPENSES_MANAGE);
}

#[async_trait::async_trait]
impl Handler<DeleteContractor> for Services {
    async fn handle(&self, ctx: &RequestContext, request: DeleteContractor) -> Result<(), AppError> {
        let contractor = load(self.repos.contractors.as_ref(), request.id, "contractor").await?;
        if self.repos.expenses.exists(&expenses_of_contractor(request.id)).await? {
            return Err(AppError::conflict("contractor has recorded expenses"));
        }
        remove(self.repos.contractors.as_ref(), contractor, ctx).await
    }
}

/// Book an expense. Without `cycle_id` it lands in the farm's active cycle.
#[derive(Debug, Clone)]
pub struct AddExpense {
    pub farm_id: FarmId,
    pub cycle_id: Option<CycleId>,
    pub details: ExpenseDetails,
}

impl Request for AddExpense {
    type Response = Expense;
    const NAME: &'static str = "AddExpense";
    const ACCESS: Access = Access::Permission(catalog::EXPENSES_MANAGE);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.details.validate()
    }
}

#[async_trait::async_trait]
impl Handler<AddExpense> for Services {
    async fn handle(&self, ctx: &RequestContext, request: AddExpense) -> Result<Expense, AppError> {
        let farm = self.load_farm(request.farm_id).await?;
        let cycle_id = self.resolve_cycle(&farm, request.cycle_id).await?;
        load(self.repos.contractors.as_ref(), request.details.contractor_id, "contractor").await?;

        let expense = Expense::create(request.farm_id, cycle_id, request.details, ctx.actor(), ctx.now)?;
        self.repos.expenses.add(&expense).await?;
        info!(expense_id = %expense.id(), farm_id = %request.farm_id, amount = expense.details().amount, "expense recorded");
        Ok(expense)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListExpenses {
    pub filter: ExpenseFilter,
    pub page: PageRequest<ExpenseOrderBy>,
}

impl Request for ListExpenses {
    type Response = Page<Expense>;
    const NAME: &'static str = "ListExpenses";
    const ACCESS: Access = Access::Permission(catalog::EXPENSES_VIEW);

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = self.page.validate().err().unwrap_or_default();
        check_range(&mut errors, "date_from", self.filter.date_from, self.filter.date_to);
        errors.into_result()
    }
}

#[async_trait::async_trait]
impl Handler<ListExpenses> for Services {
    async fn handle(&self, _ctx: &RequestContext, request: ListExpenses) -> Result<Page<Expense>, AppError> {
        Ok(paged(self.repos.expenses.as_ref(), expenses(&request.filter), &request.page).await?)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetExpense {
    pub id: ExpenseId,
}

impl Request for GetExpense {
    type Response = Expense;
    const NAME: &'static str = "GetExpense";
    const ACCESS: Access = Access::Permission(catalog::EXPENSES_VIEW);
}

#[async_trait::async_trait]
impl Handler<GetExpense> for Services {
    async fn handle(&self, _ctx: &RequestContext, request: GetExpense) -> Result<Expense, AppError> {
        load(self.repos.expenses.as_ref(), request.id, "expense").await
    }
}

#[derive(Debug, Clone)]
pub struct UpdateExpense {
    pub id: ExpenseId,
    pub details: ExpenseDetails,
}

impl Request for UpdateExpense {
    type Response = Expense;
    const NAME: &'static str = "UpdateExpense";
    const ACCESS: Access = Access::Permission(catalog::EXPENSES_MANAGE);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.details.validate()
    }
}

#[async_trait::async_trait]
impl Handler<UpdateExpense> for Services {
    async fn handle(&self, ctx: &RequestContext, request: UpdateExpense) -> Result<Expense, AppError> {
        let mut expense = load(self.repos.expenses.as_ref(), request.id, "expense").await?;
        if expense.details().contractor_id != request.details.contractor_id {
            load(self.repos.contractors.as_ref(), request.details.contractor_id, "contractor").await?;
        }
        expense.update_details(request.details, ctx.actor(), ctx.now)?;
        self.repos.expenses.update(&expense).await?;
        Ok(expense)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteExpense {
    pub id: ExpenseId,
}

impl Request for DeleteExpense {
    type Response = ();
    const NAME: &'static str = "DeleteExpense";
    const ACCESS: Access = Access::Permission(catalog::EXPENSES_MANAGE);
}

#[async_trait::async_trait]
impl Handler<DeleteExpense> for Services {
    async fn handle(&self, ctx: &RequestContext, request: DeleteExpense) -> Result<(), AppError> {
        let expense = load(self.repos.expenses.as_ref(), request.id, "expense").await?;
        remove(self.repos.expenses.as_ref(), expense, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use farmhub_expenses::ExpenseKind;

    use crate::dispatch::Dispatcher;
    use crate::handlers::farms::tests::seeded_farm;
    use crate::handlers::farms::CreateCycle;
    use crate::services::tests::services_with_user;

    const ALL: &[&str] = &["farms.manage", "farms.view", "expenses.manage", "expenses.view"];

    fn contractor(name: &str) -> ContractorInput {
        ContractorInput { name: name.into(), nip: "526 025 02 74".into(), address: None }
    }

    fn expense(contractor_id: ExpenseContractorId, kind: ExpenseKind, amount: i64) -> ExpenseDetails {
        ExpenseDetails {
            contractor_id,
            kind,
            amount,
            invoice_number: " FV/2025/7 ".into(),
            invoice_date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            comment: None,
        }
    }

    #[tokio::test]
    async fn contractor_nip_is_normalized() {
        let (services, ctx) = services_with_user(ALL).await;
        let created = Dispatcher::new(services)
            .send(&ctx, CreateContractor { input: contractor("Wet-Vet") })
            .await
            .unwrap();
        assert_eq!(created.details().nip.as_str(), "5260250274");
    }

    #[tokio::test]
    async fn expense_lands_in_active_cycle_and_filters_by_kind() {
        let (services, ctx) = services_with_user(ALL).await;
        let dispatcher = Dispatcher::new(services);
        let (farm, _, first) = seeded_farm(&dispatcher, &ctx).await;
        let vet = dispatcher.send(&ctx, CreateContractor { input: contractor("Wet-Vet") }).await.unwrap();

        let booked = dispatcher
            .send(
                &ctx,
                AddExpense {
                    farm_id: *farm.id(),
                    cycle_id: None,
                    details: expense(*vet.id(), ExpenseKind::Veterinary, 1_200_00),
                },
            )
            .await
            .unwrap();
        assert_eq!(booked.cycle_id(), *first.id());
        assert_eq!(booked.details().invoice_number, "FV/2025/7");

        let second = dispatcher
            .send(
                &ctx,
                CreateCycle {
                    farm_id: *farm.id(),
                    identifier: 2,
                    year: 2025,
                    started_at: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                },
            )
            .await
            .unwrap();
        dispatcher
            .send(
                &ctx,
                AddExpense {
                    farm_id: *farm.id(),
                    cycle_id: Some(*second.id()),
                    details: expense(*vet.id(), ExpenseKind::Gas, 300_00),
                },
            )
            .await
            .unwrap();

        let vets = ListExpenses {
            filter: ExpenseFilter { kind: Some(ExpenseKind::Veterinary), ..Default::default() },
            ..Default::default()
        };
        let page = dispatcher.send(&ctx, vets).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].id(), booked.id());

        let by_amount = ListExpenses {
            filter: ExpenseFilter { farm_id: Some(*farm.id()), ..Default::default() },
            page: PageRequest::default().ordered(ExpenseOrderBy::Amount, false),
        };
        let amounts: Vec<i64> = dispatcher
            .send(&ctx, by_amount)
            .await
            .unwrap()
            .items
            .iter()
            .map(|e| e.details().amount)
            .collect();
        assert_eq!(amounts, vec![300_00, 1_200_00]);
    }

    #[tokio::test]
    async fn explicit_cycle_of_other_farm_is_not_found() {
        let (services, ctx) = services_with_user(ALL).await;
        let dispatcher = Dispatcher::new(services);
        let (farm, _, _) = seeded_farm(&dispatcher, &ctx).await;
        let (_, _, foreign) = seeded_farm(&dispatcher, &ctx).await;
        let vet = dispatcher.send(&ctx, CreateContractor { input: contractor("Wet-Vet") }).await.unwrap();

        let err = dispatcher
            .send(
                &ctx,
                AddExpense {
                    farm_id: *farm.id(),
                    cycle_id: Some(*foreign.id()),
                    details: expense(*vet.id(), ExpenseKind::Other, 10_00),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, AppError::NotFound("cycle".into()));
    }

    #[tokio::test]
    async fn non_positive_amount_is_rejected_before_lookup() {
        let (services, ctx) = services_with_user(ALL).await;
        let err = Dispatcher::new(services)
            .send(
                &ctx,
                AddExpense {
                    farm_id: FarmId::new(),
                    cycle_id: None,
                    details: expense(ExpenseContractorId::new(), ExpenseKind::Other, 0),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(e) if e.has_field("amount")));
    }

    #[tokio::test]
    async fn referenced_contractor_cannot_be_deleted() {
        let (services, ctx) = services_with_user(ALL).await;
        let dispatcher = Dispatcher::new(services);
        let (farm, _, _) = seeded_farm(&dispatcher, &ctx).await;
        let vet = dispatcher.send(&ctx, CreateContractor { input: contractor("Wet-Vet") }).await.unwrap();
        let booked = dispatcher
            .send(
                &ctx,
                AddExpense {
                    farm_id: *farm.id(),
                    cycle_id: None,
                    details: expense(*vet.id(), ExpenseKind::Veterinary, 50_00),
                },
            )
            .await
            .unwrap();

        let err = dispatcher.send(&ctx, DeleteContractor { id: *vet.id() }).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        dispatcher.send(&ctx, DeleteExpense { id: *booked.id() }).await.unwrap();
        dispatcher.send(&ctx, DeleteContractor { id: *vet.id() }).await.unwrap();
        assert_eq!(dispatcher.send(&ctx, ListContractors::default()).await.unwrap().total_count, 0);
    }
}
