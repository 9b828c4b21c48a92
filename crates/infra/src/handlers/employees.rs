//! Employee records.

use chrono::NaiveDate;
use tracing::info;

use farmhub_auth::catalog;
use farmhub_core::{EmployeeId, Entity, FarmId, Page, PageRequest, Validate, ValidationErrors};
use farmhub_employees::specs::employees;
use farmhub_employees::{Employee, EmployeeDetails, EmployeeOrderBy, EmployeeStatus};

use crate::dispatch::{Access, Handler, Request, RequestContext};
use crate::error::AppError;
use crate::handlers::{load, remove};
use crate::repository::{Repository, paged};
use crate::services::Services;

#[derive(Debug, Clone)]
pub struct AddEmployee {
    pub farm_id: FarmId,
    pub details: EmployeeDetails,
}

impl Request for AddEmployee {
    type Response = Employee;
    const NAME: &'static str = "AddEmployee";
    const ACCESS: Access = Access::Permission(catalog::EMPLOYEES_MANAGE);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.details.validate()
    }
}

#[async_trait::async_trait]
impl Handler<AddEmployee> for Services {
    async fn handle(&self, ctx: &RequestContext, request: AddEmployee) -> Result<Employee, AppError> {
        self.load_farm(request.farm_id).await?;
        let employee = Employee::hire(request.farm_id, request.details, ctx.actor(), ctx.now)?;
        self.repos.employees.add(&employee).await?;
        info!(employee_id = %employee.id(), farm_id = %request.farm_id, "employee added");
        Ok(employee)
    }
}

/// Both filters are optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListEmployees {
    pub farm_id: Option<FarmId>,
    pub status: Option<EmployeeStatus>,
    pub page: PageRequest<EmployeeOrderBy>,
}

impl Request for ListEmployees {
    type Response = Page<Employee>;
    const NAME: &'static str = "ListEmployees";
    const ACCESS: Access = Access::Permission(catalog::EMPLOYEES_VIEW);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.page.validate()
    }
}

#[async_trait::async_trait]
impl Handler<ListEmployees> for Services {
    async fn handle(&self, _ctx: &RequestContext, request: ListEmployees) -> Result<Page<Employee>, AppError> {
        let spec = employees(request.farm_id, request.status);
        Ok(paged(self.repos.employees.as_ref(), spec, &request.page).await?)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetEmployee {
    pub id: EmployeeId,
}

impl Request for GetEmployee {
    type Response = Employee;
    const NAME: &'static str = "GetEmployee";
    const ACCESS: Access = Access::Permission(catalog::EMPLOYEES_VIEW);
}

#[async_trait::async_trait]
impl Handler<GetEmployee> for Services {
    async fn handle(&self, _ctx: &RequestContext, request: GetEmployee) -> Result<Employee, AppError> {
        load(self.repos.employees.as_ref(), request.id, "employee").await
    }
}

#[derive(Debug, Clone)]
pub struct UpdateEmployee {
    pub id: EmployeeId,
    pub details: EmployeeDetails,
}

impl Request for UpdateEmployee {
    type Response = Employee;
    const NAME: &'static str = "UpdateEmployee";
    const ACCESS: Access = Access::Permission(catalog::EMPLOYEES_MANAGE);

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.details.validate()
    }
}

#[async_trait::async_trait]
impl Handler<UpdateEmployee> for Services {
    async fn handle(&self, ctx: &RequestContext, request: UpdateEmployee) -> Result<Employee, AppError> {
        let mut employee = load(self.repos.employees.as_ref(), request.id, "employee").await?;
        employee.update_details(request.details, ctx.actor(), ctx.now)?;
        self.repos.employees.update(&employee).await?;
        Ok(employee)
    }
}

/// End the contract; the employee turns inactive.
#[derive(Debug, Clone, Copy)]
pub struct TerminateEmployee {
    pub id: EmployeeId,
    pub contract_end: NaiveDate,
}

impl Request for TerminateEmployee {
    type Response = Employee;
    const NAME: &'static str = "TerminateEmployee";
    const ACCESS: Access = Access::Permission(catalog::EMPLOYEES_MANAGE);
}

#[async_trait::async_trait]
impl Handler<TerminateEmployee> for Services {
    async fn handle(&self, ctx: &RequestContext, request: TerminateEmployee) -> Result<Employee, AppError> {
        let mut employee = load(self.repos.employees.as_ref(), request.id, "employee").await?;
        employee.terminate(request.contract_end, ctx.actor(), ctx.now)?;
        self.repos.employees.update(&employee).await?;
        info!(employee_id = %request.id, contract_end = %request.contract_end, "employee terminated");
        Ok(employee)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteEmployee {
    pub id: EmployeeId,
}

impl Request for DeleteEmployee {
    type Response = ();
    const NAME: &'static str = "DeleteEmployee";
    const ACCESS: Access = Access::Permission(catalog::EMPLOYEES_MANAGE);
}

#[async_trait::async_trait]
impl Handler<DeleteEmployee> for Services {
    async fn handle(&self, ctx: &RequestContext, request: DeleteEmployee) -> Result<(), AppError> {
        let employee = load(self.repos.employees.as_ref(), request.id, "employee").await?;
        remove(self.repos.employees.as_ref(), employee, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Dispatcher;
    use crate::handlers::farms::CreateFarm;
    use crate::handlers::farms::tests::farm_input;
    use crate::services::tests::services_with_user;

    const ALL: &[&str] = &["farms.manage", "employees.manage", "employees.view"];

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn details(name: &str, salary: i64) -> EmployeeDetails {
        EmployeeDetails {
            full_name: name.into(),
            position: "Hodowca".into(),
            salary,
            contract_start: date(2024, 1, 1),
            contract_end: None,
            comment: None,
        }
    }

    #[tokio::test]
    async fn hire_then_terminate() {
        let (services, ctx) = services_with_user(ALL).await;
        let dispatcher = Dispatcher::new(services);
        let farm = dispatcher.send(&ctx, CreateFarm { input: farm_input("Ferma") }).await.unwrap();

        let jan = dispatcher
            .send(&ctx, AddEmployee { farm_id: *farm.id(), details: details(" Jan Kowalski ", 6_500_00) })
            .await
            .unwrap();
        assert_eq!(jan.details().full_name, "Jan Kowalski");
        assert_eq!(jan.status(), EmployeeStatus::Active);

        let err = dispatcher
            .send(&ctx, TerminateEmployee { id: *jan.id(), contract_end: date(2023, 12, 31) })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(e) if e.has_field("contract_end")));

        let ended = dispatcher
            .send(&ctx, TerminateEmployee { id: *jan.id(), contract_end: date(2025, 6, 30) })
            .await
            .unwrap();
        assert_eq!(ended.status(), EmployeeStatus::Inactive);
        assert_eq!(ended.details().contract_end, Some(date(2025, 6, 30)));

        let again = TerminateEmployee { id: *jan.id(), contract_end: date(2025, 7, 31) };
        assert!(matches!(dispatcher.send(&ctx, again).await.unwrap_err(), AppError::Domain(_)));
    }

    #[tokio::test]
    async fn list_filters_by_farm_and_status() {
        let (services, ctx) = services_with_user(ALL).await;
        let dispatcher = Dispatcher::new(services);
        let north = dispatcher.send(&ctx, CreateFarm { input: farm_input("Północ") }).await.unwrap();
        let south = dispatcher.send(&ctx, CreateFarm { input: farm_input("Południe") }).await.unwrap();

        let anna = dispatcher
            .send(&ctx, AddEmployee { farm_id: *north.id(), details: details("Anna", 7_000_00) })
            .await
            .unwrap();
        dispatcher
            .send(&ctx, AddEmployee { farm_id: *north.id(), details: details("Piotr", 5_000_00) })
            .await
            .unwrap();
        dispatcher
            .send(&ctx, AddEmployee { farm_id: *south.id(), details: details("Ewa", 6_000_00) })
            .await
            .unwrap();
        dispatcher
            .send(&ctx, TerminateEmployee { id: *anna.id(), contract_end: date(2025, 1, 31) })
            .await
            .unwrap();

        let active_north = ListEmployees {
            farm_id: Some(*north.id()),
            status: Some(EmployeeStatus::Active),
            ..Default::default()
        };
        let page = dispatcher.send(&ctx, active_north).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].details().full_name, "Piotr");

        let by_salary = ListEmployees {
            page: PageRequest::default().ordered(EmployeeOrderBy::Salary, true),
            ..Default::default()
        };
        let names: Vec<String> = dispatcher
            .send(&ctx, by_salary)
            .await
            .unwrap()
            .items
            .into_iter()
            .map(|e| e.details().full_name.clone())
            .collect();
        assert_eq!(names, vec!["Anna", "Ewa", "Piotr"]);
    }

    #[tokio::test]
    async fn employee_needs_existing_farm() {
        let (services, ctx) = services_with_user(ALL).await;
        let err = Dispatcher::new(services)
            .send(&ctx, AddEmployee { farm_id: FarmId::new(), details: details("Jan", 1) })
            .await
            .unwrap_err();
        assert_eq!(err, AppError::NotFound("farm".into()));
    }

    #[tokio::test]
    async fn deleted_employee_is_gone() {
        let (services, ctx) = services_with_user(ALL).await;
        let dispatcher = Dispatcher::new(services);
        let farm = dispatcher.send(&ctx, CreateFarm { input: farm_input("Ferma") }).await.unwrap();
        let jan = dispatcher
            .send(&ctx, AddEmployee { farm_id: *farm.id(), details: details("Jan", 1) })
            .await
            .unwrap();

        dispatcher.send(&ctx, DeleteEmployee { id: *jan.id() }).await.unwrap();
        assert_eq!(
            dispatcher.send(&ctx, GetEmployee { id: *jan.id() }).await.unwrap_err(),
            AppError::NotFound("employee".into())
        );
        assert_eq!(dispatcher.send(&ctx, ListEmployees::default()).await.unwrap().total_count, 0);
    }
}
