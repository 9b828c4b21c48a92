use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use farmhub_auth::{JwtClaims, User};
use farmhub_core::{CycleId, Entity, ExpenseContractorId, FarmId, HenhouseId, PageRequest, SlaughterhouseId, UserId};
use farmhub_employees::{EmployeeDetails, EmployeeOrderBy, EmployeeStatus};
use farmhub_expenses::specs::ExpenseFilter;
use farmhub_expenses::{ExpenseDetails, ExpenseKind, ExpenseOrderBy};
use farmhub_feeds::specs::FeedDeliveryFilter;
use farmhub_feeds::{FeedDeliveryDetails, FeedDeliveryOrderBy};
use farmhub_infra::handlers::auth::{LoginResult, UserWithPermissions};
use farmhub_sales::specs::SaleFilter;
use farmhub_sales::{SaleDetails, SaleKind, SaleOrderBy};

// -------------------------
// Response DTOs
// -------------------------

/// A user as the API shows it; the password hash never leaves the server.
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: UserId,
    pub login: String,
    pub name: String,
    pub is_admin: bool,
    pub has_password: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: *user.id(),
            login: user.login().to_string(),
            name: user.name().to_string(),
            is_admin: user.is_admin(),
            has_password: user.password_hash().is_some(),
            created_at: user.audit().created_at,
            modified_at: user.audit().modified_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserWithPermissionsDto {
    pub user: UserDto,
    pub permissions: Vec<String>,
}

impl From<UserWithPermissions> for UserWithPermissionsDto {
    fn from(value: UserWithPermissions) -> Self {
        Self { user: value.user.into(), permissions: value.permissions }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub claims: JwtClaims,
    pub user: UserDto,
}

impl From<LoginResult> for LoginResponse {
    fn from(value: LoginResult) -> Self {
        Self {
            token: value.token,
            expires_at: value.claims.expires_at(),
            claims: value.claims,
            user: value.user.into(),
        }
    }
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PermissionsRequest {
    pub permissions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCycleRequest {
    pub identifier: u32,
    pub year: i32,
    pub started_at: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveCycleRequest {
    pub cycle_id: CycleId,
}

#[derive(Debug, Deserialize)]
pub struct AddFeedDeliveryRequest {
    pub farm_id: FarmId,
    pub henhouse_id: HenhouseId,
    #[serde(default)]
    pub cycle_id: Option<CycleId>,
    #[serde(flatten)]
    pub details: FeedDeliveryDetails,
}

#[derive(Debug, Deserialize)]
pub struct MarkPaidRequest {
    pub paid_at: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct AddSaleRequest {
    pub farm_id: FarmId,
    pub henhouse_id: HenhouseId,
    #[serde(default)]
    pub cycle_id: Option<CycleId>,
    #[serde(flatten)]
    pub details: SaleDetails,
}

#[derive(Debug, Deserialize)]
pub struct AddExpenseRequest {
    pub farm_id: FarmId,
    #[serde(default)]
    pub cycle_id: Option<CycleId>,
    #[serde(flatten)]
    pub details: ExpenseDetails,
}

#[derive(Debug, Deserialize)]
pub struct AddEmployeeRequest {
    pub farm_id: FarmId,
    #[serde(flatten)]
    pub details: EmployeeDetails,
}

#[derive(Debug, Deserialize)]
pub struct TerminateRequest {
    pub contract_end: NaiveDate,
}

// -------------------------
// Query-string DTOs
// -------------------------
//
// Filters and paging share one flat query string (`?farm_id=..&page_size=20`),
// so each list spells its paging fields out instead of flattening them.

fn page_request<O>(
    page_number: Option<u32>,
    page_size: Option<u32>,
    order_by: Option<O>,
    is_descending: Option<bool>,
) -> PageRequest<O> {
    let defaults = PageRequest::<O>::default();
    PageRequest {
        page_number: page_number.unwrap_or(defaults.page_number),
        page_size: page_size.unwrap_or(defaults.page_size),
        order_by,
        is_descending: is_descending.unwrap_or(defaults.is_descending),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedDeliveryQuery {
    pub farm_id: Option<FarmId>,
    pub henhouse_id: Option<HenhouseId>,
    pub cycle_id: Option<CycleId>,
    pub invoice_date_from: Option<NaiveDate>,
    pub invoice_date_to: Option<NaiveDate>,
    #[serde(default)]
    pub unpaid_only: bool,
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
    pub order_by: Option<FeedDeliveryOrderBy>,
    pub is_descending: Option<bool>,
}

impl FeedDeliveryQuery {
    pub fn into_parts(self) -> (FeedDeliveryFilter, PageRequest<FeedDeliveryOrderBy>) {
        let filter = FeedDeliveryFilter {
            farm_id: self.farm_id,
            henhouse_id: self.henhouse_id,
            cycle_id: self.cycle_id,
            invoice_date_from: self.invoice_date_from,
            invoice_date_to: self.invoice_date_to,
            unpaid_only: self.unpaid_only,
        };
        (filter, page_request(self.page_number, self.page_size, self.order_by, self.is_descending))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SaleQuery {
    pub farm_id: Option<FarmId>,
    pub henhouse_id: Option<HenhouseId>,
    pub cycle_id: Option<CycleId>,
    pub slaughterhouse_id: Option<SlaughterhouseId>,
    pub kind: Option<SaleKind>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
    pub order_by: Option<SaleOrderBy>,
    pub is_descending: Option<bool>,
}

impl SaleQuery {
    pub fn into_parts(self) -> (SaleFilter, PageRequest<SaleOrderBy>) {
        let filter = SaleFilter {
            farm_id: self.farm_id,
            henhouse_id: self.henhouse_id,
            cycle_id: self.cycle_id,
            slaughterhouse_id: self.slaughterhouse_id,
            kind: self.kind,
            date_from: self.date_from,
            date_to: self.date_to,
        };
        (filter, page_request(self.page_number, self.page_size, self.order_by, self.is_descending))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpenseQuery {
    pub farm_id: Option<FarmId>,
    pub cycle_id: Option<CycleId>,
    pub contractor_id: Option<ExpenseContractorId>,
    pub kind: Option<ExpenseKind>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
    pub order_by: Option<ExpenseOrderBy>,
    pub is_descending: Option<bool>,
}

impl ExpenseQuery {
    pub fn into_parts(self) -> (ExpenseFilter, PageRequest<ExpenseOrderBy>) {
        let filter = ExpenseFilter {
            farm_id: self.farm_id,
            cycle_id: self.cycle_id,
            contractor_id: self.contractor_id,
            kind: self.kind,
            date_from: self.date_from,
            date_to: self.date_to,
        };
        (filter, page_request(self.page_number, self.page_size, self.order_by, self.is_descending))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EmployeeQuery {
    pub farm_id: Option<FarmId>,
    pub status: Option<EmployeeStatus>,
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
    pub order_by: Option<EmployeeOrderBy>,
    pub is_descending: Option<bool>,
}

impl EmployeeQuery {
    pub fn page(&self) -> PageRequest<EmployeeOrderBy> {
        page_request(self.page_number, self.page_size, self.order_by, self.is_descending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn user_dto_hides_password_hash() {
        let mut user = User::create("ola", "Ola", false, None, Utc::now()).unwrap();
        user.set_password("$argon2id$v=19$secret".to_string(), None, Utc::now()).unwrap();

        let json = serde_json::to_value(UserDto::from(user)).unwrap();
        assert_eq!(json["login"], "ola");
        assert_eq!(json["has_password"], true);
        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("argon2"));
    }

    #[test]
    fn unset_paging_fields_fall_back_to_defaults() {
        let (filter, page) = FeedDeliveryQuery { unpaid_only: true, page_size: Some(25), ..Default::default() }
            .into_parts();
        assert!(filter.unpaid_only);
        assert_eq!(page.page_number, 1);
        assert_eq!(page.page_size, 25);
        assert!(page.is_descending);
        assert_eq!(page.order_by, None);
    }

    #[test]
    fn flattened_delivery_body_parses() {
        let body: AddFeedDeliveryRequest = serde_json::from_value(serde_json::json!({
            "farm_id": FarmId::new(),
            "henhouse_id": HenhouseId::new(),
            "vendor_name": "Pasze",
            "item_name": "Starter",
            "quantity_tons": 10,
            "unit_price": 185000,
            "invoice_number": "FV/1",
            "invoice_date": "2025-02-01",
            "due_date": null,
            "comment": null
        }))
        .unwrap();
        assert_eq!(body.cycle_id, None);
        assert_eq!(body.details.quantity_tons, 10.0);
    }
}
