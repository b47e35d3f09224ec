use actix_web::{web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use crate::errors::AppError;
use crate::models::employee::{EmployeePatch, EmployeeStatus, NewEmployee};
use crate::models::envelope::ApiResponse;
use crate::services::{EmployeeFilter, EmployeeService};
use crate::utils::validation::{field_error, parse_employee_id, parse_hire_date, validate_hire_date, validate_payload};

// Fields are optional so that every missing one is reported together by
// `validate` rather than serde stopping at the first.
#[derive(Deserialize, Validate)]
pub struct NewEmployeeRequest {
    #[validate(required, length(min = 3))]
    name: Option<String>,
    #[validate(required, email)]
    email: Option<String>,
    #[validate(required, length(min = 2))]
    position: Option<String>,
    #[validate(required, length(min = 2))]
    department: Option<String>,
    #[validate(required, range(min = 1))]
    salary: Option<i64>,
    #[validate(required, custom = "validate_hire_date")]
    hire_date: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct EmployeeUpdateRequest {
    #[validate(length(min = 3))]
    name: Option<String>,
    #[validate(email)]
    email: Option<String>,
    #[validate(length(min = 2))]
    position: Option<String>,
    #[validate(length(min = 2))]
    department: Option<String>,
    #[validate(range(min = 1))]
    salary: Option<i64>,
    #[validate(custom = "validate_hire_date")]
    hire_date: Option<String>,
    status: Option<EmployeeStatus>,
}

#[derive(Deserialize)]
pub struct EmployeeQueryParams {
    page: Option<i64>,
    limit: Option<i64>,
    department: Option<String>,
    status: Option<String>,
    search: Option<String>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| field_error(field, "is required"))
}

fn hire_date_of(raw: &str) -> Result<chrono::NaiveDate, AppError> {
    parse_hire_date(raw).ok_or_else(|| field_error("hire_date", "is an invalid date (expected YYYY-MM-DD)"))
}

impl NewEmployeeRequest {
    fn into_new_employee(self) -> Result<NewEmployee, AppError> {
        let hire_date = hire_date_of(&required(self.hire_date, "hire_date")?)?;
        Ok(NewEmployee {
            name: required(self.name, "name")?,
            email: required(self.email, "email")?,
            position: required(self.position, "position")?,
            department: required(self.department, "department")?,
            salary: required(self.salary, "salary")?,
            hire_date,
        })
    }
}

impl EmployeeUpdateRequest {
    fn into_patch(self) -> Result<EmployeePatch, AppError> {
        let hire_date = match self.hire_date.as_deref() {
            Some(raw) => Some(hire_date_of(raw)?),
            None => None,
        };
        Ok(EmployeePatch {
            name: self.name,
            email: self.email,
            position: self.position,
            department: self.department,
            salary: self.salary,
            hire_date,
            status: self.status,
        })
    }
}

pub async fn get_employees(
    service: web::Data<EmployeeService>,
    query: web::Query<EmployeeQueryParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = service.pagination().resolve(params.page, params.limit);
    let filter = EmployeeFilter::new(params.department, params.status, params.search);

    let result = service.list(&filter, page).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::paginated(
        "Employees retrieved successfully",
        result.employees,
        result.pagination,
    )))
}

pub async fn get_employee(
    service: web::Data<EmployeeService>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_employee_id(&id)?;
    let employee = service.get(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new("Employee detail retrieved", employee)))
}

pub async fn create_employee(
    service: web::Data<EmployeeService>,
    payload: web::Json<NewEmployeeRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*payload)?;
    let employee = service.create(payload.into_inner().into_new_employee()?).await?;
    Ok(HttpResponse::Created().json(ApiResponse::new("Employee created successfully", employee)))
}

pub async fn update_employee(
    service: web::Data<EmployeeService>,
    id: web::Path<String>,
    payload: web::Json<EmployeeUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let id = parse_employee_id(&id)?;
    validate_payload(&*payload)?;
    let employee = service.update(id, payload.into_inner().into_patch()?).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new("Employee updated successfully", employee)))
}

pub async fn delete_employee(
    service: web::Data<EmployeeService>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_employee_id(&id)?;
    service.deactivate(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::empty("Employee deactivated successfully (Soft Delete)")))
}

pub async fn get_stats(service: web::Data<EmployeeService>) -> Result<HttpResponse, AppError> {
    let stats = service.stats().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new("Statistics retrieved", stats)))
}
