//! Employee use cases. Every operation opens one store transaction, so
//! existence and uniqueness checks run against the same state the write
//! lands on, and paired reads share a snapshot.

use std::sync::Arc;

use log::info;

use super::filter::EmployeeFilter;
use super::pagination::{PageRequest, Pagination, PaginationConfig};
use super::stats;
use crate::db::{EmployeeStore, TxMode};
use crate::errors::AppError;
use crate::models::employee::{Employee, EmployeePatch, EmployeeStats, EmployeeStatus, NewEmployee};

#[derive(Debug, PartialEq)]
pub struct EmployeePage {
    pub employees: Vec<Employee>,
    pub pagination: Pagination,
}

pub struct EmployeeService {
    store: Arc<dyn EmployeeStore>,
    pagination: PaginationConfig,
}

impl EmployeeService {
    pub fn new(store: Arc<dyn EmployeeStore>, pagination: PaginationConfig) -> Self {
        EmployeeService { store, pagination }
    }

    pub fn pagination(&self) -> &PaginationConfig {
        &self.pagination
    }

    pub async fn create(&self, employee: NewEmployee) -> Result<Employee, AppError> {
        let mut tx = self.store.begin(TxMode::ReadWrite).await?;
        if tx.find_by_email(&employee.email).await?.is_some() {
            return Err(AppError::duplicate_email());
        }
        let created = tx.insert(&employee).await?;
        tx.commit().await?;

        info!("Created employee {} in {}", created.id, created.department);
        Ok(created)
    }

    pub async fn get(&self, id: i64) -> Result<Employee, AppError> {
        let mut tx = self.store.begin(TxMode::ReadOnly).await?;
        let employee = tx.find_by_id(id).await?;
        tx.commit().await?;
        employee.ok_or_else(AppError::employee_not_found)
    }

    pub async fn list(&self, filter: &EmployeeFilter, page: PageRequest) -> Result<EmployeePage, AppError> {
        let mut tx = self.store.begin(TxMode::ReadOnly).await?;
        let employees = tx.find_page(filter, &page).await?;
        let total = tx.count(filter).await?;
        tx.commit().await?;

        Ok(EmployeePage {
            employees,
            pagination: page.meta(total),
        })
    }

    /// Applies a partial update. Email uniqueness is left to the store, which
    /// rejects collisions with another record as a conflict.
    pub async fn update(&self, id: i64, patch: EmployeePatch) -> Result<Employee, AppError> {
        let mut tx = self.store.begin(TxMode::ReadWrite).await?;
        let current = tx
            .find_by_id(id)
            .await?
            .ok_or_else(AppError::employee_not_found)?;
        if patch.is_empty() {
            tx.commit().await?;
            return Ok(current);
        }

        let updated = tx
            .update(id, &patch)
            .await?
            .ok_or_else(AppError::employee_not_found)?;
        tx.commit().await?;

        info!("Updated employee {}", id);
        Ok(updated)
    }

    /// Soft delete. Deactivating an inactive employee succeeds again.
    pub async fn deactivate(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.store.begin(TxMode::ReadWrite).await?;
        if tx.find_by_id(id).await?.is_none() {
            return Err(AppError::employee_not_found());
        }
        tx.set_status(id, EmployeeStatus::Inactive).await?;
        tx.commit().await?;

        info!("Deactivated employee {}", id);
        Ok(())
    }

    pub async fn stats(&self) -> Result<EmployeeStats, AppError> {
        let active = EmployeeFilter::with_status(EmployeeStatus::Active.as_str());
        let mut tx = self.store.begin(TxMode::ReadOnly).await?;
        let total_active = tx.count(&active).await?;
        let totals = tx.department_totals(EmployeeStatus::Active).await?;
        tx.commit().await?;

        Ok(stats::summarize(total_active, totals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryEmployeeStore;
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    #[fixture]
    fn service() -> EmployeeService {
        EmployeeService::new(Arc::new(MemoryEmployeeStore::new()), PaginationConfig::default())
    }

    fn hire(email: &str, department: &str, salary: i64) -> NewEmployee {
        NewEmployee {
            name: "Jane Doe".to_string(),
            email: email.to_string(),
            position: "Engineer".to_string(),
            department: department.to_string(),
            salary,
            hire_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        }
    }

    async fn total(service: &EmployeeService) -> i64 {
        let page = service.pagination().resolve(None, None);
        service
            .list(&EmployeeFilter::default(), page)
            .await
            .unwrap()
            .pagination
            .total
    }

    #[rstest]
    #[tokio::test]
    async fn create_assigns_fresh_ids_and_activates(service: EmployeeService) {
        let first = service.create(hire("a@x.com", "Technology", 10)).await.unwrap();
        let second = service.create(hire("b@x.com", "Technology", 10)).await.unwrap();

        assert_eq!(first.status, EmployeeStatus::Active);
        assert_ne!(first.id, second.id);
        assert_eq!(service.get(first.id).await.unwrap(), first);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_email_conflicts_even_when_inactive(service: EmployeeService) {
        let jane = service.create(hire("jane@x.com", "Technology", 10)).await.unwrap();
        service.deactivate(jane.id).await.unwrap();

        let err = service.create(hire("jane@x.com", "Finance", 10)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(total(&service).await, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_ids_are_not_found_and_change_nothing(service: EmployeeService) {
        service.create(hire("jane@x.com", "Technology", 10)).await.unwrap();
        let patch = EmployeePatch {
            name: Some("Ghost".to_string()),
            ..Default::default()
        };

        assert!(matches!(service.get(999).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.update(999, patch).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.deactivate(999).await, Err(AppError::NotFound(_))));
        assert_eq!(total(&service).await, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn deactivate_is_idempotent(service: EmployeeService) {
        let jane = service.create(hire("jane@x.com", "Technology", 10)).await.unwrap();

        service.deactivate(jane.id).await.unwrap();
        service.deactivate(jane.id).await.unwrap();

        let stored = service.get(jane.id).await.unwrap();
        assert_eq!(stored.status, EmployeeStatus::Inactive);
        assert_eq!(stored.name, jane.name);
    }

    #[rstest]
    #[tokio::test]
    async fn update_can_reactivate_and_empty_patch_is_a_no_op(service: EmployeeService) {
        let jane = service.create(hire("jane@x.com", "Technology", 10)).await.unwrap();
        service.deactivate(jane.id).await.unwrap();

        let patch = EmployeePatch {
            status: Some(EmployeeStatus::Active),
            hire_date: NaiveDate::from_ymd_opt(2023, 5, 1),
            ..Default::default()
        };
        let updated = service.update(jane.id, patch).await.unwrap();
        assert_eq!(updated.status, EmployeeStatus::Active);
        assert_eq!(updated.hire_date, NaiveDate::from_ymd_opt(2023, 5, 1).unwrap());

        let unchanged = service.update(jane.id, EmployeePatch::default()).await.unwrap();
        assert_eq!(unchanged, updated);
    }

    #[rstest]
    #[tokio::test]
    async fn update_to_a_taken_email_conflicts(service: EmployeeService) {
        service.create(hire("jane@x.com", "Technology", 10)).await.unwrap();
        let john = service.create(hire("john@x.com", "Technology", 10)).await.unwrap();

        let patch = EmployeePatch {
            email: Some("jane@x.com".to_string()),
            ..Default::default()
        };
        assert!(matches!(service.update(john.id, patch).await, Err(AppError::Conflict(_))));
        assert_eq!(service.get(john.id).await.unwrap().email, "john@x.com");
    }

    #[rstest]
    #[tokio::test]
    async fn pages_cover_every_match_exactly_once(service: EmployeeService) {
        for n in 0..23 {
            let department = if n % 3 == 0 { "Finance" } else { "Technology" };
            service
                .create(hire(&format!("e{}@x.com", n), department, 1_000 + n))
                .await
                .unwrap();
        }
        let filter = EmployeeFilter::new(Some("technology".to_string()), None, None);

        let first = service
            .list(&filter, service.pagination().resolve(Some(1), Some(4)))
            .await
            .unwrap();
        let total = first.pagination.total;
        assert_eq!(total, 15);
        assert_eq!(first.pagination.total_pages, 4);

        let mut seen = Vec::new();
        for page in 1..=first.pagination.total_pages {
            let result = service
                .list(&filter, service.pagination().resolve(Some(page), Some(4)))
                .await
                .unwrap();
            assert_eq!(result.pagination.total, total);
            seen.extend(result.employees.into_iter().map(|e| e.id));
        }
        assert_eq!(seen.len() as i64, total);
        assert!(seen.windows(2).all(|pair| pair[0] > pair[1]));

        let beyond = service
            .list(&filter, service.pagination().resolve(Some(9), Some(4)))
            .await
            .unwrap();
        assert!(beyond.employees.is_empty());
        assert_eq!(beyond.pagination.total, total);
    }

    #[rstest]
    #[tokio::test]
    async fn stats_ignore_deactivated_employees(service: EmployeeService) {
        service.create(hire("a@x.com", "Technology", 4_000_000)).await.unwrap();
        service.create(hire("b@x.com", "Technology", 5_000_001)).await.unwrap();
        let leaving = service.create(hire("c@x.com", "Technology", 9_000_000)).await.unwrap();
        service.create(hire("d@x.com", "Finance", 3_000_000)).await.unwrap();
        service.deactivate(leaving.id).await.unwrap();

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.total_active_employees, 3);
        let counted: i64 = stats.department_breakdown.iter().map(|d| d.count).sum();
        assert_eq!(counted, stats.total_active_employees);

        let technology = stats
            .department_breakdown
            .iter()
            .find(|d| d.department == "Technology")
            .unwrap();
        assert_eq!(technology.count, 2);
        assert_eq!(technology.average_salary, 4_500_001);
    }

    #[rstest]
    #[tokio::test]
    async fn stats_on_empty_store_are_zero(service: EmployeeService) {
        let stats = service.stats().await.unwrap();
        assert_eq!(stats.total_active_employees, 0);
        assert!(stats.department_breakdown.is_empty());
    }
}
