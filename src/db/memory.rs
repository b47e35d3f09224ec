//! Process-local store. Holds the table lock for the lifetime of a
//! transaction and stages writes on a copy that only replaces the committed
//! table on [`EmployeeTx::commit`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{EmployeeStore, EmployeeTx, StoreError, TxMode};
use crate::models::employee::{DepartmentTotals, Employee, EmployeePatch, EmployeeStatus, NewEmployee};
use crate::services::filter::EmployeeFilter;
use crate::services::pagination::PageRequest;

#[derive(Clone, Debug, Default)]
struct EmployeeTable {
    rows: BTreeMap<i64, Employee>,
}

impl EmployeeTable {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|row| row.email == email && Some(row.id) != except)
    }
}

#[derive(Default)]
pub struct MemoryEmployeeStore {
    table: Arc<Mutex<EmployeeTable>>,
    // Lives outside the table so rolled back inserts never hand out an id twice.
    last_id: Arc<AtomicI64>,
}

impl MemoryEmployeeStore {
    pub fn new() -> Self {
        MemoryEmployeeStore::default()
    }
}

#[async_trait]
impl EmployeeStore for MemoryEmployeeStore {
    async fn begin(&self, mode: TxMode) -> Result<Box<dyn EmployeeTx>, StoreError> {
        let committed = Arc::clone(&self.table).lock_owned().await;
        Ok(Box::new(MemoryEmployeeTx {
            committed,
            staged: None,
            last_id: Arc::clone(&self.last_id),
            mode,
        }))
    }
}

pub struct MemoryEmployeeTx {
    committed: OwnedMutexGuard<EmployeeTable>,
    staged: Option<EmployeeTable>,
    last_id: Arc<AtomicI64>,
    mode: TxMode,
}

impl MemoryEmployeeTx {
    fn table(&self) -> &EmployeeTable {
        self.staged.as_ref().unwrap_or(&*self.committed)
    }

    fn table_mut(&mut self) -> &mut EmployeeTable {
        let committed = &self.committed;
        self.staged
            .get_or_insert_with(|| EmployeeTable::clone(committed))
    }
}

#[async_trait]
impl EmployeeTx for MemoryEmployeeTx {
    async fn find_by_id(&mut self, id: i64) -> Result<Option<Employee>, StoreError> {
        Ok(self.table().rows.get(&id).cloned())
    }

    async fn find_by_email(&mut self, email: &str) -> Result<Option<Employee>, StoreError> {
        Ok(self.table().rows.values().find(|row| row.email == email).cloned())
    }

    async fn insert(&mut self, employee: &NewEmployee) -> Result<Employee, StoreError> {
        if self.table().email_taken(&employee.email, None) {
            return Err(StoreError::UniqueViolation("email".to_string()));
        }

        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let row = Employee {
            id,
            name: employee.name.clone(),
            email: employee.email.clone(),
            position: employee.position.clone(),
            department: employee.department.clone(),
            salary: employee.salary,
            hire_date: employee.hire_date,
            status: EmployeeStatus::Active,
            created_at: now,
            updated_at: now,
        };
        self.table_mut().rows.insert(id, row.clone());
        Ok(row)
    }

    async fn update(&mut self, id: i64, patch: &EmployeePatch) -> Result<Option<Employee>, StoreError> {
        if !self.table().rows.contains_key(&id) {
            return Ok(None);
        }
        if let Some(email) = &patch.email {
            if self.table().email_taken(email, Some(id)) {
                return Err(StoreError::UniqueViolation("email".to_string()));
            }
        }

        let row = self.table_mut().rows.get_mut(&id).map(|row| {
            patch.apply_to(row);
            row.updated_at = Utc::now();
            row.clone()
        });
        Ok(row)
    }

    async fn set_status(&mut self, id: i64, status: EmployeeStatus) -> Result<bool, StoreError> {
        if !self.table().rows.contains_key(&id) {
            return Ok(false);
        }
        if let Some(row) = self.table_mut().rows.get_mut(&id) {
            row.status = status;
            row.updated_at = Utc::now();
        }
        Ok(true)
    }

    async fn find_page(&mut self, filter: &EmployeeFilter, page: &PageRequest) -> Result<Vec<Employee>, StoreError> {
        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        Ok(self
            .table()
            .rows
            .values()
            .rev()
            .filter(|row| filter.matches(row))
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }

    async fn count(&mut self, filter: &EmployeeFilter) -> Result<i64, StoreError> {
        let total = self.table().rows.values().filter(|row| filter.matches(row)).count();
        Ok(i64::try_from(total).unwrap_or(i64::MAX))
    }

    async fn department_totals(&mut self, status: EmployeeStatus) -> Result<Vec<DepartmentTotals>, StoreError> {
        let mut groups: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
        for row in self.table().rows.values().filter(|row| row.status == status) {
            let (count, sum) = groups.entry(row.department.as_str()).or_default();
            *count += 1;
            *sum = sum.checked_add(row.salary).ok_or_else(|| {
                StoreError::CorruptRow(format!("salary sum of department '{}' overflows", row.department))
            })?;
        }

        Ok(groups
            .into_iter()
            .map(|(department, (count, salary_sum))| DepartmentTotals {
                department: department.to_string(),
                count,
                salary_sum,
            })
            .collect())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryEmployeeTx {
            mut committed,
            staged,
            mode,
            ..
        } = *self;
        if let (TxMode::ReadWrite, Some(staged)) = (mode, staged) {
            *committed = staged;
        }
        Ok(())
    }
}
