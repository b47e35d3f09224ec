//! Record store access. Services talk to an [`EmployeeStore`] and do all
//! multi-step work inside one [`EmployeeTx`] so that paired reads observe the
//! same snapshot and checks precede writes.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use crate::config::StoreBackend;
use crate::models::employee::{DepartmentTotals, Employee, EmployeePatch, EmployeeStatus, NewEmployee};
use crate::services::filter::EmployeeFilter;
use crate::services::pagination::PageRequest;

pub use memory::MemoryEmployeeStore;
pub use postgres::PgEmployeeStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated on {0}")]
    UniqueViolation(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("corrupt employee row: {0}")]
    CorruptRow(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxMode {
    /// Snapshot reads; nothing written through the transaction is kept.
    ReadOnly,
    ReadWrite,
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn begin(&self, mode: TxMode) -> Result<Box<dyn EmployeeTx>, StoreError>;

    /// Releases pooled connections. Called once at shutdown.
    async fn close(&self) {}
}

/// A unit of work against the store. Dropping it without calling
/// [`EmployeeTx::commit`] discards every write made through it.
#[async_trait]
pub trait EmployeeTx: Send {
    async fn find_by_id(&mut self, id: i64) -> Result<Option<Employee>, StoreError>;

    async fn find_by_email(&mut self, email: &str) -> Result<Option<Employee>, StoreError>;

    /// Inserts an active employee and returns it with its assigned id.
    async fn insert(&mut self, employee: &NewEmployee) -> Result<Employee, StoreError>;

    /// Applies `patch`, returning `None` when no row has this id.
    async fn update(&mut self, id: i64, patch: &EmployeePatch) -> Result<Option<Employee>, StoreError>;

    /// Returns whether a row with this id existed.
    async fn set_status(&mut self, id: i64, status: EmployeeStatus) -> Result<bool, StoreError>;

    /// Rows matching `filter`, newest id first, restricted to `page`.
    async fn find_page(&mut self, filter: &EmployeeFilter, page: &PageRequest) -> Result<Vec<Employee>, StoreError>;

    async fn count(&mut self, filter: &EmployeeFilter) -> Result<i64, StoreError>;

    /// Per-department headcount and salary sum for employees with `status`.
    async fn department_totals(&mut self, status: EmployeeStatus) -> Result<Vec<DepartmentTotals>, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

pub async fn connect(backend: &StoreBackend) -> Result<Arc<dyn EmployeeStore>, StoreError> {
    match backend {
        StoreBackend::Postgres {
            url,
            max_connections,
            run_migrations,
        } => {
            let store = PgEmployeeStore::connect(url, *max_connections).await?;
            if *run_migrations {
                store.migrate().await?;
                info!("Database migrations applied");
            }
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            info!("Using in-memory employee store; data is lost on shutdown");
            Ok(Arc::new(MemoryEmployeeStore::new()))
        }
    }
}
