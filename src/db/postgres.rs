use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{FromRow, Postgres, QueryBuilder, Transaction};

use super::{EmployeeStore, EmployeeTx, StoreError, TxMode};
use crate::models::employee::{DepartmentTotals, Employee, EmployeePatch, EmployeeStatus, NewEmployee};
use crate::services::filter::EmployeeFilter;
use crate::services::pagination::PageRequest;

const EMPLOYEE_COLUMNS: &str =
    "id, name, email, position, department, salary, hire_date, status, created_at, updated_at";

#[derive(FromRow)]
struct EmployeeRow {
    id: i64,
    name: String,
    email: String,
    position: String,
    department: String,
    salary: i64,
    hire_date: NaiveDate,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = StoreError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<EmployeeStatus>()
            .map_err(|err| StoreError::CorruptRow(format!("employee {}: {}", row.id, err)))?;
        Ok(Employee {
            id: row.id,
            name: row.name,
            email: row.email,
            position: row.position,
            department: row.department,
            salary: row.salary,
            hire_date: row.hire_date,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn select_employees() -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("SELECT ");
    query.push(EMPLOYEE_COLUMNS).push(" FROM employees");
    query
}

/// Unique violations become [`StoreError::UniqueViolation`] naming the
/// offending column where the constraint name reveals it.
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some(constraint) if constraint.contains("email") => "email".to_string(),
                Some(constraint) => constraint.to_string(),
                None => "unknown".to_string(),
            };
            return StoreError::UniqueViolation(field);
        }
    }
    StoreError::Database(err)
}

pub struct PgEmployeeStore {
    pool: PgPool,
}

impl PgEmployeeStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(PgEmployeeStore::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        PgEmployeeStore { pool }
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl EmployeeStore for PgEmployeeStore {
    async fn begin(&self, mode: TxMode) -> Result<Box<dyn EmployeeTx>, StoreError> {
        let mut tx = self.pool.begin().await?;
        if mode == TxMode::ReadOnly {
            sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
                .execute(&mut *tx)
                .await?;
        }
        Ok(Box::new(PgEmployeeTx { tx }))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

pub struct PgEmployeeTx {
    tx: Transaction<'static, Postgres>,
}

impl PgEmployeeTx {
    async fn fetch_employee(&mut self, mut query: QueryBuilder<'_, Postgres>) -> Result<Option<Employee>, StoreError> {
        query
            .build_query_as::<EmployeeRow>()
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_write_error)?
            .map(Employee::try_from)
            .transpose()
    }
}

#[async_trait]
impl EmployeeTx for PgEmployeeTx {
    async fn find_by_id(&mut self, id: i64) -> Result<Option<Employee>, StoreError> {
        let mut query = select_employees();
        query.push(" WHERE id = ").push_bind(id);
        self.fetch_employee(query).await
    }

    async fn find_by_email(&mut self, email: &str) -> Result<Option<Employee>, StoreError> {
        let mut query = select_employees();
        query.push(" WHERE email = ").push_bind(email.to_string());
        self.fetch_employee(query).await
    }

    async fn insert(&mut self, employee: &NewEmployee) -> Result<Employee, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new(
            "INSERT INTO employees (name, email, position, department, salary, hire_date, status) VALUES (",
        );
        let mut values = query.separated(", ");
        values.push_bind(employee.name.clone());
        values.push_bind(employee.email.clone());
        values.push_bind(employee.position.clone());
        values.push_bind(employee.department.clone());
        values.push_bind(employee.salary);
        values.push_bind(employee.hire_date);
        values.push_bind(EmployeeStatus::Active.as_str());
        query.push(") RETURNING ").push(EMPLOYEE_COLUMNS);

        let row = query
            .build_query_as::<EmployeeRow>()
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_write_error)?;
        Employee::try_from(row)
    }

    async fn update(&mut self, id: i64, patch: &EmployeePatch) -> Result<Option<Employee>, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE employees SET ");
        let mut assignments = query.separated(", ");
        if let Some(name) = &patch.name {
            assignments.push("name = ");
            assignments.push_bind_unseparated(name.clone());
        }
        if let Some(email) = &patch.email {
            assignments.push("email = ");
            assignments.push_bind_unseparated(email.clone());
        }
        if let Some(position) = &patch.position {
            assignments.push("position = ");
            assignments.push_bind_unseparated(position.clone());
        }
        if let Some(department) = &patch.department {
            assignments.push("department = ");
            assignments.push_bind_unseparated(department.clone());
        }
        if let Some(salary) = patch.salary {
            assignments.push("salary = ");
            assignments.push_bind_unseparated(salary);
        }
        if let Some(hire_date) = patch.hire_date {
            assignments.push("hire_date = ");
            assignments.push_bind_unseparated(hire_date);
        }
        if let Some(status) = patch.status {
            assignments.push("status = ");
            assignments.push_bind_unseparated(status.as_str());
        }
        assignments.push("updated_at = NOW()");
        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(EMPLOYEE_COLUMNS);

        self.fetch_employee(query).await
    }

    async fn set_status(&mut self, id: i64, status: EmployeeStatus) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE employees SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_write_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_page(&mut self, filter: &EmployeeFilter, page: &PageRequest) -> Result<Vec<Employee>, StoreError> {
        let mut query = select_employees();
        filter.push_where(&mut query);
        query
            .push(" ORDER BY id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        query
            .build_query_as::<EmployeeRow>()
            .fetch_all(&mut *self.tx)
            .await?
            .into_iter()
            .map(Employee::try_from)
            .collect()
    }

    async fn count(&mut self, filter: &EmployeeFilter) -> Result<i64, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM employees");
        filter.push_where(&mut query);
        let (total,) = query
            .build_query_as::<(i64,)>()
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(total)
    }

    async fn department_totals(&mut self, status: EmployeeStatus) -> Result<Vec<DepartmentTotals>, StoreError> {
        let rows = sqlx::query_as::<_, (String, i64, i64)>(
            "SELECT department, COUNT(*), COALESCE(SUM(salary), 0)::BIGINT \
             FROM employees WHERE status = $1 \
             GROUP BY department ORDER BY department",
        )
        .bind(status.as_str())
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(department, count, salary_sum)| DepartmentTotals {
                department,
                count,
                salary_sum,
            })
            .collect())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let PgEmployeeTx { tx } = *self;
        tx.commit().await?;
        Ok(())
    }
}
