use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "active",
            EmployeeStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmployeeStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(EmployeeStatus::Active),
            "inactive" => Ok(EmployeeStatus::Inactive),
            other => Err(format!("unknown employee status '{}'", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub position: String,
    pub department: String,
    pub salary: i64,
    pub hire_date: NaiveDate,
    pub status: EmployeeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of an employee that does not exist yet. The store assigns the id,
/// the timestamps and forces the status to active.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub position: String,
    pub department: String,
    pub salary: i64,
    pub hire_date: NaiveDate,
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmployeePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub salary: Option<i64>,
    pub hire_date: Option<NaiveDate>,
    pub status: Option<EmployeeStatus>,
}

impl EmployeePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.position.is_none()
            && self.department.is_none()
            && self.salary.is_none()
            && self.hire_date.is_none()
            && self.status.is_none()
    }

    /// Applies the patch in place. Used by stores that keep rows in process.
    pub fn apply_to(&self, employee: &mut Employee) {
        if let Some(name) = &self.name {
            employee.name = name.clone();
        }
        if let Some(email) = &self.email {
            employee.email = email.clone();
        }
        if let Some(position) = &self.position {
            employee.position = position.clone();
        }
        if let Some(department) = &self.department {
            employee.department = department.clone();
        }
        if let Some(salary) = self.salary {
            employee.salary = salary;
        }
        if let Some(hire_date) = self.hire_date {
            employee.hire_date = hire_date;
        }
        if let Some(status) = self.status {
            employee.status = status;
        }
    }
}

/// Raw per-department totals over active employees, as read from the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepartmentTotals {
    pub department: String,
    pub count: i64,
    pub salary_sum: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DepartmentBreakdown {
    pub department: String,
    pub count: i64,
    pub average_salary: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EmployeeStats {
    pub total_active_employees: i64,
    pub department_breakdown: Vec<DepartmentBreakdown>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample() -> Employee {
        let now = Utc::now();
        Employee {
            id: 7,
            name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            position: "Engineer".to_string(),
            department: "Technology".to_string(),
            salary: 5_000_000,
            hire_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            status: EmployeeStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    #[case("active", Some(EmployeeStatus::Active))]
    #[case("inactive", Some(EmployeeStatus::Inactive))]
    #[case("Active", None)]
    #[case("", None)]
    fn status_parses_only_lowercase_names(#[case] raw: &str, #[case] expected: Option<EmployeeStatus>) {
        assert_eq!(raw.parse::<EmployeeStatus>().ok(), expected);
    }

    #[test]
    fn status_defaults_to_active() {
        assert_eq!(EmployeeStatus::default(), EmployeeStatus::Active);
    }

    #[test]
    fn employee_serializes_date_without_time() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["hire_date"], "2024-01-10");
        assert_eq!(json["status"], "active");
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut employee = sample();
        let patch = EmployeePatch {
            department: Some("Finance".to_string()),
            status: Some(EmployeeStatus::Inactive),
            ..Default::default()
        };
        patch.apply_to(&mut employee);

        assert_eq!(employee.department, "Finance");
        assert_eq!(employee.status, EmployeeStatus::Inactive);
        assert_eq!(employee.name, "Jane Doe");
        assert_eq!(employee.salary, 5_000_000);
        assert!(!patch.is_empty());
        assert!(EmployeePatch::default().is_empty());
    }
}
