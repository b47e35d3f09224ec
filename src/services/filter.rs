//! Listing filters and their two renderings: a SQL `WHERE` clause for the
//! PostgreSQL store and an in-process predicate for the memory store.

use sqlx::{Postgres, QueryBuilder};

use crate::models::employee::Employee;

/// Optional, conjunctive listing filters.
///
/// `department` and `search` are case-insensitive substring matches, `search`
/// looking at name, email and position. `status` is compared verbatim, so an
/// unknown value simply matches nothing. Blank values are dropped on
/// construction and impose no constraint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmployeeFilter {
    department: Option<String>,
    status: Option<String>,
    search: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn next_connector(first: &mut bool) -> &'static str {
    if std::mem::take(first) {
        " WHERE "
    } else {
        " AND "
    }
}

/// Turns a user value into an `ILIKE` pattern matching it as a literal substring.
fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

impl EmployeeFilter {
    pub fn new(department: Option<String>, status: Option<String>, search: Option<String>) -> Self {
        EmployeeFilter {
            department: non_blank(department),
            status: non_blank(status),
            search: non_blank(search),
        }
    }

    /// Filter that only keeps employees with the given status.
    pub fn with_status(status: &str) -> Self {
        EmployeeFilter::new(None, Some(status.to_string()), None)
    }

    pub fn matches(&self, employee: &Employee) -> bool {
        if let Some(department) = &self.department {
            if !contains_ignore_case(&employee.department, department) {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if employee.status.as_str() != status {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let hit = contains_ignore_case(&employee.name, search)
                || contains_ignore_case(&employee.email, search)
                || contains_ignore_case(&employee.position, search);
            if !hit {
                return false;
            }
        }
        true
    }

    /// Appends ` WHERE ...` to `query`, binding every value. Appends nothing
    /// when the filter is unconstrained.
    pub fn push_where(&self, query: &mut QueryBuilder<'_, Postgres>) {
        let mut first = true;

        if let Some(department) = &self.department {
            query.push(next_connector(&mut first));
            query
                .push("department ILIKE ")
                .push_bind(like_pattern(department))
                .push(" ESCAPE '\\'");
        }
        if let Some(status) = &self.status {
            query.push(next_connector(&mut first));
            query.push("status = ").push_bind(status.clone());
        }
        if let Some(search) = &self.search {
            query.push(next_connector(&mut first));
            let pattern = like_pattern(search);
            query
                .push("(name ILIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR email ILIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR position ILIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
    }
}
