//! Aggregation over active employees.

use crate::models::employee::{DepartmentBreakdown, DepartmentTotals, EmployeeStats};

/// Mean of `sum / count` rounded half-up, i.e. ties go toward positive
/// infinity. Returns 0 for an empty group.
pub fn rounded_mean(sum: i64, count: i64) -> i64 {
    if count <= 0 {
        return 0;
    }
    let sum = i128::from(sum);
    let count = i128::from(count);
    let mean = (2 * sum + count).div_euclid(2 * count);
    i64::try_from(mean).unwrap_or(if mean > 0 { i64::MAX } else { i64::MIN })
}

/// Builds the statistics payload, ordering departments by name.
pub fn summarize(total_active: i64, totals: Vec<DepartmentTotals>) -> EmployeeStats {
    let mut department_breakdown: Vec<DepartmentBreakdown> = totals
        .into_iter()
        .map(|totals| DepartmentBreakdown {
            average_salary: rounded_mean(totals.salary_sum, totals.count),
            department: totals.department,
            count: totals.count,
        })
        .collect();
    department_breakdown.sort_by(|a, b| a.department.cmp(&b.department));

    EmployeeStats {
        total_active_employees: total_active,
        department_breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(10, 2, 5)]
    #[case(3, 2, 2)]
    #[case(5, 2, 3)]
    #[case(7, 3, 2)]
    #[case(8, 3, 3)]
    #[case(-3, 2, -1)]
    #[case(100, 0, 0)]
    fn rounds_half_up(#[case] sum: i64, #[case] count: i64, #[case] expected: i64) {
        assert_eq!(rounded_mean(sum, count), expected);
    }

    #[test]
    fn large_sums_do_not_overflow() {
        assert_eq!(rounded_mean(i64::MAX, 1), i64::MAX);
        assert_eq!(rounded_mean(i64::MAX - 1, 2), i64::MAX / 2);
    }

    #[test]
    fn summary_orders_departments_and_averages_each() {
        let stats = summarize(
            5,
            vec![
                DepartmentTotals {
                    department: "Technology".to_string(),
                    count: 2,
                    salary_sum: 9_000_001,
                },
                DepartmentTotals {
                    department: "Finance".to_string(),
                    count: 3,
                    salary_sum: 10_000_000,
                },
            ],
        );

        assert_eq!(stats.total_active_employees, 5);
        assert_eq!(
            stats.department_breakdown,
            vec![
                DepartmentBreakdown {
                    department: "Finance".to_string(),
                    count: 3,
                    average_salary: 3_333_333,
                },
                DepartmentBreakdown {
                    department: "Technology".to_string(),
                    count: 2,
                    average_salary: 4_500_001,
                },
            ]
        );
    }

    #[test]
    fn empty_store_yields_zeroed_summary() {
        let stats = summarize(0, Vec::new());
        assert_eq!(stats.total_active_employees, 0);
        assert!(stats.department_breakdown.is_empty());
    }
}
