pub mod employee;
pub mod filter;
pub mod pagination;
pub mod stats;

pub use employee::{EmployeePage, EmployeeService};
pub use filter::EmployeeFilter;
pub use pagination::{PageRequest, Pagination, PaginationConfig};
