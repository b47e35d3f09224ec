//! REST service for managing employee records: listing with filters and
//! pagination, CRUD with soft delete, and per-department statistics.

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;
