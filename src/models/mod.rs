pub mod employee;
pub mod envelope;
