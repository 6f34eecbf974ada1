pub mod commission;
pub mod documents;
pub mod payroll;
pub mod report;
