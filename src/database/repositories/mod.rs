pub mod adjustment;
pub mod contract;
pub mod employee;
pub mod object;
pub mod org_unit;
pub mod payment;
pub mod payroll_entry;
pub mod schedule;
pub mod shift;
pub mod statement_log;
