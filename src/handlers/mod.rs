pub mod adjustments;
pub mod payroll;
pub mod shared;
