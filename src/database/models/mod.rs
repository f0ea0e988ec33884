pub mod adjustment;
pub mod contract;
pub mod employee;
pub mod macros;
pub mod object;
pub mod org_unit;
pub mod payment;
pub mod payroll;
pub mod schedule;
pub mod shift;
pub mod statement;

// Re-export all models for easy importing
pub use adjustment::*;
pub use contract::*;
pub use employee::*;
pub use object::*;
pub use org_unit::*;
pub use payment::*;
pub use payroll::*;
pub use schedule::*;
pub use shift::*;
pub use statement::*;
