pub mod generation;
pub mod inheritance;
pub mod ledger;
pub mod period;
pub mod recalculation;
pub mod statement;

pub use inheritance::OrgUnitTree;
pub use statement::StatementScope;
