use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Adjustment, EmployeePayment, PayrollEntry};

/// Read-optimized per-employee view: entries with their adjustments and
/// payments, plus running totals and the outstanding balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
    pub entries: Vec<StatementEntryBlock>,
    /// Adjustments not yet reflected in any entry.
    pub pending_adjustments: Vec<Adjustment>,
    pub totals: StatementTotals,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementEntryBlock {
    pub entry: PayrollEntry,
    pub adjustments: Vec<Adjustment>,
    pub payments: Vec<EmployeePayment>,
    /// Sum of completed payments against this entry.
    pub paid_amount: BigDecimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementTotals {
    pub gross: BigDecimal,
    pub bonuses: BigDecimal,
    pub deductions: BigDecimal,
    pub net: BigDecimal,
    pub paid: BigDecimal,
    pub balance: BigDecimal,
}

/// Write-once audit record of a generated statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementLogInput {
    pub employee_id: Uuid,
    pub requester_id: Uuid,
    pub requester_role: String,
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
    pub total_net: BigDecimal,
    pub total_paid: BigDecimal,
}
