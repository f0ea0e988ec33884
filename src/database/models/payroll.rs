use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Derived aggregate, one per (employee, object, period). Aggregates are a
/// pure function of the currently linked adjustment set and are overwritten
/// in full on every reconciliation pass.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PayrollEntry {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub contract_id: Option<Uuid>,
    pub object_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub hours_worked: BigDecimal,
    pub hourly_rate: BigDecimal,
    pub gross_amount: BigDecimal,
    pub total_bonuses: BigDecimal,
    pub total_deductions: BigDecimal,
    pub net_amount: BigDecimal,
    pub calculation_details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregates computed from a full candidate set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryTotals {
    pub hours_worked: BigDecimal,
    pub hourly_rate: BigDecimal,
    pub gross_amount: BigDecimal,
    pub total_bonuses: BigDecimal,
    pub total_deductions: BigDecimal,
    pub net_amount: BigDecimal,
}

/// Informational snapshot stored on the entry, rebuilt on every pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationDetails {
    pub source: String,
    pub calculated_at: DateTime<Utc>,
    pub calculated_by: Uuid,
    pub shift_ids: Vec<Uuid>,
    pub adjustments: Vec<CalculationLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationLine {
    pub adjustment_id: Uuid,
    pub category: String,
    pub amount: BigDecimal,
}
