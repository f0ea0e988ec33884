use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PaymentStatus {
        Pending => "pending",
        Completed => "completed",
        Failed => "failed",
    }
}

/// Settlement fact recorded against one payroll entry. Read-only to the
/// engine; several partial payments may apply against the same entry.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayment {
    pub id: Uuid,
    pub payroll_entry_id: Uuid,
    pub employee_id: Uuid,
    pub amount: BigDecimal,
    pub payment_date: NaiveDate,
    pub payment_method: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}
