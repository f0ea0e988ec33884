use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AdjustmentCategory {
        ShiftBase => "shift_base",
        LatePenalty => "late_penalty",
        TaskBonus => "task_bonus",
        TaskPenalty => "task_penalty",
        ManualBonus => "manual_bonus",
        ManualDeduction => "manual_deduction",
        IncidentDeduction => "incident_deduction",
        IncidentRefund => "incident_refund",
        CancellationFine => "cancellation_fine",
    }
}

impl AdjustmentCategory {
    /// Manual categories are the only ones that may be edited or deleted.
    pub fn is_manual(&self) -> bool {
        matches!(
            self,
            AdjustmentCategory::ManualBonus | AdjustmentCategory::ManualDeduction
        )
    }

    /// Canonical sign convention: penalties and deductions are stored negative.
    pub fn is_deduction(&self) -> bool {
        matches!(
            self,
            AdjustmentCategory::LatePenalty
                | AdjustmentCategory::TaskPenalty
                | AdjustmentCategory::ManualDeduction
                | AdjustmentCategory::IncidentDeduction
                | AdjustmentCategory::CancellationFine
        )
    }

    /// Apply the canonical sign to a positive magnitude.
    pub fn signed_amount(&self, magnitude: BigDecimal) -> BigDecimal {
        if self.is_deduction() {
            -magnitude
        } else {
            magnitude
        }
    }
}

/// Where an adjustment takes its effective date from. Shift-linked facts are
/// dated by when the work ended, free-standing ones by when they were recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveDate {
    FromShift(DateTime<Utc>),
    OwnTimestamp(DateTime<Utc>),
}

impl EffectiveDate {
    pub fn resolve(self) -> DateTime<Utc> {
        match self {
            EffectiveDate::FromShift(shift_end) => shift_end,
            EffectiveDate::OwnTimestamp(created_at) => created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Adjustment {
    pub id: Uuid,
    pub shift_id: Option<Uuid>,
    pub employee_id: Uuid,
    pub object_id: Option<Uuid>,
    pub category: AdjustmentCategory,
    pub amount: BigDecimal,
    pub description: Option<String>,
    pub details: Option<serde_json::Value>,
    pub linked_entry_id: Option<Uuid>,
    pub is_applied: bool,
    pub effective_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_by: Option<Uuid>,
    pub edit_history: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Adjustment {
    /// An orphan is marked applied but lost its entry link; reconciliation
    /// treats it like a new adjustment.
    pub fn is_orphaned(&self) -> bool {
        self.is_applied && self.linked_entry_id.is_none()
    }

    /// Hours recorded in details, present on shift_base adjustments.
    pub fn detail_hours(&self) -> f64 {
        self.details
            .as_ref()
            .and_then(|d| d.get("hours"))
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentInput {
    pub shift_id: Option<Uuid>,
    pub employee_id: Uuid,
    pub object_id: Option<Uuid>,
    pub category: AdjustmentCategory,
    /// Positive magnitude; the ledger applies the canonical sign.
    pub amount: BigDecimal,
    pub description: Option<String>,
    pub details: Option<serde_json::Value>,
}

/// Fully resolved record handed to the repository: sign already canonical,
/// effective date already decided.
#[derive(Debug, Clone)]
pub struct NewAdjustment {
    pub shift_id: Option<Uuid>,
    pub employee_id: Uuid,
    pub object_id: Option<Uuid>,
    pub category: AdjustmentCategory,
    pub amount: BigDecimal,
    pub description: Option<String>,
    pub details: Option<serde_json::Value>,
    pub effective_at: DateTime<Utc>,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentUpdateInput {
    pub amount: Option<BigDecimal>,
    pub description: Option<String>,
    pub details: Option<serde_json::Value>,
}

/// One edit_history element: a single field change with before/after values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRecord {
    pub timestamp: DateTime<Utc>,
    pub actor: Uuid,
    pub field: String,
    pub old_value: serde_json::Value,
    pub new_value: serde_json::Value,
}
