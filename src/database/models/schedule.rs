use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PaymentFrequency {
        Daily => "daily",
        Weekly => "weekly",
        Biweekly => "biweekly",
        Monthly => "monthly",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSchedule {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub object_id: Option<Uuid>,
    pub name: String,
    pub frequency: PaymentFrequency,
    /// ISO weekday 1-7 for daily/weekly/biweekly, day-of-month for monthly.
    pub payment_day: i32,
    pub period_config: sqlx::types::Json<PeriodConfig>,
    pub is_custom: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Frequency-specific offsets, stored as JSONB. Offsets are day deltas
/// relative to the payment date. Monthly schedules either carry a list of
/// payment events or the legacy single-offset form with optional calc_rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodConfig {
    #[serde(default)]
    pub start_offset: Option<i64>,
    #[serde(default)]
    pub end_offset: Option<i64>,
    #[serde(default)]
    pub payment_events: Option<Vec<PaymentEvent>>,
    #[serde(default)]
    pub calc_rules: Option<CalcRules>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEvent {
    pub start_offset: i64,
    pub end_offset: i64,
    #[serde(default)]
    pub is_end_of_month: bool,
    #[serde(default)]
    pub is_start_of_month: bool,
    #[serde(default)]
    pub next_payment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalcRules {
    #[serde(default)]
    pub period: Option<String>,
}

impl CalcRules {
    pub fn is_previous_month(&self) -> bool {
        self.period.as_deref() == Some("previous_month")
    }
}

/// A `[start, end]` date range one payment schedule designates for one payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start <= end && self.end >= start
    }
}
