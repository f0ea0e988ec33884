use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Completed-shift read model. Clock-in/out lives elsewhere; the engine only
/// needs the end time (to date shift-linked adjustments) and worked hours.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub object_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub hours: BigDecimal,
    pub created_at: DateTime<Utc>,
}
