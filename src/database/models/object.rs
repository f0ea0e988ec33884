use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A staffed object (site). Objects hang off the org tree and may override
/// the inherited payment schedule/system with their own values.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkObject {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub org_unit_id: Option<Uuid>,
    pub name: String,
    pub payment_schedule_id: Option<Uuid>,
    pub payment_system_id: Option<Uuid>,
    pub hourly_rate: Option<BigDecimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
