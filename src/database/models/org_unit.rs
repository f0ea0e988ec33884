use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One node of the organizational tree. Every inheritable setting group has
/// its own inherit flag; a unit only "owns" a value when the flag is cleared.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrgStructureUnit {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    /// Cached depth, equal to parent.level + 1 (0 at root).
    pub level: i32,
    pub payment_system_id: Option<Uuid>,
    pub inherit_payment_system: bool,
    pub payment_schedule_id: Option<Uuid>,
    pub inherit_payment_schedule: bool,
    pub lateness_threshold_minutes: Option<i32>,
    pub lateness_penalty_per_minute: Option<BigDecimal>,
    pub inherit_lateness_policy: bool,
    pub short_notice_hours: Option<i32>,
    pub short_notice_fine: Option<BigDecimal>,
    pub invalid_reason_fine: Option<BigDecimal>,
    pub inherit_cancellation_policy: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatenessPolicy {
    pub threshold_minutes: i32,
    pub penalty_per_minute: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationPolicy {
    pub short_notice_hours: i32,
    pub short_notice_fine: BigDecimal,
    pub invalid_reason_fine: BigDecimal,
}

impl OrgStructureUnit {
    /// The unit's own lateness policy, if it does not defer to its parent.
    pub fn own_lateness_policy(&self) -> Option<LatenessPolicy> {
        if self.inherit_lateness_policy {
            return None;
        }
        Some(LatenessPolicy {
            threshold_minutes: self.lateness_threshold_minutes?,
            penalty_per_minute: self.lateness_penalty_per_minute.clone()?,
        })
    }

    pub fn own_cancellation_policy(&self) -> Option<CancellationPolicy> {
        if self.inherit_cancellation_policy {
            return None;
        }
        Some(CancellationPolicy {
            short_notice_hours: self.short_notice_hours?,
            short_notice_fine: self.short_notice_fine.clone()?,
            invalid_reason_fine: self.invalid_reason_fine.clone()?,
        })
    }

    pub fn own_payment_schedule_id(&self) -> Option<Uuid> {
        if self.inherit_payment_schedule {
            None
        } else {
            self.payment_schedule_id
        }
    }

    pub fn own_payment_system_id(&self) -> Option<Uuid> {
        if self.inherit_payment_system {
            None
        } else {
            self.payment_system_id
        }
    }
}
