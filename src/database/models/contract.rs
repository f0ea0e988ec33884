use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ContractStatus {
        Active => "active",
        Terminated => "terminated",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SettlementPolicy {
        /// Keep settling terminated contracts on the regular schedule.
        Schedule => "schedule",
        /// Settle only periods ending on or before the termination date.
        TerminationDate => "termination_date",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub owner_id: Uuid,
    pub allowed_object_ids: Vec<Uuid>,
    pub status: ContractStatus,
    pub settlement_policy: SettlementPolicy,
    pub termination_date: Option<NaiveDate>,
    pub payment_schedule_id: Option<Uuid>,
    pub inherit_payment_schedule: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    pub fn allows_object(&self, object_id: Uuid) -> bool {
        self.allowed_object_ids.contains(&object_id)
    }

    /// Whether a period ending on `period_end` is still settleable.
    pub fn is_settleable_for(&self, period_end: NaiveDate) -> bool {
        match self.status {
            ContractStatus::Active => true,
            ContractStatus::Terminated => match self.settlement_policy {
                SettlementPolicy::Schedule => true,
                SettlementPolicy::TerminationDate => self
                    .termination_date
                    .map(|terminated| period_end <= terminated)
                    .unwrap_or(false),
            },
        }
    }

    /// An individually scheduled contract carries its own schedule and does
    /// not defer to the object's resolution.
    pub fn has_individual_schedule(&self) -> bool {
        !self.inherit_payment_schedule && self.payment_schedule_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn terminated(policy: SettlementPolicy, date: Option<&str>) -> Contract {
        Contract {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            allowed_object_ids: vec![],
            status: ContractStatus::Terminated,
            settlement_policy: policy,
            termination_date: date.map(|d| d.parse().unwrap()),
            payment_schedule_id: None,
            inherit_payment_schedule: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn termination_date_policy_gates_on_period_end() {
        let contract = terminated(SettlementPolicy::TerminationDate, Some("2025-10-15"));

        let before = NaiveDate::from_ymd_opt(2025, 10, 10).unwrap();
        let after = NaiveDate::from_ymd_opt(2025, 10, 20).unwrap();
        assert_eq!(contract.is_settleable_for(before), true);
        assert_eq!(contract.is_settleable_for(after), false);
    }

    #[test]
    fn schedule_policy_keeps_settling() {
        let contract = terminated(SettlementPolicy::Schedule, None);
        let any = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert!(contract.is_settleable_for(any));
    }

    #[test]
    fn termination_date_policy_without_date_never_settles() {
        let contract = terminated(SettlementPolicy::TerminationDate, None);
        let any = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(!contract.is_settleable_for(any));
    }
}
