use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::{
    models::{PaymentSchedule, Period, WorkObject},
    repositories::{
        contract as contract_repo, object as object_repo, org_unit as org_unit_repo,
        schedule as schedule_repo,
    },
};
use crate::error::AppError;
use crate::services::{
    generation::{self, ProcessOutcome},
    inheritance::OrgUnitTree,
    period as period_resolver,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculationSummary {
    pub target_date: NaiveDate,
    pub entries_created: u64,
    pub entries_updated: u64,
    pub adjustments_applied: u64,
    pub errors: Vec<String>,
}

impl RecalculationSummary {
    fn new(target_date: NaiveDate) -> Self {
        Self {
            target_date,
            entries_created: 0,
            entries_updated: 0,
            adjustments_applied: 0,
            errors: Vec::new(),
        }
    }

    fn absorb(&mut self, outcome: ProcessOutcome) {
        self.entries_created += outcome.entries_created;
        self.entries_updated += outcome.entries_updated;
        self.adjustments_applied += outcome.adjustments_applied;
    }
}

/// Reconcile every contract whose schedule designates `target_date` as a
/// payment day. A failure on one schedule/object/contract is recorded and
/// never stops the rest of the batch.
pub async fn recalculate(
    target_date: NaiveDate,
    owner_id: Option<Uuid>,
    actor: Uuid,
) -> Result<RecalculationSummary, AppError> {
    let mut summary = RecalculationSummary::new(target_date);

    let schedules = schedule_repo::list_active(owner_id).await?;
    let tree = OrgUnitTree::new(org_unit_repo::list_active(owner_id).await?);
    let objects = object_repo::list_active(owner_id).await?;

    for schedule in &schedules {
        let Some(period) = period_resolver::resolve(schedule, target_date) else {
            continue;
        };

        for object in eligible_objects(schedule, &tree, &objects) {
            if let Err(err) =
                process_object(object, period, actor, &mut summary).await
            {
                summary.errors.push(format!(
                    "schedule {} object {}: {}",
                    schedule.id, object.id, err
                ));
                log::error!(
                    "Recalculation failed for schedule {} object {} period {}..{}: {}",
                    schedule.id,
                    object.id,
                    period.start,
                    period.end,
                    err
                );
            }
        }
    }

    // Second pass: contracts with an individually assigned schedule are
    // reconciled on their own schedule even when their object's differs.
    individually_scheduled_pass(target_date, owner_id, actor, &mut summary).await?;

    log::info!(
        "Recalculation for {}: {} created, {} updated, {} adjustments applied, {} errors",
        target_date,
        summary.entries_created,
        summary.entries_updated,
        summary.adjustments_applied,
        summary.errors.len()
    );

    Ok(summary)
}

/// Objects with a direct schedule match, plus objects without their own
/// schedule sitting under an org unit that resolves to this schedule
/// (including the whole subtree below such units).
fn eligible_objects<'a>(
    schedule: &PaymentSchedule,
    tree: &OrgUnitTree,
    objects: &'a [WorkObject],
) -> Vec<&'a WorkObject> {
    if let Some(object_id) = schedule.object_id {
        // Per-object override schedules bind exactly one object.
        return objects.iter().filter(|o| o.id == object_id).collect();
    }

    let eligible_units: HashSet<Uuid> = tree.units_resolving_to_schedule(schedule.id);

    objects
        .iter()
        .filter(|object| {
            object.payment_schedule_id == Some(schedule.id)
                || (object.payment_schedule_id.is_none()
                    && object
                        .org_unit_id
                        .map(|unit| eligible_units.contains(&unit))
                        .unwrap_or(false))
        })
        .collect()
}

async fn process_object(
    object: &WorkObject,
    period: Period,
    actor: Uuid,
    summary: &mut RecalculationSummary,
) -> Result<(), AppError> {
    let contracts = contract_repo::list_covering_object(object.id).await?;

    for contract in contracts {
        match generation::run_contract_period(
            contract.clone(),
            object.clone(),
            period,
            actor,
            "scheduled_recalculation".to_string(),
        )
        .await
        {
            Ok(outcome) => summary.absorb(outcome),
            Err(err) => {
                summary
                    .errors
                    .push(format!("contract {} object {}: {}", contract.id, object.id, err));
                log::error!(
                    "Recalculation failed for contract {} object {}: {}",
                    contract.id,
                    object.id,
                    err
                );
            }
        }
    }

    Ok(())
}

async fn individually_scheduled_pass(
    target_date: NaiveDate,
    owner_id: Option<Uuid>,
    actor: Uuid,
    summary: &mut RecalculationSummary,
) -> Result<(), AppError> {
    let contracts = contract_repo::list_individually_scheduled(owner_id).await?;

    for contract in contracts {
        let result = async {
            let Some(schedule_id) = contract.payment_schedule_id else {
                return Ok(None);
            };
            let Some(schedule) = schedule_repo::get(schedule_id).await? else {
                return Err(AppError::NotFound(format!("Schedule {}", schedule_id)));
            };
            if !schedule.is_active {
                return Ok(None);
            }
            let Some(period) = period_resolver::resolve(&schedule, target_date) else {
                return Ok(None);
            };
            // Individually scheduled employees settle on the contract's
            // first allowed object.
            let Some(&object_id) = contract.allowed_object_ids.first() else {
                return Ok(None);
            };
            let Some(object) = object_repo::get(object_id).await? else {
                return Err(AppError::NotFound(format!("Object {}", object_id)));
            };

            generation::run_contract_period(
                contract.clone(),
                object,
                period,
                actor,
                "individual_schedule_recalculation".to_string(),
            )
            .await
            .map(Some)
        }
        .await;

        match result {
            Ok(Some(outcome)) => summary.absorb(outcome),
            Ok(None) => {}
            Err(err) => {
                summary
                    .errors
                    .push(format!("individual contract {}: {}", contract.id, err));
                log::error!(
                    "Individual-schedule recalculation failed for contract {}: {}",
                    contract.id,
                    err
                );
            }
        }
    }

    Ok(())
}
