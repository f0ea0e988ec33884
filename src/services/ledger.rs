use bigdecimal::{BigDecimal, Zero};
use chrono::{NaiveDate, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::database::{
    models::{
        Adjustment, AdjustmentCategory, AdjustmentInput, AdjustmentUpdateInput, EditRecord,
        EffectiveDate, NewAdjustment, Period,
    },
    repositories::{
        adjustment as adjustment_repo, contract as contract_repo, object as object_repo,
        payroll_entry as entry_repo, shift as shift_repo,
    },
    transaction::DatabaseTransaction,
};
use crate::error::AppError;
use crate::services::generation::{self, period_utc_end_exclusive, period_utc_start, ProcessOutcome};

/// Adjustments whose effective date falls in `[from, until]`, with optional
/// object / category / applied filters.
pub async fn list_for_period(
    employee_id: Uuid,
    from: NaiveDate,
    until: NaiveDate,
    object_id: Option<Uuid>,
    category: Option<AdjustmentCategory>,
    applied: Option<bool>,
) -> Result<Vec<Adjustment>, AppError> {
    if from > until {
        return Err(AppError::ValidationError(format!(
            "Period start {} is after period end {}",
            from, until
        )));
    }

    Ok(adjustment_repo::for_period(
        employee_id,
        period_utc_start(from),
        period_utc_end_exclusive(until),
        object_id,
        category.map(|c| c.to_string()),
        applied,
    )
    .await?)
}

/// Adjustments not yet consumed by a live entry, orphans included. Without a
/// lower bound this is the final-settlement query: everything outstanding up
/// to and including the cutoff day.
pub async fn list_unapplied(
    employee_id: Uuid,
    from: Option<NaiveDate>,
    until: NaiveDate,
) -> Result<Vec<Adjustment>, AppError> {
    let rows = match from {
        Some(from) => {
            adjustment_repo::unapplied_for_period(
                employee_id,
                period_utc_start(from),
                period_utc_end_exclusive(until),
            )
            .await?
        }
        None => {
            adjustment_repo::unapplied_until(employee_id, period_utc_end_exclusive(until)).await?
        }
    };

    Ok(rows)
}

/// Create an adjustment with the canonical sign applied per category. The
/// caller passes a positive magnitude; deduction categories are negated here,
/// on the write path, since the sign convention is not a type invariant.
pub async fn create_categorized(
    input: AdjustmentInput,
    actor: Uuid,
) -> Result<Adjustment, AppError> {
    if input.amount <= BigDecimal::zero() {
        return Err(AppError::ValidationError(
            "Adjustment amount must be a positive magnitude".to_string(),
        ));
    }

    let effective = match input.shift_id {
        Some(shift_id) => {
            let shift = shift_repo::get(shift_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Shift {} not found", shift_id)))?;
            EffectiveDate::FromShift(shift.end_time)
        }
        None => EffectiveDate::OwnTimestamp(Utc::now()),
    };

    let new = NewAdjustment {
        shift_id: input.shift_id,
        employee_id: input.employee_id,
        object_id: input.object_id,
        category: input.category,
        amount: input.category.signed_amount(input.amount),
        description: input.description,
        details: input.details,
        effective_at: effective.resolve(),
        created_by: actor,
    };

    let adjustment = DatabaseTransaction::run(move |tx| {
        Box::pin(async move { Ok(adjustment_repo::create(tx, new).await?) })
    })
    .await?;

    recompute_covering_entries(&adjustment, actor, "adjustment_created").await;

    Ok(adjustment)
}

/// Edit a manually-created adjustment. Every changed field appends one
/// edit_history record with before/after values, actor and timestamp.
pub async fn update_adjustment(
    id: Uuid,
    update: AdjustmentUpdateInput,
    actor: Uuid,
) -> Result<Adjustment, AppError> {
    let current = adjustment_repo::get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Adjustment {} not found", id)))?;

    if !current.category.is_manual() {
        return Err(AppError::InvalidCategory(format!(
            "Adjustment {} has category {} and cannot be edited",
            id, current.category
        )));
    }

    let now = Utc::now();
    let mut history: Vec<serde_json::Value> = current
        .edit_history
        .as_array()
        .cloned()
        .unwrap_or_default();

    let new_amount = match update.amount {
        Some(magnitude) => {
            if magnitude <= BigDecimal::zero() {
                return Err(AppError::ValidationError(
                    "Adjustment amount must be a positive magnitude".to_string(),
                ));
            }
            let signed = current.category.signed_amount(magnitude);
            if signed != current.amount {
                history.push(edit_record(now, actor, "amount", json!(current.amount), json!(signed)));
            }
            signed
        }
        None => current.amount.clone(),
    };

    let new_description = match update.description {
        Some(description) => {
            if Some(&description) != current.description.as_ref() {
                history.push(edit_record(
                    now,
                    actor,
                    "description",
                    json!(current.description),
                    json!(description),
                ));
            }
            Some(description)
        }
        None => current.description.clone(),
    };

    let new_details = match update.details {
        Some(details) => {
            if Some(&details) != current.details.as_ref() {
                history.push(edit_record(
                    now,
                    actor,
                    "details",
                    current.details.clone().unwrap_or(serde_json::Value::Null),
                    details.clone(),
                ));
            }
            Some(details)
        }
        None => current.details.clone(),
    };

    let history_json = serde_json::Value::Array(history);
    let updated = DatabaseTransaction::run(move |tx| {
        Box::pin(async move {
            Ok(adjustment_repo::apply_update(
                tx,
                id,
                new_amount,
                new_description,
                new_details,
                history_json,
                actor,
            )
            .await?)
        })
    })
    .await?;

    recompute_covering_entries(&updated, actor, "adjustment_edited").await;

    Ok(updated)
}

/// Delete a manually-created adjustment, then recompute any entry whose
/// period covered it so the aggregates drop its amount.
pub async fn delete_adjustment(id: Uuid, actor: Uuid) -> Result<(), AppError> {
    let current = adjustment_repo::get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Adjustment {} not found", id)))?;

    if !current.category.is_manual() {
        return Err(AppError::InvalidCategory(format!(
            "Adjustment {} has category {} and cannot be deleted",
            id, current.category
        )));
    }

    DatabaseTransaction::run(move |tx| {
        Box::pin(async move {
            adjustment_repo::delete(tx, id).await?;
            Ok(())
        })
    })
    .await?;

    recompute_covering_entries(&current, actor, "adjustment_deleted").await;

    Ok(())
}

fn edit_record(
    timestamp: chrono::DateTime<Utc>,
    actor: Uuid,
    field: &str,
    old_value: serde_json::Value,
    new_value: serde_json::Value,
) -> serde_json::Value {
    serde_json::to_value(EditRecord {
        timestamp,
        actor,
        field: field.to_string(),
        old_value,
        new_value,
    })
    .unwrap_or(serde_json::Value::Null)
}

/// Re-run generation for every existing entry whose period covers the
/// adjustment's effective date. Entries own the aggregates; the ledger never
/// patches them directly. Failures are logged, not surfaced: the ledger
/// mutation itself already committed.
async fn recompute_covering_entries(adjustment: &Adjustment, actor: Uuid, source: &str) {
    let effective_date = adjustment.effective_at.date_naive();

    let entries = match entry_repo::list_covering_date(adjustment.employee_id, effective_date).await
    {
        Ok(entries) => entries,
        Err(err) => {
            log::error!(
                "Failed to load entries covering {} for employee {}: {}",
                effective_date,
                adjustment.employee_id,
                err
            );
            return;
        }
    };

    let mut outcome = ProcessOutcome::default();
    for entry in entries {
        let Some(contract_id) = entry.contract_id else {
            continue;
        };

        let result = async {
            let contract = contract_repo::get(contract_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Contract {}", contract_id)))?;
            let object = object_repo::get(entry.object_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Object {}", entry.object_id)))?;

            generation::run_contract_period(
                contract,
                object,
                Period::new(entry.period_start, entry.period_end),
                actor,
                source.to_string(),
            )
            .await
        }
        .await;

        match result {
            Ok(o) => outcome.absorb(o),
            Err(err) => log::error!(
                "Recompute after {} failed for entry {} ({}..{}): {}",
                source,
                entry.id,
                entry.period_start,
                entry.period_end,
                err
            ),
        }
    }

    if !outcome.is_noop() {
        log::info!(
            "Recomputed entries after {}: {} updated, {} adjustments relinked",
            source,
            outcome.entries_updated,
            outcome.adjustments_applied
        );
    }
}
