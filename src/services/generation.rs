use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::database::{
    models::{
        Adjustment, AdjustmentCategory, CalculationDetails, CalculationLine, Contract,
        EntryTotals, Period, WorkObject,
    },
    repositories::{adjustment as adjustment_repo, payroll_entry as entry_repo},
    transaction::DatabaseTransaction,
    utils::sql,
};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOutcome {
    pub entries_created: u64,
    pub entries_updated: u64,
    pub adjustments_applied: u64,
}

impl ProcessOutcome {
    pub fn absorb(&mut self, other: ProcessOutcome) {
        self.entries_created += other.entries_created;
        self.entries_updated += other.entries_updated;
        self.adjustments_applied += other.adjustments_applied;
    }

    pub fn is_noop(&self) -> bool {
        self.entries_created == 0 && self.entries_updated == 0 && self.adjustments_applied == 0
    }
}

pub fn period_utc_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Exclusive upper bound: the first instant after the period's last day.
pub fn period_utc_end_exclusive(end: NaiveDate) -> DateTime<Utc> {
    end.succ_opt()
        .unwrap_or(NaiveDate::MAX)
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// Skip conditions from the eligibility gate: the object must be among the
/// contract's allowed objects and the period must still be settleable.
pub fn is_eligible(contract: &Contract, object_id: Uuid, period_end: NaiveDate) -> bool {
    contract.allows_object(object_id) && contract.is_settleable_for(period_end)
}

/// Aggregates as a pure function of the complete candidate set. Never
/// incremental: every reconciliation pass folds the whole set again.
pub fn compute_totals(candidates: &[Adjustment]) -> EntryTotals {
    let mut gross = BigDecimal::zero();
    let mut bonuses = BigDecimal::zero();
    let mut deductions = BigDecimal::zero();
    let mut hours = 0.0_f64;

    for adjustment in candidates {
        if adjustment.category == AdjustmentCategory::ShiftBase {
            gross += &adjustment.amount;
            hours += adjustment.detail_hours();
        } else if adjustment.amount > BigDecimal::zero() {
            bonuses += &adjustment.amount;
        } else {
            deductions += -&adjustment.amount;
        }
    }

    let hours_worked = BigDecimal::try_from(hours).unwrap_or_else(|_| BigDecimal::zero());
    let hourly_rate = if hours_worked > BigDecimal::zero() {
        (&gross / &hours_worked).with_scale_round(2, bigdecimal::RoundingMode::HalfUp)
    } else {
        BigDecimal::zero()
    };
    let net_amount = &gross + &bonuses - &deductions;

    EntryTotals {
        hours_worked: hours_worked.with_scale_round(2, bigdecimal::RoundingMode::HalfUp),
        hourly_rate,
        gross_amount: gross,
        total_bonuses: bonuses,
        total_deductions: deductions,
        net_amount,
    }
}

/// Candidates not yet consumed by this entry: unapplied rows plus orphans
/// (applied but unlinked). Rows already linked to the entry are excluded so
/// relinking never happens twice.
pub fn split_new_candidates(candidates: &[Adjustment], entry_id: Option<Uuid>) -> Vec<Uuid> {
    candidates
        .iter()
        .filter(|a| !(a.is_applied && a.linked_entry_id.is_some() && a.linked_entry_id == entry_id))
        .map(|a| a.id)
        .collect()
}

fn build_calculation_details(
    candidates: &[Adjustment],
    calculated_at: DateTime<Utc>,
    actor: Uuid,
    source: &str,
) -> serde_json::Value {
    let mut shift_ids: Vec<Uuid> = candidates.iter().filter_map(|a| a.shift_id).collect();
    shift_ids.sort();
    shift_ids.dedup();

    let details = CalculationDetails {
        source: source.to_string(),
        calculated_at,
        calculated_by: actor,
        shift_ids,
        adjustments: candidates
            .iter()
            .map(|a| CalculationLine {
                adjustment_id: a.id,
                category: a.category.to_string(),
                amount: a.amount.clone(),
            })
            .collect(),
    };

    serde_json::to_value(&details).unwrap_or(serde_json::Value::Null)
}

/// Serialize concurrent reconciliation of one (employee, object, period)
/// triple; unrelated triples stay parallelizable.
async fn lock_natural_key(
    tx: &mut Transaction<'_, Postgres>,
    employee_id: Uuid,
    object_id: Uuid,
    period: Period,
) -> Result<(), sqlx::Error> {
    let key = format!(
        "payroll:{}:{}:{}:{}",
        employee_id, object_id, period.start, period.end
    );
    sqlx::query(&sql("SELECT pg_advisory_xact_lock(hashtextextended(?, 0))"))
        .bind(key)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Idempotently create or recompute the one payroll entry for this contract,
/// object and period. Safe to re-run: with no new adjustments the pass is a
/// complete no-op on entry aggregates and linkage.
pub async fn process_contract_period(
    tx: &mut Transaction<'_, Postgres>,
    contract: &Contract,
    object: &WorkObject,
    period: Period,
    calculated_at: DateTime<Utc>,
    actor: Uuid,
    source: &str,
) -> Result<ProcessOutcome, AppError> {
    let mut outcome = ProcessOutcome::default();

    if !is_eligible(contract, object.id, period.end) {
        log::debug!(
            "Skipping contract {} on object {} for {}..{}: not eligible",
            contract.id,
            object.id,
            period.start,
            period.end
        );
        return Ok(outcome);
    }

    lock_natural_key(tx, contract.employee_id, object.id, period).await?;

    let existing = entry_repo::find_by_natural_key(
        tx,
        contract.employee_id,
        object.id,
        period.start,
        period.end,
    )
    .await?;

    let candidates = adjustment_repo::candidates_for_entry(
        tx,
        contract.employee_id,
        object.id,
        period_utc_start(period.start),
        period_utc_end_exclusive(period.end),
        existing.as_ref().map(|e| e.id),
    )
    .await?;

    // Nothing to aggregate: never create an empty entry.
    if candidates.is_empty() {
        return Ok(outcome);
    }

    let new_ids = split_new_candidates(&candidates, existing.as_ref().map(|e| e.id));
    let totals = compute_totals(&candidates);
    let details = build_calculation_details(&candidates, calculated_at, actor, source);

    let entry = match existing {
        Some(entry) => {
            let updated = entry_repo::overwrite_totals(tx, entry.id, &totals, details).await?;
            outcome.entries_updated = 1;
            updated
        }
        None => {
            let created = entry_repo::create(
                tx,
                contract.employee_id,
                Some(contract.id),
                object.id,
                period.start,
                period.end,
                &totals,
                details,
            )
            .await?;
            outcome.entries_created = 1;
            created
        }
    };

    outcome.adjustments_applied = adjustment_repo::mark_applied(tx, &new_ids, entry.id).await?;

    Ok(outcome)
}

/// One unit of work in its own transaction, used by the statement backfill
/// and the batch trigger.
pub async fn run_contract_period(
    contract: Contract,
    object: WorkObject,
    period: Period,
    actor: Uuid,
    source: String,
) -> Result<ProcessOutcome, AppError> {
    DatabaseTransaction::run(move |tx| {
        Box::pin(async move {
            process_contract_period(tx, &contract, &object, period, Utc::now(), actor, &source)
                .await
        })
    })
    .await
}
