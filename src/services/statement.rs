use std::collections::{HashMap, HashSet};

use bigdecimal::{BigDecimal, Zero};
use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::database::{
    models::{
        Adjustment, Contract, PaymentSchedule, PaymentStatus, PayrollEntry, Period, Statement,
        StatementEntryBlock, StatementLogInput, StatementTotals, WorkObject,
    },
    repositories::{
        adjustment as adjustment_repo, contract as contract_repo, employee as employee_repo,
        object as object_repo, org_unit as org_unit_repo, payment as payment_repo,
        payroll_entry as entry_repo, schedule as schedule_repo, statement_log,
    },
};
use crate::error::AppError;
use crate::services::{generation, inheritance::OrgUnitTree, period as period_resolver};

/// Days scanned beyond the covered range. Monthly schedules have no
/// closed-form "next period", so discovery walks the calendar day by day.
const SCAN_DAYS_BEFORE: i64 = 90;
const SCAN_DAYS_AFTER: i64 = 30;

/// Visibility restriction applied before any data is read: an optional owner
/// and, for manager-level callers, the set of objects they may see.
#[derive(Debug, Clone, Default)]
pub struct StatementScope {
    pub owner_id: Option<Uuid>,
    pub accessible_object_ids: Option<Vec<Uuid>>,
}

pub async fn generate_statement(
    employee_id: Uuid,
    requester_id: Uuid,
    requester_role: &str,
    scope: StatementScope,
) -> Result<Statement, AppError> {
    let employee = employee_repo::get(employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))?;

    // Contracts in scope, each reduced to the objects the caller may see.
    let contracts = contract_repo::list_for_employee(employee_id, scope.owner_id).await?;
    if contracts.is_empty() {
        return Err(AppError::NotFound(format!(
            "Employee {} has no contracts in scope",
            employee_id
        )));
    }

    let contract_objects = restrict_contracts(contracts, scope.accessible_object_ids.as_deref());
    if contract_objects.is_empty() {
        return Err(AppError::NoAccessibleObjects(employee_id.to_string()));
    }

    let object_ids: Vec<Uuid> = {
        let mut ids: Vec<Uuid> = contract_objects
            .iter()
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    };

    let objects = object_repo::list_by_ids(&object_ids).await?;
    let objects_by_id: HashMap<Uuid, WorkObject> =
        objects.into_iter().map(|o| (o.id, o)).collect();

    // Org units batch-loaded up front; the tree resolves every object's
    // effective schedule without per-object fetches.
    let owner_ids: Vec<Uuid> = {
        let mut ids: Vec<Uuid> = objects_by_id.values().map(|o| o.owner_id).collect();
        ids.sort();
        ids.dedup();
        ids
    };
    let tree = OrgUnitTree::new(org_unit_repo::list_for_owners(&owner_ids).await?);

    let entries = entry_repo::list_for_employee(employee_id, &object_ids).await?;
    let adjustments = adjustment_repo::for_employee_objects(employee_id, &object_ids).await?;

    let (range_start, range_end) = covered_range(&entries, &adjustments);

    // Discover every period any involved schedule designates in the scan
    // window, then backfill gaps through the generation service.
    let schedules = load_schedules(&tree, &contract_objects, &objects_by_id).await?;
    let periods = discover_periods(&schedules, range_start, range_end);

    for period in &periods {
        for (contract, allowed_ids) in &contract_objects {
            for object_id in allowed_ids {
                let Some(object) = objects_by_id.get(object_id) else {
                    continue;
                };
                if let Err(err) = generation::run_contract_period(
                    contract.clone(),
                    object.clone(),
                    *period,
                    requester_id,
                    "statement_backfill".to_string(),
                )
                .await
                {
                    log::error!(
                        "Statement backfill failed for contract {} object {} period {}..{}: {}",
                        contract.id,
                        object_id,
                        period.start,
                        period.end,
                        err
                    );
                }
            }
        }
    }

    // Reload after backfill and assemble the view.
    let entries = entry_repo::list_for_employee(employee_id, &object_ids).await?;
    let adjustments = adjustment_repo::for_employee_objects(employee_id, &object_ids).await?;
    let entry_ids: Vec<Uuid> = entries.iter().map(|e| e.id).collect();
    let payments = payment_repo::list_for_entries(&entry_ids).await?;

    let mut blocks = Vec::with_capacity(entries.len());
    let mut totals = StatementTotals {
        gross: BigDecimal::zero(),
        bonuses: BigDecimal::zero(),
        deductions: BigDecimal::zero(),
        net: BigDecimal::zero(),
        paid: BigDecimal::zero(),
        balance: BigDecimal::zero(),
    };

    for entry in entries {
        let entry_adjustments: Vec<Adjustment> = adjustments
            .iter()
            .filter(|a| a.linked_entry_id == Some(entry.id))
            .cloned()
            .collect();
        let entry_payments: Vec<_> = payments
            .iter()
            .filter(|p| p.payroll_entry_id == entry.id)
            .cloned()
            .collect();
        let paid_amount: BigDecimal = entry_payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Completed)
            .map(|p| p.amount.clone())
            .sum();

        totals.gross += &entry.gross_amount;
        totals.bonuses += &entry.total_bonuses;
        totals.deductions += &entry.total_deductions;
        totals.net += &entry.net_amount;
        totals.paid += &paid_amount;

        blocks.push(StatementEntryBlock {
            entry,
            adjustments: entry_adjustments,
            payments: entry_payments,
            paid_amount,
        });
    }
    totals.balance = &totals.net - &totals.paid;

    let pending_adjustments: Vec<Adjustment> = adjustments
        .iter()
        .filter(|a| !a.is_applied || a.linked_entry_id.is_none())
        .cloned()
        .collect();

    // Best effort: a failed audit write never fails the read path.
    let log_input = StatementLogInput {
        employee_id,
        requester_id,
        requester_role: requester_role.to_string(),
        range_start,
        range_end,
        total_net: totals.net.clone(),
        total_paid: totals.paid.clone(),
    };
    if let Err(err) = statement_log::insert(log_input).await {
        log::warn!(
            "Statement log write failed for employee {}: {}",
            employee_id,
            err
        );
    }

    Ok(Statement {
        employee_id,
        employee_name: employee.full_name,
        range_start,
        range_end,
        entries: blocks,
        pending_adjustments,
        totals,
        generated_at: Utc::now(),
    })
}

/// Intersect each contract's allowed objects with the accessibility
/// restriction; contracts left with nothing are dropped.
fn restrict_contracts(
    contracts: Vec<Contract>,
    accessible: Option<&[Uuid]>,
) -> Vec<(Contract, Vec<Uuid>)> {
    contracts
        .into_iter()
        .filter_map(|contract| {
            let allowed: Vec<Uuid> = contract
                .allowed_object_ids
                .iter()
                .copied()
                .filter(|id| accessible.is_none_or(|acc| acc.contains(id)))
                .collect();
            if allowed.is_empty() {
                None
            } else {
                Some((contract, allowed))
            }
        })
        .collect()
}

/// The date range statements must cover: min/max over adjustment effective
/// dates and existing entry boundaries, today when nothing exists yet.
fn covered_range(entries: &[PayrollEntry], adjustments: &[Adjustment]) -> (NaiveDate, NaiveDate) {
    let today = Utc::now().date_naive();
    let mut start = None::<NaiveDate>;
    let mut end = None::<NaiveDate>;

    let mut widen = |date: NaiveDate| {
        start = Some(start.map_or(date, |s| s.min(date)));
        end = Some(end.map_or(date, |e| e.max(date)));
    };

    for entry in entries {
        widen(entry.period_start);
        widen(entry.period_end);
    }
    for adjustment in adjustments {
        widen(adjustment.effective_at.date_naive());
    }

    (start.unwrap_or(today), end.unwrap_or(today))
}

async fn load_schedules(
    tree: &OrgUnitTree,
    contract_objects: &[(Contract, Vec<Uuid>)],
    objects_by_id: &HashMap<Uuid, WorkObject>,
) -> Result<Vec<PaymentSchedule>, AppError> {
    let mut schedule_ids = HashSet::new();

    for (contract, allowed_ids) in contract_objects {
        for object_id in allowed_ids {
            if let Some(object) = objects_by_id.get(object_id) {
                if let Some(schedule_id) = tree.schedule_for_contract(contract, object) {
                    schedule_ids.insert(schedule_id);
                }
            }
        }
    }

    let ids: Vec<Uuid> = schedule_ids.into_iter().collect();
    Ok(schedule_repo::get_many(&ids).await?)
}

/// Day-by-day window scan: every distinct period any schedule designates
/// that overlaps the covered range.
fn discover_periods(
    schedules: &[PaymentSchedule],
    range_start: NaiveDate,
    range_end: NaiveDate,
) -> Vec<Period> {
    let scan_start = range_start - Duration::days(SCAN_DAYS_BEFORE);
    let scan_end = range_end + Duration::days(SCAN_DAYS_AFTER);

    let mut periods = HashSet::new();
    for schedule in schedules {
        for day in scan_start.iter_days().take_while(|d| *d <= scan_end) {
            if let Some(period) = period_resolver::resolve(schedule, day) {
                if period.overlaps(range_start, range_end) {
                    periods.insert(period);
                }
            }
        }
    }

    let mut periods: Vec<Period> = periods.into_iter().collect();
    periods.sort();
    periods
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{
        ContractStatus, PaymentFrequency, PeriodConfig, SettlementPolicy,
    };
    use pretty_assertions::assert_eq;

    fn contract(allowed: Vec<Uuid>) -> Contract {
        Contract {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            allowed_object_ids: allowed,
            status: ContractStatus::Active,
            settlement_policy: SettlementPolicy::Schedule,
            termination_date: None,
            payment_schedule_id: None,
            inherit_payment_schedule: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn restriction_intersects_and_drops_empty_contracts() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let contracts = vec![contract(vec![a, b]), contract(vec![c])];

        let restricted = restrict_contracts(contracts, Some(&[a, b]));
        assert_eq!(restricted.len(), 1);
        assert_eq!(restricted[0].1, vec![a, b]);
    }

    #[test]
    fn no_restriction_keeps_all_objects() {
        let a = Uuid::new_v4();
        let restricted = restrict_contracts(vec![contract(vec![a])], None);
        assert_eq!(restricted.len(), 1);
        assert_eq!(restricted[0].1, vec![a]);
    }

    #[test]
    fn covered_range_defaults_to_today() {
        let (start, end) = covered_range(&[], &[]);
        let today = Utc::now().date_naive();
        assert_eq!((start, end), (today, today));
    }

    #[test]
    fn weekly_scan_discovers_overlapping_periods() {
        let schedule = PaymentSchedule {
            id: Uuid::new_v4(),
            owner_id: None,
            object_id: None,
            name: "weekly".to_string(),
            frequency: PaymentFrequency::Weekly,
            payment_day: 2,
            period_config: sqlx::types::Json(PeriodConfig {
                start_offset: Some(-8),
                end_offset: Some(-2),
                ..Default::default()
            }),
            is_custom: false,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let range_start: NaiveDate = "2025-10-01".parse().unwrap();
        let range_end: NaiveDate = "2025-10-14".parse().unwrap();
        let periods = discover_periods(&[schedule], range_start, range_end);

        // Every Tuesday in/near the window contributes one week-long period;
        // all discovered periods must overlap the range and be distinct.
        assert!(!periods.is_empty());
        let mut seen = HashSet::new();
        for period in &periods {
            assert!(period.overlaps(range_start, range_end));
            assert!(seen.insert(*period));
            assert_eq!(period.end - period.start, Duration::days(6));
        }
    }
}
