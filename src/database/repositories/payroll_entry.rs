use chrono::{NaiveDate, Utc};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::database::{
    get_pool,
    models::{EntryTotals, PayrollEntry},
    utils::sql,
};

const COLUMNS: &str = r#"
    id, employee_id, contract_id, object_id, period_start, period_end,
    hours_worked, hourly_rate, gross_amount, total_bonuses, total_deductions,
    net_amount, calculation_details, created_at, updated_at
"#;

/// Lookup by the natural key used for idempotent upsert.
pub async fn find_by_natural_key(
    tx: &mut Transaction<'_, Postgres>,
    employee_id: Uuid,
    object_id: Uuid,
    period_start: NaiveDate,
    period_end: NaiveDate,
) -> Result<Option<PayrollEntry>, sqlx::Error> {
    sqlx::query_as::<_, PayrollEntry>(&sql(&format!(
        r#"
        SELECT {COLUMNS}
        FROM payroll_entries
        WHERE
            employee_id = ?
            AND object_id = ?
            AND period_start = ?
            AND period_end = ?
        "#
    )))
    .bind(employee_id)
    .bind(object_id)
    .bind(period_start)
    .bind(period_end)
    .fetch_optional(&mut **tx)
    .await
}

pub async fn create(
    tx: &mut Transaction<'_, Postgres>,
    employee_id: Uuid,
    contract_id: Option<Uuid>,
    object_id: Uuid,
    period_start: NaiveDate,
    period_end: NaiveDate,
    totals: &EntryTotals,
    calculation_details: serde_json::Value,
) -> Result<PayrollEntry, sqlx::Error> {
    sqlx::query_as::<_, PayrollEntry>(&sql(&format!(
        r#"
        INSERT INTO
            payroll_entries (
                employee_id, contract_id, object_id, period_start, period_end,
                hours_worked, hourly_rate, gross_amount, total_bonuses,
                total_deductions, net_amount, calculation_details
            )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {COLUMNS}
        "#
    )))
    .bind(employee_id)
    .bind(contract_id)
    .bind(object_id)
    .bind(period_start)
    .bind(period_end)
    .bind(&totals.hours_worked)
    .bind(&totals.hourly_rate)
    .bind(&totals.gross_amount)
    .bind(&totals.total_bonuses)
    .bind(&totals.total_deductions)
    .bind(&totals.net_amount)
    .bind(calculation_details)
    .fetch_one(&mut **tx)
    .await
}

/// Overwrite the aggregate fields in place; never additive.
pub async fn overwrite_totals(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    totals: &EntryTotals,
    calculation_details: serde_json::Value,
) -> Result<PayrollEntry, sqlx::Error> {
    sqlx::query_as::<_, PayrollEntry>(&sql(&format!(
        r#"
        UPDATE payroll_entries
        SET hours_worked = ?, hourly_rate = ?, gross_amount = ?,
            total_bonuses = ?, total_deductions = ?, net_amount = ?,
            calculation_details = ?, updated_at = ?
        WHERE id = ?
        RETURNING {COLUMNS}
        "#
    )))
    .bind(&totals.hours_worked)
    .bind(&totals.hourly_rate)
    .bind(&totals.gross_amount)
    .bind(&totals.total_bonuses)
    .bind(&totals.total_deductions)
    .bind(&totals.net_amount)
    .bind(calculation_details)
    .bind(Utc::now())
    .bind(id)
    .fetch_one(&mut **tx)
    .await
}

pub async fn get(id: Uuid) -> Result<Option<PayrollEntry>, sqlx::Error> {
    sqlx::query_as::<_, PayrollEntry>(&sql(&format!(
        "SELECT {COLUMNS} FROM payroll_entries WHERE id = ?"
    )))
    .bind(id)
    .fetch_optional(&get_pool())
    .await
}

/// Entries whose period covers the given date; manual ledger mutations use
/// this to find what must be recomputed.
pub async fn list_covering_date(
    employee_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<PayrollEntry>, sqlx::Error> {
    sqlx::query_as::<_, PayrollEntry>(&sql(&format!(
        r#"
        SELECT {COLUMNS}
        FROM payroll_entries
        WHERE employee_id = ? AND period_start <= ? AND period_end >= ?
        ORDER BY period_start
        "#
    )))
    .bind(employee_id)
    .bind(date)
    .bind(date)
    .fetch_all(&get_pool())
    .await
}

pub async fn list_for_employee(
    employee_id: Uuid,
    object_ids: &[Uuid],
) -> Result<Vec<PayrollEntry>, sqlx::Error> {
    sqlx::query_as::<_, PayrollEntry>(&sql(&format!(
        r#"
        SELECT {COLUMNS}
        FROM payroll_entries
        WHERE employee_id = ? AND object_id = ANY(?)
        ORDER BY period_start, object_id
        "#
    )))
    .bind(employee_id)
    .bind(object_ids)
    .fetch_all(&get_pool())
    .await
}
