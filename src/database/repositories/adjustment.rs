use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::database::{
    get_pool,
    models::{Adjustment, NewAdjustment},
    utils::sql,
};

const COLUMNS: &str = r#"
    id, shift_id, employee_id, object_id, category, amount, description,
    details, linked_entry_id, is_applied, effective_at, created_by,
    updated_by, edit_history, created_at, updated_at
"#;

pub async fn create(
    tx: &mut Transaction<'_, Postgres>,
    new: NewAdjustment,
) -> Result<Adjustment, sqlx::Error> {
    let adjustment = sqlx::query_as::<_, Adjustment>(&sql(&format!(
        r#"
        INSERT INTO
            adjustments (
                shift_id, employee_id, object_id, category, amount,
                description, details, effective_at, created_by
            )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {COLUMNS}
        "#
    )))
    .bind(new.shift_id)
    .bind(new.employee_id)
    .bind(new.object_id)
    .bind(new.category)
    .bind(new.amount)
    .bind(new.description)
    .bind(new.details)
    .bind(new.effective_at)
    .bind(new.created_by)
    .fetch_one(&mut **tx)
    .await?;

    Ok(adjustment)
}

pub async fn get(id: Uuid) -> Result<Option<Adjustment>, sqlx::Error> {
    sqlx::query_as::<_, Adjustment>(&sql(&format!(
        "SELECT {COLUMNS} FROM adjustments WHERE id = ?"
    )))
    .bind(id)
    .fetch_optional(&get_pool())
    .await
}

/// Adjustments whose effective date falls in `[from, until)`, with optional
/// object / category / applied filters.
pub async fn for_period(
    employee_id: Uuid,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
    object_id: Option<Uuid>,
    category: Option<String>,
    applied: Option<bool>,
) -> Result<Vec<Adjustment>, sqlx::Error> {
    sqlx::query_as::<_, Adjustment>(&sql(&format!(
        r#"
        SELECT {COLUMNS}
        FROM adjustments
        WHERE
            employee_id = ?
            AND effective_at >= ?
            AND effective_at < ?
            AND (CAST(? AS uuid) IS NULL OR object_id = CAST(? AS uuid))
            AND (CAST(? AS varchar) IS NULL OR category = CAST(? AS varchar))
            AND (CAST(? AS boolean) IS NULL OR is_applied = CAST(? AS boolean))
        ORDER BY effective_at
        "#
    )))
    .bind(employee_id)
    .bind(from)
    .bind(until)
    .bind(object_id)
    .bind(object_id)
    .bind(category.clone())
    .bind(category)
    .bind(applied)
    .bind(applied)
    .fetch_all(&get_pool())
    .await
}

/// Unapplied plus orphaned (applied but unlinked) adjustments in the window.
pub async fn unapplied_for_period(
    employee_id: Uuid,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Result<Vec<Adjustment>, sqlx::Error> {
    sqlx::query_as::<_, Adjustment>(&sql(&format!(
        r#"
        SELECT {COLUMNS}
        FROM adjustments
        WHERE
            employee_id = ?
            AND effective_at >= ?
            AND effective_at < ?
            AND (is_applied = FALSE OR linked_entry_id IS NULL)
        ORDER BY effective_at
        "#
    )))
    .bind(employee_id)
    .bind(from)
    .bind(until)
    .fetch_all(&get_pool())
    .await
}

/// Everything still unconsumed before the cutoff instant, unbounded below.
/// Callers pass the end-exclusive bound of the cutoff day; used for final
/// settlement at contract termination.
pub async fn unapplied_until(
    employee_id: Uuid,
    until: DateTime<Utc>,
) -> Result<Vec<Adjustment>, sqlx::Error> {
    sqlx::query_as::<_, Adjustment>(&sql(&format!(
        r#"
        SELECT {COLUMNS}
        FROM adjustments
        WHERE
            employee_id = ?
            AND effective_at < ?
            AND (is_applied = FALSE OR linked_entry_id IS NULL)
        ORDER BY effective_at
        "#
    )))
    .bind(employee_id)
    .bind(until)
    .fetch_all(&get_pool())
    .await
}

/// The reconciliation candidate set: unapplied, orphaned, or already consumed
/// by the given entry. shift_base rows are restricted to the given object so
/// same-window shifts on other objects never cross-contaminate.
pub async fn candidates_for_entry(
    tx: &mut Transaction<'_, Postgres>,
    employee_id: Uuid,
    object_id: Uuid,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
    entry_id: Option<Uuid>,
) -> Result<Vec<Adjustment>, sqlx::Error> {
    sqlx::query_as::<_, Adjustment>(&sql(&format!(
        r#"
        SELECT {COLUMNS}
        FROM adjustments
        WHERE
            employee_id = ?
            AND effective_at >= ?
            AND effective_at < ?
            AND (category != 'shift_base' OR object_id = ?)
            AND (
                is_applied = FALSE
                OR linked_entry_id IS NULL
                OR (CAST(? AS uuid) IS NOT NULL AND linked_entry_id = CAST(? AS uuid))
            )
        ORDER BY effective_at
        "#
    )))
    .bind(employee_id)
    .bind(from)
    .bind(until)
    .bind(object_id)
    .bind(entry_id)
    .bind(entry_id)
    .fetch_all(&mut **tx)
    .await
}

pub async fn mark_applied(
    tx: &mut Transaction<'_, Postgres>,
    adjustment_ids: &[Uuid],
    entry_id: Uuid,
) -> Result<u64, sqlx::Error> {
    if adjustment_ids.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query(&sql(r#"
        UPDATE adjustments
        SET is_applied = TRUE, linked_entry_id = ?, updated_at = ?
        WHERE id = ANY(?)
    "#))
    .bind(entry_id)
    .bind(Utc::now())
    .bind(adjustment_ids)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

/// Apply a manual edit; the caller has already validated the category and
/// built the new edit_history.
pub async fn apply_update(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    amount: bigdecimal::BigDecimal,
    description: Option<String>,
    details: Option<serde_json::Value>,
    edit_history: serde_json::Value,
    actor: Uuid,
) -> Result<Adjustment, sqlx::Error> {
    sqlx::query_as::<_, Adjustment>(&sql(&format!(
        r#"
        UPDATE adjustments
        SET amount = ?, description = ?, details = ?, edit_history = ?,
            updated_by = ?, updated_at = ?
        WHERE id = ?
        RETURNING {COLUMNS}
        "#
    )))
    .bind(amount)
    .bind(description)
    .bind(details)
    .bind(edit_history)
    .bind(actor)
    .bind(Utc::now())
    .bind(id)
    .fetch_one(&mut **tx)
    .await
}

pub async fn delete(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(&sql("DELETE FROM adjustments WHERE id = ?"))
        .bind(id)
        .execute(&mut **tx)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// All adjustments for an employee visible through the given object set.
/// Object-less rows (manual corrections) always belong to the employee view.
pub async fn for_employee_objects(
    employee_id: Uuid,
    object_ids: &[Uuid],
) -> Result<Vec<Adjustment>, sqlx::Error> {
    sqlx::query_as::<_, Adjustment>(&sql(&format!(
        r#"
        SELECT {COLUMNS}
        FROM adjustments
        WHERE
            employee_id = ?
            AND (object_id IS NULL OR object_id = ANY(?))
        ORDER BY effective_at
        "#
    )))
    .bind(employee_id)
    .bind(object_ids)
    .fetch_all(&get_pool())
    .await
}
