use uuid::Uuid;

use crate::database::{get_pool, models::PaymentSchedule, utils::sql};

const COLUMNS: &str = r#"
    id, owner_id, object_id, name, frequency, payment_day, period_config,
    is_custom, is_active, created_at, updated_at
"#;

pub async fn get(id: Uuid) -> Result<Option<PaymentSchedule>, sqlx::Error> {
    sqlx::query_as::<_, PaymentSchedule>(&sql(&format!(
        "SELECT {COLUMNS} FROM payment_schedules WHERE id = ?"
    )))
    .bind(id)
    .fetch_optional(&get_pool())
    .await
}

pub async fn get_many(ids: &[Uuid]) -> Result<Vec<PaymentSchedule>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, PaymentSchedule>(&sql(&format!(
        "SELECT {COLUMNS} FROM payment_schedules WHERE id = ANY(?)"
    )))
    .bind(ids)
    .fetch_all(&get_pool())
    .await
}

/// Active schedules, optionally restricted to one owner (system-wide
/// defaults have no owner and are always included).
pub async fn list_active(owner_id: Option<Uuid>) -> Result<Vec<PaymentSchedule>, sqlx::Error> {
    sqlx::query_as::<_, PaymentSchedule>(&sql(&format!(
        r#"
        SELECT {COLUMNS}
        FROM payment_schedules
        WHERE
            is_active = TRUE
            AND (CAST(? AS uuid) IS NULL OR owner_id IS NULL OR owner_id = CAST(? AS uuid))
        ORDER BY created_at
        "#
    )))
    .bind(owner_id)
    .bind(owner_id)
    .fetch_all(&get_pool())
    .await
}
