use uuid::Uuid;

use crate::database::{get_pool, models::WorkObject, utils::sql};

const COLUMNS: &str = r#"
    id, owner_id, org_unit_id, name, payment_schedule_id, payment_system_id,
    hourly_rate, is_active, created_at, updated_at
"#;

pub async fn get(id: Uuid) -> Result<Option<WorkObject>, sqlx::Error> {
    sqlx::query_as::<_, WorkObject>(&sql(&format!(
        "SELECT {COLUMNS} FROM objects WHERE id = ?"
    )))
    .bind(id)
    .fetch_optional(&get_pool())
    .await
}

pub async fn list_by_ids(ids: &[Uuid]) -> Result<Vec<WorkObject>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, WorkObject>(&sql(&format!(
        "SELECT {COLUMNS} FROM objects WHERE id = ANY(?) ORDER BY created_at"
    )))
    .bind(ids)
    .fetch_all(&get_pool())
    .await
}

pub async fn list_active(owner_id: Option<Uuid>) -> Result<Vec<WorkObject>, sqlx::Error> {
    sqlx::query_as::<_, WorkObject>(&sql(&format!(
        r#"
        SELECT {COLUMNS}
        FROM objects
        WHERE
            is_active = TRUE
            AND (CAST(? AS uuid) IS NULL OR owner_id = CAST(? AS uuid))
        ORDER BY created_at
        "#
    )))
    .bind(owner_id)
    .bind(owner_id)
    .fetch_all(&get_pool())
    .await
}
