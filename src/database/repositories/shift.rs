use uuid::Uuid;

use crate::database::{get_pool, models::Shift, utils::sql};

pub async fn get(id: Uuid) -> Result<Option<Shift>, sqlx::Error> {
    sqlx::query_as::<_, Shift>(&sql(r#"
        SELECT id, employee_id, object_id, start_time, end_time, hours, created_at
        FROM shifts
        WHERE id = ?
    "#))
    .bind(id)
    .fetch_optional(&get_pool())
    .await
}
