use uuid::Uuid;

use crate::database::{get_pool, models::Employee, utils::sql};

pub async fn get(id: Uuid) -> Result<Option<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>(&sql(r#"
        SELECT id, full_name, is_active, created_at, updated_at
        FROM employees
        WHERE id = ?
    "#))
    .bind(id)
    .fetch_optional(&get_pool())
    .await
}
