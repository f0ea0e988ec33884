use uuid::Uuid;

use crate::database::{get_pool, models::EmployeePayment, utils::sql};

/// Payments recorded against the given entries. Read-only to the engine.
pub async fn list_for_entries(entry_ids: &[Uuid]) -> Result<Vec<EmployeePayment>, sqlx::Error> {
    if entry_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, EmployeePayment>(&sql(r#"
        SELECT id, payroll_entry_id, employee_id, amount, payment_date,
               payment_method, status, created_at
        FROM employee_payments
        WHERE payroll_entry_id = ANY(?)
        ORDER BY payment_date, created_at
    "#))
    .bind(entry_ids)
    .fetch_all(&get_pool())
    .await
}
