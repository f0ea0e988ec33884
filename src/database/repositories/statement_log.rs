use crate::database::{get_pool, models::StatementLogInput, utils::sql};

/// Write-once audit record of a generated statement. Callers treat failures
/// as non-fatal; the statement read path never depends on this insert.
pub async fn insert(input: StatementLogInput) -> Result<(), sqlx::Error> {
    sqlx::query(&sql(r#"
        INSERT INTO
            statement_log (
                employee_id, requester_id, requester_role, range_start,
                range_end, total_net, total_paid
            )
        VALUES (?, ?, ?, ?, ?, ?, ?)
    "#))
    .bind(input.employee_id)
    .bind(input.requester_id)
    .bind(input.requester_role)
    .bind(input.range_start)
    .bind(input.range_end)
    .bind(input.total_net)
    .bind(input.total_paid)
    .execute(&get_pool())
    .await?;

    Ok(())
}
