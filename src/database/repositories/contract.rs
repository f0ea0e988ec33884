use uuid::Uuid;

use crate::database::{get_pool, models::Contract, utils::sql};

const COLUMNS: &str = r#"
    id, employee_id, owner_id, allowed_object_ids, status, settlement_policy,
    termination_date, payment_schedule_id, inherit_payment_schedule,
    created_at, updated_at
"#;

pub async fn get(id: Uuid) -> Result<Option<Contract>, sqlx::Error> {
    sqlx::query_as::<_, Contract>(&sql(&format!(
        "SELECT {COLUMNS} FROM contracts WHERE id = ?"
    )))
    .bind(id)
    .fetch_optional(&get_pool())
    .await
}

pub async fn list_for_employee(
    employee_id: Uuid,
    owner_id: Option<Uuid>,
) -> Result<Vec<Contract>, sqlx::Error> {
    sqlx::query_as::<_, Contract>(&sql(&format!(
        r#"
        SELECT {COLUMNS}
        FROM contracts
        WHERE
            employee_id = ?
            AND (CAST(? AS uuid) IS NULL OR owner_id = CAST(? AS uuid))
        ORDER BY created_at
        "#
    )))
    .bind(employee_id)
    .bind(owner_id)
    .bind(owner_id)
    .fetch_all(&get_pool())
    .await
}

/// Contracts whose allowed-objects set covers the given object. Terminated
/// contracts are included; the generation gate decides settleability.
pub async fn list_covering_object(object_id: Uuid) -> Result<Vec<Contract>, sqlx::Error> {
    sqlx::query_as::<_, Contract>(&sql(&format!(
        r#"
        SELECT {COLUMNS}
        FROM contracts
        WHERE allowed_object_ids @> ARRAY[?]::uuid[]
        ORDER BY created_at
        "#
    )))
    .bind(object_id)
    .fetch_all(&get_pool())
    .await
}

/// Contracts with an individually assigned, non-inherited schedule; the
/// batch trigger reconciles these in a second pass.
pub async fn list_individually_scheduled(
    owner_id: Option<Uuid>,
) -> Result<Vec<Contract>, sqlx::Error> {
    sqlx::query_as::<_, Contract>(&sql(&format!(
        r#"
        SELECT {COLUMNS}
        FROM contracts
        WHERE
            inherit_payment_schedule = FALSE
            AND payment_schedule_id IS NOT NULL
            AND (CAST(? AS uuid) IS NULL OR owner_id = CAST(? AS uuid))
        ORDER BY created_at
        "#
    )))
    .bind(owner_id)
    .bind(owner_id)
    .fetch_all(&get_pool())
    .await
}
