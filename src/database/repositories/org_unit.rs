use uuid::Uuid;

use crate::database::{get_pool, models::OrgStructureUnit, utils::sql};

const COLUMNS: &str = r#"
    id, owner_id, parent_id, name, level, payment_system_id,
    inherit_payment_system, payment_schedule_id, inherit_payment_schedule,
    lateness_threshold_minutes, lateness_penalty_per_minute,
    inherit_lateness_policy, short_notice_hours, short_notice_fine,
    invalid_reason_fine, inherit_cancellation_policy, is_active,
    created_at, updated_at
"#;

/// Batch-load whole owner subtrees; the inheritance resolver walks them in
/// memory instead of fetching ancestors one by one.
pub async fn list_for_owners(owner_ids: &[Uuid]) -> Result<Vec<OrgStructureUnit>, sqlx::Error> {
    if owner_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, OrgStructureUnit>(&sql(&format!(
        r#"
        SELECT {COLUMNS}
        FROM org_units
        WHERE owner_id = ANY(?) AND is_active = TRUE
        ORDER BY level, created_at
        "#
    )))
    .bind(owner_ids)
    .fetch_all(&get_pool())
    .await
}

pub async fn list_active(owner_id: Option<Uuid>) -> Result<Vec<OrgStructureUnit>, sqlx::Error> {
    sqlx::query_as::<_, OrgStructureUnit>(&sql(&format!(
        r#"
        SELECT {COLUMNS}
        FROM org_units
        WHERE
            is_active = TRUE
            AND (CAST(? AS uuid) IS NULL OR owner_id = CAST(? AS uuid))
        ORDER BY level, created_at
        "#
    )))
    .bind(owner_id)
    .bind(owner_id)
    .fetch_all(&get_pool())
    .await
}
