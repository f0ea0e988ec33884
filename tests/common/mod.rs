use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use payroll_be::database::set_pool;

/// Connect to the test database named by TEST_DATABASE_URL, run migrations
/// and wipe engine tables. Returns None (test skips) when the variable is
/// unset, so the suite passes on machines without Postgres.
pub async fn try_setup() -> Option<PgPool> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    sqlx::query(
        r#"
        TRUNCATE statement_log, employee_payments, adjustments, payroll_entries,
                 shifts, contracts, objects, payment_schedules, org_units, employees
        CASCADE
        "#,
    )
    .execute(&pool)
    .await
    .expect("Failed to truncate test tables");

    set_pool(pool.clone());

    Some(pool)
}

pub async fn seed_employee(pool: &PgPool) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO employees (full_name) VALUES ('Test Employee') RETURNING id",
    )
    .fetch_one(pool)
    .await
    .expect("Failed to seed employee")
}

pub async fn seed_object(pool: &PgPool, owner_id: Uuid) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO objects (owner_id, name) VALUES ($1, 'Test Object') RETURNING id",
    )
    .bind(owner_id)
    .fetch_one(pool)
    .await
    .expect("Failed to seed object")
}

pub async fn seed_contract(pool: &PgPool, employee_id: Uuid, owner_id: Uuid, object_id: Uuid) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO contracts (employee_id, owner_id, allowed_object_ids)
        VALUES ($1, $2, ARRAY[$3]::uuid[])
        RETURNING id
        "#,
    )
    .bind(employee_id)
    .bind(owner_id)
    .bind(object_id)
    .fetch_one(pool)
    .await
    .expect("Failed to seed contract")
}

pub async fn seed_schedule(
    pool: &PgPool,
    owner_id: Option<Uuid>,
    frequency: &str,
    payment_day: i32,
    period_config: serde_json::Value,
) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO payment_schedules (owner_id, name, frequency, payment_day, period_config)
        VALUES ($1, 'Test Schedule', $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(owner_id)
    .bind(frequency)
    .bind(payment_day)
    .bind(period_config)
    .fetch_one(pool)
    .await
    .expect("Failed to seed schedule")
}

pub async fn attach_schedule_to_object(pool: &PgPool, object_id: Uuid, schedule_id: Uuid) {
    sqlx::query("UPDATE objects SET payment_schedule_id = $1 WHERE id = $2")
        .bind(schedule_id)
        .bind(object_id)
        .execute(pool)
        .await
        .expect("Failed to attach schedule to object");
}

pub async fn seed_payment(
    pool: &PgPool,
    entry_id: Uuid,
    employee_id: Uuid,
    amount: i64,
    status: &str,
) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO
            employee_payments (payroll_entry_id, employee_id, amount, payment_date,
                               payment_method, status)
        VALUES ($1, $2, $3, CURRENT_DATE, 'transfer', $4)
        RETURNING id
        "#,
    )
    .bind(entry_id)
    .bind(employee_id)
    .bind(BigDecimal::from(amount))
    .bind(status)
    .fetch_one(pool)
    .await
    .expect("Failed to seed payment")
}

#[allow(clippy::too_many_arguments)]
pub async fn seed_adjustment(
    pool: &PgPool,
    employee_id: Uuid,
    object_id: Option<Uuid>,
    category: &str,
    amount: i64,
    hours: Option<f64>,
    effective_at: DateTime<Utc>,
) -> Uuid {
    let details = hours.map(|h| serde_json::json!({ "hours": h }));

    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO adjustments
            (employee_id, object_id, category, amount, details, effective_at, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(employee_id)
    .bind(object_id)
    .bind(category)
    .bind(BigDecimal::from(amount))
    .bind(details)
    .bind(effective_at)
    .bind(Uuid::new_v4())
    .fetch_one(pool)
    .await
    .expect("Failed to seed adjustment")
}
