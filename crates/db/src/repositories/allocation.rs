use crate::models::{DbAllocation, DbAllocationDetail};
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::PgExecutor;

const DETAIL_SELECT: &str = r#"
    SELECT a.id, a.created_at,
           u.id AS unit_id, u.code AS unit_code, u.name AS unit_name, u.capacity AS unit_capacity,
           s.id AS slot_id, s.day AS slot_day, s.start_time AS slot_start_time, s.end_time AS slot_end_time
    FROM allocations a
    JOIN units u ON u.id = a.unit_id
    JOIN slots s ON s.id = a.slot_id
"#;

/// Finds an allocation occupying `slot_id`, skipping the allocation `exclude`.
pub async fn find_allocation_by_slot<'e, E>(
    executor: E,
    slot_id: i64,
    exclude: Option<i64>,
) -> Result<Option<i64>>
where
    E: PgExecutor<'e>,
{
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT id
        FROM allocations
        WHERE slot_id = $1
          AND ($2::BIGINT IS NULL OR id <> $2)
        LIMIT 1
        "#,
    )
    .bind(slot_id)
    .bind(exclude)
    .fetch_optional(executor)
    .await?;

    Ok(id)
}

pub async fn get_allocation_by_id<'e, E>(executor: E, id: i64) -> Result<Option<DbAllocation>>
where
    E: PgExecutor<'e>,
{
    let allocation = sqlx::query_as::<_, DbAllocation>(
        r#"
        SELECT id, unit_id, slot_id, created_at
        FROM allocations
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(allocation)
}

pub async fn insert_allocation<'e, E>(
    executor: E,
    unit_id: i64,
    slot_id: i64,
    created_at: DateTime<Utc>,
) -> Result<DbAllocation>
where
    E: PgExecutor<'e>,
{
    let allocation = sqlx::query_as::<_, DbAllocation>(
        r#"
        INSERT INTO allocations (unit_id, slot_id, created_at)
        VALUES ($1, $2, $3)
        RETURNING id, unit_id, slot_id, created_at
        "#,
    )
    .bind(unit_id)
    .bind(slot_id)
    .bind(created_at)
    .fetch_one(executor)
    .await?;

    Ok(allocation)
}

/// Rewrites the unit and slot references; `created_at` is never touched.
pub async fn update_allocation<'e, E>(
    executor: E,
    id: i64,
    unit_id: i64,
    slot_id: i64,
) -> Result<Option<DbAllocation>>
where
    E: PgExecutor<'e>,
{
    let allocation = sqlx::query_as::<_, DbAllocation>(
        r#"
        UPDATE allocations
        SET unit_id = $2, slot_id = $3
        WHERE id = $1
        RETURNING id, unit_id, slot_id, created_at
        "#,
    )
    .bind(id)
    .bind(unit_id)
    .bind(slot_id)
    .fetch_optional(executor)
    .await?;

    Ok(allocation)
}

pub async fn delete_allocation<'e, E>(executor: E, id: i64) -> Result<bool>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        DELETE FROM allocations
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn get_allocation_detail<'e, E>(
    executor: E,
    id: i64,
) -> Result<Option<DbAllocationDetail>>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{DETAIL_SELECT} WHERE a.id = $1");
    let detail = sqlx::query_as::<_, DbAllocationDetail>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(detail)
}

/// Lists every allocation with its unit and slot, newest first.
pub async fn list_allocation_details<'e, E>(executor: E) -> Result<Vec<DbAllocationDetail>>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{DETAIL_SELECT} ORDER BY a.created_at DESC, a.id DESC");
    let details = sqlx::query_as::<_, DbAllocationDetail>(&sql)
        .fetch_all(executor)
        .await?;

    Ok(details)
}
