use crate::models::DbSlot;
use chrono::NaiveTime;
use eyre::Result;
use sqlx::PgExecutor;

pub async fn list_slots<'e, E>(executor: E, day: Option<&str>) -> Result<Vec<DbSlot>>
where
    E: PgExecutor<'e>,
{
    let slots = sqlx::query_as::<_, DbSlot>(
        r#"
        SELECT id, day, start_time, end_time
        FROM slots
        WHERE $1::TEXT IS NULL OR day = $1
        ORDER BY
            array_position(ARRAY['Mon', 'Tue', 'Wed', 'Thu', 'Fri', 'Sat', 'Sun']::VARCHAR[], day),
            start_time ASC,
            id ASC
        "#,
    )
    .bind(day)
    .fetch_all(executor)
    .await?;

    Ok(slots)
}

pub async fn get_slot_by_id<'e, E>(executor: E, id: i64) -> Result<Option<DbSlot>>
where
    E: PgExecutor<'e>,
{
    let slot = sqlx::query_as::<_, DbSlot>(
        r#"
        SELECT id, day, start_time, end_time
        FROM slots
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(slot)
}

pub async fn create_slot<'e, E>(
    executor: E,
    day: &str,
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> Result<DbSlot>
where
    E: PgExecutor<'e>,
{
    tracing::debug!("Creating slot: day={}, start={}, end={}", day, start_time, end_time);

    let slot = sqlx::query_as::<_, DbSlot>(
        r#"
        INSERT INTO slots (day, start_time, end_time)
        VALUES ($1, $2, $3)
        RETURNING id, day, start_time, end_time
        "#,
    )
    .bind(day)
    .bind(start_time)
    .bind(end_time)
    .fetch_one(executor)
    .await?;

    Ok(slot)
}

pub async fn update_slot<'e, E>(
    executor: E,
    id: i64,
    day: &str,
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> Result<Option<DbSlot>>
where
    E: PgExecutor<'e>,
{
    let slot = sqlx::query_as::<_, DbSlot>(
        r#"
        UPDATE slots
        SET day = $2, start_time = $3, end_time = $4
        WHERE id = $1
        RETURNING id, day, start_time, end_time
        "#,
    )
    .bind(id)
    .bind(day)
    .bind(start_time)
    .bind(end_time)
    .fetch_optional(executor)
    .await?;

    Ok(slot)
}

/// Deletes a slot and, through the foreign key, the allocation on it.
pub async fn delete_slot<'e, E>(executor: E, id: i64) -> Result<bool>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        DELETE FROM slots
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
