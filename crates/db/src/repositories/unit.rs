use crate::models::DbUnit;
use eyre::Result;
use sqlx::PgExecutor;

/// Lists units ordered by code. `search` is a literal, case-insensitive
/// substring of code or name; `%` and `_` match only themselves.
pub async fn list_units<'e, E>(executor: E, search: Option<&str>) -> Result<Vec<DbUnit>>
where
    E: PgExecutor<'e>,
{
    let units = sqlx::query_as::<_, DbUnit>(
        r#"
        SELECT id, code, name, capacity
        FROM units
        WHERE $1::TEXT IS NULL
           OR strpos(lower(code), lower($1)) > 0
           OR strpos(lower(name), lower($1)) > 0
        ORDER BY code ASC
        "#,
    )
    .bind(search)
    .fetch_all(executor)
    .await?;

    Ok(units)
}

pub async fn get_unit_by_id<'e, E>(executor: E, id: i64) -> Result<Option<DbUnit>>
where
    E: PgExecutor<'e>,
{
    let unit = sqlx::query_as::<_, DbUnit>(
        r#"
        SELECT id, code, name, capacity
        FROM units
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(unit)
}

pub async fn create_unit<'e, E>(executor: E, code: &str, name: &str, capacity: i32) -> Result<DbUnit>
where
    E: PgExecutor<'e>,
{
    tracing::debug!("Creating unit: code={}, capacity={}", code, capacity);

    let unit = sqlx::query_as::<_, DbUnit>(
        r#"
        INSERT INTO units (code, name, capacity)
        VALUES ($1, $2, $3)
        RETURNING id, code, name, capacity
        "#,
    )
    .bind(code)
    .bind(name)
    .bind(capacity)
    .fetch_one(executor)
    .await?;

    Ok(unit)
}

pub async fn update_unit<'e, E>(
    executor: E,
    id: i64,
    code: &str,
    name: &str,
    capacity: i32,
) -> Result<Option<DbUnit>>
where
    E: PgExecutor<'e>,
{
    let unit = sqlx::query_as::<_, DbUnit>(
        r#"
        UPDATE units
        SET code = $2, name = $3, capacity = $4
        WHERE id = $1
        RETURNING id, code, name, capacity
        "#,
    )
    .bind(id)
    .bind(code)
    .bind(name)
    .bind(capacity)
    .fetch_optional(executor)
    .await?;

    Ok(unit)
}

/// Deletes a unit and, through the foreign key, its allocations.
/// Returns `false` if no unit had this id.
pub async fn delete_unit<'e, E>(executor: E, id: i64) -> Result<bool>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        DELETE FROM units
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
