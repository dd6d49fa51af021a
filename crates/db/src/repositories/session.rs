use crate::models::{DbSession, DbUser};
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::PgExecutor;
use uuid::Uuid;

pub async fn create_session<'e, E>(
    executor: E,
    user_id: i64,
    expires_at: DateTime<Utc>,
) -> Result<DbSession>
where
    E: PgExecutor<'e>,
{
    let token = Uuid::new_v4();

    let session = sqlx::query_as::<_, DbSession>(
        r#"
        INSERT INTO sessions (token, user_id, expires_at)
        VALUES ($1, $2, $3)
        RETURNING token, user_id, created_at, expires_at
        "#,
    )
    .bind(token)
    .bind(user_id)
    .bind(expires_at)
    .fetch_one(executor)
    .await?;

    Ok(session)
}

/// Returns the user behind an unexpired session token.
pub async fn get_session_user<'e, E>(executor: E, token: Uuid) -> Result<Option<DbUser>>
where
    E: PgExecutor<'e>,
{
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT u.id, u.username, u.password_hash, u.created_at
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = $1 AND s.expires_at > NOW()
        "#,
    )
    .bind(token)
    .fetch_optional(executor)
    .await?;

    Ok(user)
}

pub async fn delete_session<'e, E>(executor: E, token: Uuid) -> Result<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        DELETE FROM sessions
        WHERE token = $1
        "#,
    )
    .bind(token)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn delete_expired_sessions<'e, E>(executor: E) -> Result<u64>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        DELETE FROM sessions
        WHERE expires_at <= NOW()
        "#,
    )
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
