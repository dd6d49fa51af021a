use crate::models::DbUser;
use argon2::{Argon2, PasswordVerifier};
use eyre::{eyre, Result};
use sqlx::PgExecutor;

pub async fn create_user<'e, E>(executor: E, username: &str, password_hash: &str) -> Result<DbUser>
where
    E: PgExecutor<'e>,
{
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        INSERT INTO users (username, password_hash)
        VALUES ($1, $2)
        RETURNING id, username, password_hash, created_at
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .fetch_one(executor)
    .await?;

    Ok(user)
}

pub async fn get_user_by_username<'e, E>(executor: E, username: &str) -> Result<Option<DbUser>>
where
    E: PgExecutor<'e>,
{
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, username, password_hash, created_at
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(executor)
    .await?;

    Ok(user)
}

/// Checks `password` against the user's stored argon2 hash.
pub fn verify_password(user: &DbUser, password: &str) -> Result<bool> {
    let parsed_hash = argon2::PasswordHash::new(&user.password_hash)
        .map_err(|e| eyre!("Invalid password hash for user {}: {}", user.id, e))?;
    let is_valid = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();
    Ok(is_valid)
}
