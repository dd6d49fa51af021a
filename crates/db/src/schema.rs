use eyre::Result;
use sqlx::{PgConnection, Pool, Postgres};
use tracing::info;

/// Unique constraint backing the one-allocation-per-slot rule.
pub const ALLOCATION_SLOT_UNIQUE: &str = "allocations_slot_id_key";
pub const ALLOCATION_UNIT_FK: &str = "allocations_unit_id_fkey";
pub const ALLOCATION_SLOT_FK: &str = "allocations_slot_id_fkey";
pub const UNIT_CODE_UNIQUE: &str = "units_code_key";
pub const SLOT_WINDOW_UNIQUE: &str = "slots_day_start_time_end_time_key";
pub const USER_USERNAME_UNIQUE: &str = "users_username_key";

/// Advisory lock key serializing concurrent schema initialization.
const SCHEMA_LOCK_KEY: i64 = 0x756e_6974_7363;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Concurrent `CREATE ... IF NOT EXISTS` can still collide in the catalog
    let mut conn = pool.acquire().await?;
    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *conn)
        .await?;

    let result = create_tables(&mut *conn).await;

    sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *conn)
        .await?;
    result?;

    info!("Database schema initialized successfully.");
    Ok(())
}

async fn create_tables(conn: &mut PgConnection) -> Result<()> {

    // Create users table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            username VARCHAR(150) NOT NULL,
            password_hash VARCHAR(255) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT users_username_key UNIQUE (username)
        );
        "#,
    )
    .execute(&mut *conn)
    .await?;

    // Create sessions table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token UUID PRIMARY KEY,
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            expires_at TIMESTAMP WITH TIME ZONE NOT NULL
        );
        "#,
    )
    .execute(&mut *conn)
    .await?;

    // Create units table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS units (
            id BIGSERIAL PRIMARY KEY,
            code VARCHAR(20) NOT NULL,
            name VARCHAR(200) NOT NULL,
            capacity INTEGER NOT NULL DEFAULT 0,
            CONSTRAINT units_code_key UNIQUE (code),
            CONSTRAINT units_capacity_check CHECK (capacity >= 0)
        );
        "#,
    )
    .execute(&mut *conn)
    .await?;

    // Create slots table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS slots (
            id BIGSERIAL PRIMARY KEY,
            day VARCHAR(3) NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            CONSTRAINT slots_day_start_time_end_time_key UNIQUE (day, start_time, end_time),
            CONSTRAINT slots_day_check CHECK (day IN ('Mon', 'Tue', 'Wed', 'Thu', 'Fri', 'Sat', 'Sun')),
            CONSTRAINT slots_valid_time_range CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(&mut *conn)
    .await?;

    // Create allocations table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS allocations (
            id BIGSERIAL PRIMARY KEY,
            unit_id BIGINT NOT NULL,
            slot_id BIGINT NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT allocations_unit_id_fkey FOREIGN KEY (unit_id)
                REFERENCES units(id) ON DELETE CASCADE,
            CONSTRAINT allocations_slot_id_fkey FOREIGN KEY (slot_id)
                REFERENCES slots(id) ON DELETE CASCADE,
            CONSTRAINT allocations_slot_id_key UNIQUE (slot_id)
        );
        "#,
    )
    .execute(&mut *conn)
    .await?;

    // Create indexes
    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_allocations_unit_id ON allocations(unit_id)",
        "CREATE INDEX IF NOT EXISTS idx_allocations_created_at ON allocations(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at)",
    ] {
        sqlx::query(statement).execute(&mut *conn).await?;
    }

    Ok(())
}
