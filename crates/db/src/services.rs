//! Services wrap repository calls in transactions, translate storage
//! failures into domain errors, and refuse calls without a principal.

pub mod allocation;
pub mod session;
pub mod slot;
pub mod unit;

use sqlx::{Postgres, Transaction};
use unitsched_core::errors::{SchedError, SchedResult};

use crate::{
    errors::{classify, StoreFailure},
    DbPool,
};

/// Maps a repository error to a domain error, treating lost serialization
/// races as retryable conflicts.
pub(crate) fn store_error(report: eyre::Report) -> SchedError {
    match classify(&report) {
        StoreFailure::Retryable => SchedError::TransientConflict,
        _ => SchedError::Database(report),
    }
}

pub(crate) async fn begin(pool: &DbPool) -> SchedResult<Transaction<'static, Postgres>> {
    pool.begin().await.map_err(|e| store_error(e.into()))
}

/// Opens a transaction in which a check followed by a write cannot interleave
/// with another transaction doing the same.
pub(crate) async fn begin_serializable(pool: &DbPool) -> SchedResult<Transaction<'static, Postgres>> {
    let mut tx = begin(pool).await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
        .execute(&mut *tx)
        .await
        .map_err(|e| store_error(e.into()))?;
    Ok(tx)
}

pub(crate) async fn commit(tx: Transaction<'static, Postgres>) -> SchedResult<()> {
    tx.commit().await.map_err(|e| store_error(e.into()))
}
