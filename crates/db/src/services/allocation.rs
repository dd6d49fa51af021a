//! # Allocation Service
//!
//! Create and update run the clash check and the write inside one
//! `SERIALIZABLE` transaction. The `allocations_slot_id_key` unique
//! constraint backs the check: if two transactions race for the same slot,
//! the loser either sees the winner's row on retry or trips the constraint,
//! and both outcomes are reported as [`SchedError::SlotAlreadyAllocated`].
//!
//! Serialization failures roll the transaction back and the whole unit of
//! work runs again, up to `max_retries` times, before surfacing
//! [`SchedError::TransientConflict`].

use std::future::Future;

use async_trait::async_trait;
use chrono::Utc;
use eyre::eyre;
use sqlx::PgConnection;
use tracing::{debug, info, warn};
use unitsched_core::{
    clash::{self, AllocationLookup},
    errors::{EntityKind, SchedError, SchedResult},
    models::allocation::{Allocation, CreateAllocationRequest, UpdateAllocationRequest},
    principal::{self, Principal},
};

use super::{begin_serializable, commit, store_error};
use crate::{
    errors::classify,
    repositories::{allocation as allocation_repo, slot as slot_repo, unit as unit_repo},
    schema::{ALLOCATION_SLOT_FK, ALLOCATION_SLOT_UNIQUE, ALLOCATION_UNIT_FK},
    DbPool,
};

pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Clash lookups against an open connection, normally a transaction.
pub struct PgAllocationLookup<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgAllocationLookup<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<'c> AllocationLookup for PgAllocationLookup<'c> {
    async fn find_allocation_by_slot(
        &mut self,
        slot_id: i64,
        exclude: Option<i64>,
    ) -> SchedResult<Option<i64>> {
        allocation_repo::find_allocation_by_slot(&mut *self.conn, slot_id, exclude)
            .await
            .map_err(store_error)
    }
}

/// Translates a failed write on `allocations`, attributing constraint
/// violations to the unit or slot the write referenced.
fn write_error(report: eyre::Report, unit_id: i64, slot_id: i64) -> SchedError {
    let failure = classify(&report);
    if failure.is_unique(ALLOCATION_SLOT_UNIQUE) {
        SchedError::SlotAlreadyAllocated { slot_id }
    } else if failure.is_foreign_key(ALLOCATION_UNIT_FK) {
        SchedError::not_found(EntityKind::Unit, unit_id)
    } else if failure.is_foreign_key(ALLOCATION_SLOT_FK) {
        SchedError::not_found(EntityKind::Slot, slot_id)
    } else {
        store_error(report)
    }
}

#[derive(Clone)]
pub struct AllocationService {
    pool: DbPool,
    max_retries: u32,
}

impl AllocationService {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Sets how many times a serialization conflict is retried; 0 reports
    /// the first conflict.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub async fn list(&self, principal: Option<&Principal>) -> SchedResult<Vec<Allocation>> {
        principal::require(principal)?;

        allocation_repo::list_allocation_details(&self.pool)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(Allocation::try_from)
            .collect()
    }

    pub async fn get(&self, principal: Option<&Principal>, id: i64) -> SchedResult<Allocation> {
        principal::require(principal)?;

        allocation_repo::get_allocation_detail(&self.pool, id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| SchedError::not_found(EntityKind::Allocation, id))?
            .try_into()
    }

    pub async fn create(
        &self,
        principal: Option<&Principal>,
        request: CreateAllocationRequest,
    ) -> SchedResult<Allocation> {
        let principal = principal::require(principal)?;
        let CreateAllocationRequest { unit_id, slot_id } = request;

        let allocation = self
            .retrying(|| self.try_create(unit_id, slot_id))
            .await?;

        info!(
            "Allocation {} created: unit={} slot={} by {}",
            allocation.id, unit_id, slot_id, principal.username
        );
        Ok(allocation)
    }

    pub async fn update(
        &self,
        principal: Option<&Principal>,
        id: i64,
        request: UpdateAllocationRequest,
    ) -> SchedResult<Allocation> {
        let principal = principal::require(principal)?;

        let allocation = self.retrying(|| self.try_update(id, &request)).await?;

        info!(
            "Allocation {} updated: unit={} slot={} by {}",
            id, allocation.unit.id, allocation.slot.id, principal.username
        );
        Ok(allocation)
    }

    pub async fn delete(&self, principal: Option<&Principal>, id: i64) -> SchedResult<()> {
        let principal = principal::require(principal)?;

        let deleted = allocation_repo::delete_allocation(&self.pool, id)
            .await
            .map_err(store_error)?;
        if !deleted {
            return Err(SchedError::not_found(EntityKind::Allocation, id));
        }

        info!("Allocation {} deleted by {}", id, principal.username);
        Ok(())
    }

    /// Runs `attempt` until it succeeds, fails for a reason other than a
    /// serialization conflict, or exhausts the retry budget.
    async fn retrying<T, F, Fut>(&self, mut attempt: F) -> SchedResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = SchedResult<T>>,
    {
        let mut retries = 0;
        loop {
            match attempt().await {
                Err(SchedError::TransientConflict) if retries < self.max_retries => {
                    retries += 1;
                    debug!("Serialization conflict, retrying ({}/{})", retries, self.max_retries);
                }
                Err(SchedError::TransientConflict) => {
                    warn!("Giving up after {} serialization conflicts", retries);
                    return Err(SchedError::TransientConflict);
                }
                result => return result,
            }
        }
    }

    async fn try_create(&self, unit_id: i64, slot_id: i64) -> SchedResult<Allocation> {
        let fail = move |report: eyre::Report| write_error(report, unit_id, slot_id);
        // Dropping `tx` on any early return rolls the transaction back.
        let mut tx = begin_serializable(&self.pool).await?;

        unit_repo::get_unit_by_id(&mut *tx, unit_id)
            .await
            .map_err(fail)?
            .ok_or_else(|| SchedError::not_found(EntityKind::Unit, unit_id))?;
        slot_repo::get_slot_by_id(&mut *tx, slot_id)
            .await
            .map_err(fail)?
            .ok_or_else(|| SchedError::not_found(EntityKind::Slot, slot_id))?;

        clash::validate(&mut PgAllocationLookup::new(&mut tx), slot_id, None).await?;

        let row = allocation_repo::insert_allocation(&mut *tx, unit_id, slot_id, Utc::now())
            .await
            .map_err(fail)?;
        let detail = allocation_repo::get_allocation_detail(&mut *tx, row.id)
            .await
            .map_err(fail)?
            .ok_or_else(|| SchedError::Database(eyre!("Allocation {} missing after insert", row.id)))?;

        commit(tx).await.map_err(|err| match err {
            SchedError::Database(report) => fail(report),
            other => other,
        })?;

        detail.try_into()
    }

    async fn try_update(&self, id: i64, request: &UpdateAllocationRequest) -> SchedResult<Allocation> {
        let mut tx = begin_serializable(&self.pool).await?;

        let current = allocation_repo::get_allocation_by_id(&mut *tx, id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| SchedError::not_found(EntityKind::Allocation, id))?;

        let unit_id = request.unit_id.unwrap_or(current.unit_id);
        let slot_id = request.slot_id.unwrap_or(current.slot_id);
        let fail = move |report: eyre::Report| write_error(report, unit_id, slot_id);

        if request.unit_id.is_some() {
            unit_repo::get_unit_by_id(&mut *tx, unit_id)
                .await
                .map_err(fail)?
                .ok_or_else(|| SchedError::not_found(EntityKind::Unit, unit_id))?;
        }

        // Only a supplied slot is re-checked; the unit carries no clash rule.
        if request.slot_id.is_some() {
            slot_repo::get_slot_by_id(&mut *tx, slot_id)
                .await
                .map_err(fail)?
                .ok_or_else(|| SchedError::not_found(EntityKind::Slot, slot_id))?;
            clash::validate(&mut PgAllocationLookup::new(&mut tx), slot_id, Some(id)).await?;
        }

        allocation_repo::update_allocation(&mut *tx, id, unit_id, slot_id)
            .await
            .map_err(fail)?
            .ok_or_else(|| SchedError::not_found(EntityKind::Allocation, id))?;
        let detail = allocation_repo::get_allocation_detail(&mut *tx, id)
            .await
            .map_err(fail)?
            .ok_or_else(|| SchedError::not_found(EntityKind::Allocation, id))?;

        commit(tx).await.map_err(|err| match err {
            SchedError::Database(report) => fail(report),
            other => other,
        })?;

        detail.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_error_passes_through_unclassified_failures() {
        let err = write_error(eyre!("socket closed"), 1, 2);
        assert!(matches!(err, SchedError::Database(_)));
    }
}
