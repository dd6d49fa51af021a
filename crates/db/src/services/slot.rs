use tracing::info;
use unitsched_core::{
    errors::{EntityKind, SchedError, SchedResult},
    models::slot::{CreateSlotRequest, Slot, SlotQuery, SlotWindow, UpdateSlotRequest},
    principal::{self, Principal},
};

use super::{begin, commit, store_error};
use crate::{
    errors::classify, repositories::slot as slot_repo, schema::SLOT_WINDOW_UNIQUE, DbPool,
};

fn write_error(report: eyre::Report) -> SchedError {
    if classify(&report).is_unique(SLOT_WINDOW_UNIQUE) {
        SchedError::duplicate(
            "non_field_errors",
            "The fields day, start_time, end_time must make a unique set.",
        )
    } else {
        store_error(report)
    }
}

#[derive(Clone)]
pub struct SlotService {
    pool: DbPool,
}

impl SlotService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Lists slots in week order, optionally restricted to one day.
    pub async fn list(&self, principal: Option<&Principal>, query: &SlotQuery) -> SchedResult<Vec<Slot>> {
        principal::require(principal)?;

        slot_repo::list_slots(&self.pool, query.day.as_ref().map(|d| d.as_str()))
            .await
            .map_err(store_error)?
            .into_iter()
            .map(Slot::try_from)
            .collect()
    }

    pub async fn get(&self, principal: Option<&Principal>, id: i64) -> SchedResult<Slot> {
        principal::require(principal)?;

        slot_repo::get_slot_by_id(&self.pool, id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| SchedError::not_found(EntityKind::Slot, id))?
            .try_into()
    }

    pub async fn create(&self, principal: Option<&Principal>, request: CreateSlotRequest) -> SchedResult<Slot> {
        let principal = principal::require(principal)?;
        let SlotWindow {
            day,
            start_time,
            end_time,
        } = request.validate()?;

        let slot: Slot = slot_repo::create_slot(&self.pool, day.as_str(), start_time, end_time)
            .await
            .map_err(write_error)?
            .try_into()?;

        info!("Slot {} ({}) created by {}", slot.id, slot, principal.username);
        Ok(slot)
    }

    pub async fn update(
        &self,
        principal: Option<&Principal>,
        id: i64,
        request: UpdateSlotRequest,
    ) -> SchedResult<Slot> {
        let principal = principal::require(principal)?;
        let mut tx = begin(&self.pool).await?;

        let current: Slot = slot_repo::get_slot_by_id(&mut *tx, id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| SchedError::not_found(EntityKind::Slot, id))?
            .try_into()?;
        let window = request.apply(&current)?;

        let slot: Slot = slot_repo::update_slot(
            &mut *tx,
            id,
            window.day.as_str(),
            window.start_time,
            window.end_time,
        )
        .await
        .map_err(write_error)?
        .ok_or_else(|| SchedError::not_found(EntityKind::Slot, id))?
        .try_into()?;
        commit(tx).await?;

        info!("Slot {} updated to {} by {}", id, slot, principal.username);
        Ok(slot)
    }

    /// Deletes the slot; the allocation on it, if any, goes with it.
    pub async fn delete(&self, principal: Option<&Principal>, id: i64) -> SchedResult<()> {
        let principal = principal::require(principal)?;

        if !slot_repo::delete_slot(&self.pool, id).await.map_err(store_error)? {
            return Err(SchedError::not_found(EntityKind::Slot, id));
        }

        info!("Slot {} deleted by {}", id, principal.username);
        Ok(())
    }
}
