//! # Clash Validation
//!
//! A slot may back at most one allocation. Before an allocation is written,
//! the target slot is checked for any *other* allocation referencing it.
//!
//! The check reads through [`AllocationLookup`] so it can run inside the same
//! transaction as the write that follows it. It never considers the unit.

use async_trait::async_trait;

use crate::errors::{SchedError, SchedResult};

/// Read capability the clash check needs from the entity store.
#[async_trait]
pub trait AllocationLookup: Send {
    /// Returns the id of an allocation referencing `slot_id`, ignoring the
    /// allocation `exclude` when given.
    async fn find_allocation_by_slot(
        &mut self,
        slot_id: i64,
        exclude: Option<i64>,
    ) -> SchedResult<Option<i64>>;
}

/// Fails with [`SchedError::SlotAlreadyAllocated`] if persisting an
/// allocation on `slot_id` would put a second allocation on that slot.
///
/// Pass the allocation's own id as `exclude` when updating so an allocation
/// that keeps its slot does not clash with itself.
pub async fn validate<L>(lookup: &mut L, slot_id: i64, exclude: Option<i64>) -> SchedResult<()>
where
    L: AllocationLookup + ?Sized,
{
    match lookup.find_allocation_by_slot(slot_id, exclude).await? {
        Some(_) => Err(SchedError::SlotAlreadyAllocated { slot_id }),
        None => Ok(()),
    }
}
