use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{slot::Slot, unit::Unit};

/// An allocation with its unit and slot resolved, as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: i64,
    pub unit: Unit,
    pub slot: Slot,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAllocationRequest {
    pub unit_id: i64,
    pub slot_id: i64,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAllocationRequest {
    pub unit_id: Option<i64>,
    pub slot_id: Option<i64>,
}
