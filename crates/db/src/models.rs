use chrono::{DateTime, NaiveTime, Utc};
use eyre::eyre;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use unitsched_core::{
    errors::SchedError,
    models::{
        allocation::Allocation,
        slot::{Day, Slot},
        unit::Unit,
    },
    principal::Principal,
};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSession {
    pub token: Uuid,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUnit {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub capacity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSlot {
    pub id: i64,
    pub day: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAllocation {
    pub id: i64,
    pub unit_id: i64,
    pub slot_id: i64,
    pub created_at: DateTime<Utc>,
}

/// An allocation joined with its unit and slot in a single row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAllocationDetail {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub unit_id: i64,
    pub unit_code: String,
    pub unit_name: String,
    pub unit_capacity: i32,
    pub slot_id: i64,
    pub slot_day: String,
    pub slot_start_time: NaiveTime,
    pub slot_end_time: NaiveTime,
}

impl From<DbUnit> for Unit {
    fn from(row: DbUnit) -> Self {
        Unit {
            id: row.id,
            code: row.code,
            name: row.name,
            capacity: row.capacity,
        }
    }
}

fn parse_day(raw: &str) -> Result<Day, SchedError> {
    raw.parse()
        .map_err(|_| SchedError::Database(eyre!("Stored slot has unknown day {raw:?}")))
}

impl TryFrom<DbSlot> for Slot {
    type Error = SchedError;

    fn try_from(row: DbSlot) -> Result<Self, Self::Error> {
        Ok(Slot {
            id: row.id,
            day: parse_day(&row.day)?,
            start_time: row.start_time,
            end_time: row.end_time,
        })
    }
}

impl TryFrom<DbAllocationDetail> for Allocation {
    type Error = SchedError;

    fn try_from(row: DbAllocationDetail) -> Result<Self, Self::Error> {
        Ok(Allocation {
            id: row.id,
            created_at: row.created_at,
            unit: Unit {
                id: row.unit_id,
                code: row.unit_code,
                name: row.unit_name,
                capacity: row.unit_capacity,
            },
            slot: Slot {
                id: row.slot_id,
                day: parse_day(&row.slot_day)?,
                start_time: row.slot_start_time,
                end_time: row.slot_end_time,
            },
        })
    }
}

impl From<DbUser> for Principal {
    fn from(row: DbUser) -> Self {
        Principal {
            user_id: row.id,
            username: row.username,
        }
    }
}
