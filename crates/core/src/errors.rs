use std::fmt;

use thiserror::Error;

/// The persisted entities an error can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Unit,
    Slot,
    Allocation,
    User,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Unit => "Unit",
            EntityKind::Slot => "Slot",
            EntityKind::Allocation => "Allocation",
            EntityKind::User => "User",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("{entity} {id} not found.")]
    NotFound { entity: EntityKind, id: i64 },

    #[error("Slot already allocated (clash).")]
    SlotAlreadyAllocated { slot_id: i64 },

    #[error("{message}")]
    DuplicateKey { field: String, message: String },

    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("Authentication credentials were not provided.")]
    Unauthenticated,

    #[error("{0}")]
    Authentication(String),

    #[error("Concurrent update conflict, please retry.")]
    TransientConflict,

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl SchedError {
    pub fn not_found(entity: EntityKind, id: i64) -> Self {
        SchedError::NotFound { entity, id }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SchedError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, message: impl Into<String>) -> Self {
        SchedError::DuplicateKey {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The request field a client-facing error is attached to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            SchedError::SlotAlreadyAllocated { .. } => Some("slot_id"),
            SchedError::DuplicateKey { field, .. } | SchedError::Validation { field, .. } => {
                Some(field)
            }
            _ => None,
        }
    }
}

pub type SchedResult<T> = Result<T, SchedError>;
