use std::error::Error;

use pretty_assertions::assert_eq;
use unitsched_core::errors::{EntityKind, SchedError, SchedResult};

#[test]
fn test_sched_error_display() {
    let not_found = SchedError::not_found(EntityKind::Allocation, 7);
    let clash = SchedError::SlotAlreadyAllocated { slot_id: 3 };
    let duplicate = SchedError::duplicate("code", "unit with this code already exists.");
    let validation = SchedError::validation("capacity", "Ensure this value is greater than or equal to 0.");
    let database = SchedError::Database(eyre::eyre!("connection refused"));

    assert_eq!(not_found.to_string(), "Allocation 7 not found.");
    assert_eq!(clash.to_string(), "Slot already allocated (clash).");
    assert_eq!(duplicate.to_string(), "unit with this code already exists.");
    assert_eq!(
        validation.to_string(),
        "Ensure this value is greater than or equal to 0."
    );
    assert_eq!(
        SchedError::Unauthenticated.to_string(),
        "Authentication credentials were not provided."
    );
    assert!(database.to_string().starts_with("Database error:"));
}

#[test]
fn test_error_fields() {
    assert_eq!(
        SchedError::SlotAlreadyAllocated { slot_id: 1 }.field(),
        Some("slot_id")
    );
    assert_eq!(
        SchedError::duplicate("non_field_errors", "dup").field(),
        Some("non_field_errors")
    );
    assert_eq!(SchedError::validation("end_time", "bad").field(), Some("end_time"));
    assert_eq!(SchedError::not_found(EntityKind::Unit, 1).field(), None);
    assert_eq!(SchedError::TransientConflict.field(), None);
}

#[test]
fn test_box_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::Other, "IO error");
    let boxed_error: Box<dyn Error + Send + Sync> = Box::new(io_error);
    let sched_error = SchedError::from(boxed_error);

    assert!(sched_error.to_string().contains("IO error"));
    assert!(sched_error.source().is_some());
}

#[test]
fn test_sched_result() {
    let result: SchedResult<i32> = Ok(42);
    assert_eq!(result.unwrap(), 42);

    let result: SchedResult<i32> = Err(SchedError::not_found(EntityKind::Slot, 9));
    assert!(matches!(
        result,
        Err(SchedError::NotFound {
            entity: EntityKind::Slot,
            id: 9
        })
    ));
}
