mod test_utils;

use pretty_assertions::assert_eq;
use unitsched_core::{
    errors::{EntityKind, SchedError},
    models::allocation::{CreateAllocationRequest, UpdateAllocationRequest},
};
use unitsched_db::services::{
    allocation::AllocationService, slot::SlotService, unit::UnitService,
};

use test_utils::{create_test_pool, lazy_pool, new_slot, new_unit, operator};

struct Services {
    units: UnitService,
    slots: SlotService,
    allocations: AllocationService,
}

async fn services() -> Services {
    let pool = create_test_pool().await;
    Services {
        units: UnitService::new(pool.clone()),
        slots: SlotService::new(pool.clone()),
        allocations: AllocationService::new(pool).with_max_retries(20),
    }
}

fn request(unit_id: i64, slot_id: i64) -> CreateAllocationRequest {
    CreateAllocationRequest { unit_id, slot_id }
}

#[tokio::test]
async fn test_unauthenticated_calls_are_rejected_before_storage() {
    let allocations = AllocationService::new(lazy_pool());

    let create = allocations.create(None, request(1, 1)).await;
    let update = allocations
        .update(None, 1, UpdateAllocationRequest::default())
        .await;
    let delete = allocations.delete(None, 1).await;
    let list = allocations.list(None).await;

    assert!(matches!(create, Err(SchedError::Unauthenticated)));
    assert!(matches!(update, Err(SchedError::Unauthenticated)));
    assert!(matches!(delete, Err(SchedError::Unauthenticated)));
    assert!(matches!(list, Err(SchedError::Unauthenticated)));
}

#[test_log::test(tokio::test)]
#[ignore = "requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_create_on_free_slot_is_listed() {
    let s = services().await;
    let unit = new_unit(&s.units, "CS").await;
    let slot = new_slot(&s.slots).await;

    let allocation = s
        .allocations
        .create(Some(&operator()), request(unit.id, slot.id))
        .await
        .unwrap();

    assert_eq!(allocation.unit, unit);
    assert_eq!(allocation.slot, slot);

    let listed = s.allocations.list(Some(&operator())).await.unwrap();
    assert!(listed.iter().any(|a| a.id == allocation.id));

    let fetched = s.allocations.get(Some(&operator()), allocation.id).await.unwrap();
    assert_eq!(fetched, allocation);
}

#[test_log::test(tokio::test)]
#[ignore = "requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_list_is_newest_first() {
    let s = services().await;
    let unit = new_unit(&s.units, "ORD").await;
    let first_slot = new_slot(&s.slots).await;
    let second_slot = new_slot(&s.slots).await;

    let first = s
        .allocations
        .create(Some(&operator()), request(unit.id, first_slot.id))
        .await
        .unwrap();
    let second = s
        .allocations
        .create(Some(&operator()), request(unit.id, second_slot.id))
        .await
        .unwrap();

    let listed = s.allocations.list(Some(&operator())).await.unwrap();
    let position = |id| listed.iter().position(|a| a.id == id).unwrap();
    assert!(position(second.id) < position(first.id));
}

#[test_log::test(tokio::test)]
#[ignore = "requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_taken_slot_clashes_for_any_unit() {
    let s = services().await;
    let owner = new_unit(&s.units, "OWN").await;
    let other = new_unit(&s.units, "OTH").await;
    let slot = new_slot(&s.slots).await;

    s.allocations
        .create(Some(&operator()), request(owner.id, slot.id))
        .await
        .unwrap();

    for unit_id in [owner.id, other.id] {
        let err = s
            .allocations
            .create(Some(&operator()), request(unit_id, slot.id))
            .await
            .unwrap_err();
        assert!(matches!(err, SchedError::SlotAlreadyAllocated { slot_id } if slot_id == slot.id));
    }
}

#[test_log::test(tokio::test)]
#[ignore = "requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_missing_references_are_not_found() {
    let s = services().await;
    let unit = new_unit(&s.units, "REF").await;
    let slot = new_slot(&s.slots).await;

    let missing_unit = s
        .allocations
        .create(Some(&operator()), request(i64::MAX, slot.id))
        .await
        .unwrap_err();
    let missing_slot = s
        .allocations
        .create(Some(&operator()), request(unit.id, i64::MAX))
        .await
        .unwrap_err();

    assert!(matches!(missing_unit, SchedError::NotFound { entity: EntityKind::Unit, .. }));
    assert!(matches!(missing_slot, SchedError::NotFound { entity: EntityKind::Slot, .. }));
}

#[test_log::test(tokio::test)]
#[ignore = "requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_update_keeping_slot_never_clashes() {
    let s = services().await;
    let unit = new_unit(&s.units, "UPD").await;
    let replacement = new_unit(&s.units, "REP").await;
    let slot = new_slot(&s.slots).await;
    let allocation = s
        .allocations
        .create(Some(&operator()), request(unit.id, slot.id))
        .await
        .unwrap();

    let same_slot = UpdateAllocationRequest {
        unit_id: None,
        slot_id: Some(slot.id),
    };
    let updated = s
        .allocations
        .update(Some(&operator()), allocation.id, same_slot)
        .await
        .unwrap();
    assert_eq!(updated.slot.id, slot.id);
    assert_eq!(updated.created_at, allocation.created_at);

    let unit_only = UpdateAllocationRequest {
        unit_id: Some(replacement.id),
        slot_id: None,
    };
    let updated = s
        .allocations
        .update(Some(&operator()), allocation.id, unit_only)
        .await
        .unwrap();
    assert_eq!(updated.unit.id, replacement.id);
    assert_eq!(updated.slot.id, slot.id);
}

#[test_log::test(tokio::test)]
#[ignore = "requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_update_moves_only_onto_free_slots() {
    let s = services().await;
    let unit = new_unit(&s.units, "MOV").await;
    let first_slot = new_slot(&s.slots).await;
    let taken_slot = new_slot(&s.slots).await;
    let free_slot = new_slot(&s.slots).await;

    let allocation = s
        .allocations
        .create(Some(&operator()), request(unit.id, first_slot.id))
        .await
        .unwrap();
    s.allocations
        .create(Some(&operator()), request(unit.id, taken_slot.id))
        .await
        .unwrap();

    let onto_taken = UpdateAllocationRequest {
        unit_id: None,
        slot_id: Some(taken_slot.id),
    };
    let err = s
        .allocations
        .update(Some(&operator()), allocation.id, onto_taken)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedError::SlotAlreadyAllocated { slot_id } if slot_id == taken_slot.id));

    let onto_free = UpdateAllocationRequest {
        unit_id: None,
        slot_id: Some(free_slot.id),
    };
    let moved = s
        .allocations
        .update(Some(&operator()), allocation.id, onto_free)
        .await
        .unwrap();
    assert_eq!(moved.slot.id, free_slot.id);

    // The vacated slot is free again
    s.allocations
        .create(Some(&operator()), request(unit.id, first_slot.id))
        .await
        .unwrap();
}

#[test_log::test(tokio::test)]
#[ignore = "requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_update_and_delete_missing_allocation() {
    let s = services().await;

    let update = s
        .allocations
        .update(Some(&operator()), i64::MAX, UpdateAllocationRequest::default())
        .await
        .unwrap_err();
    let delete = s
        .allocations
        .delete(Some(&operator()), i64::MAX)
        .await
        .unwrap_err();

    assert!(matches!(update, SchedError::NotFound { entity: EntityKind::Allocation, .. }));
    assert!(matches!(delete, SchedError::NotFound { entity: EntityKind::Allocation, .. }));
}

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
#[ignore = "requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_concurrent_creates_have_one_winner() {
    const ATTEMPTS: usize = 8;

    let s = services().await;
    let unit = new_unit(&s.units, "RACE").await;
    let slot = new_slot(&s.slots).await;

    let handles: Vec<_> = (0..ATTEMPTS)
        .map(|_| {
            let allocations = s.allocations.clone();
            let (unit_id, slot_id) = (unit.id, slot.id);
            tokio::spawn(async move {
                allocations
                    .create(Some(&operator()), request(unit_id, slot_id))
                    .await
            })
        })
        .collect();

    let mut successes = 0;
    let mut clashes = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(_) => successes += 1,
            Err(SchedError::SlotAlreadyAllocated { slot_id }) => {
                assert_eq!(slot_id, slot.id);
                clashes += 1;
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(clashes, ATTEMPTS - 1);

    let on_slot = s
        .allocations
        .list(Some(&operator()))
        .await
        .unwrap()
        .into_iter()
        .filter(|a| a.slot.id == slot.id)
        .count();
    assert_eq!(on_slot, 1);
}

#[test_log::test(tokio::test)]
#[ignore = "requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_deleting_unit_or_slot_cascades() {
    let s = services().await;
    let doomed_unit = new_unit(&s.units, "DU").await;
    let kept_unit = new_unit(&s.units, "KU").await;
    let slot_a = new_slot(&s.slots).await;
    let slot_b = new_slot(&s.slots).await;
    let doomed_slot = new_slot(&s.slots).await;

    let by_unit_a = s
        .allocations
        .create(Some(&operator()), request(doomed_unit.id, slot_a.id))
        .await
        .unwrap();
    let by_unit_b = s
        .allocations
        .create(Some(&operator()), request(doomed_unit.id, slot_b.id))
        .await
        .unwrap();
    let by_slot = s
        .allocations
        .create(Some(&operator()), request(kept_unit.id, doomed_slot.id))
        .await
        .unwrap();

    s.units.delete(Some(&operator()), doomed_unit.id).await.unwrap();
    s.slots.delete(Some(&operator()), doomed_slot.id).await.unwrap();

    for id in [by_unit_a.id, by_unit_b.id, by_slot.id] {
        let err = s.allocations.get(Some(&operator()), id).await.unwrap_err();
        assert!(matches!(err, SchedError::NotFound { entity: EntityKind::Allocation, .. }));
    }
}

#[test_log::test(tokio::test)]
#[ignore = "requires PostgreSQL at TEST_DATABASE_URL"]
async fn test_clash_then_free_after_delete() {
    let s = services().await;
    let cs101 = new_unit(&s.units, "CS101").await;
    let cs102 = new_unit(&s.units, "CS102").await;
    let slot_a = new_slot(&s.slots).await;

    let first = s
        .allocations
        .create(Some(&operator()), request(cs101.id, slot_a.id))
        .await
        .unwrap();

    let clash = s
        .allocations
        .create(Some(&operator()), request(cs102.id, slot_a.id))
        .await
        .unwrap_err();
    assert!(matches!(clash, SchedError::SlotAlreadyAllocated { .. }));

    s.allocations.delete(Some(&operator()), first.id).await.unwrap();

    let second = s
        .allocations
        .create(Some(&operator()), request(cs102.id, slot_a.id))
        .await
        .unwrap();
    assert_eq!(second.unit.id, cs102.id);
    assert_eq!(second.slot.id, slot_a.id);
}
