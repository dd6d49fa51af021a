use async_trait::async_trait;
use mockall::mock;
use unitsched_core::{clash::AllocationLookup, errors::SchedResult};

// Stand-in for the store when exercising the clash check in isolation
mock! {
    pub SlotLookup {}

    #[async_trait]
    impl AllocationLookup for SlotLookup {
        async fn find_allocation_by_slot(
            &mut self,
            slot_id: i64,
            exclude: Option<i64>,
        ) -> SchedResult<Option<i64>>;
    }
}
