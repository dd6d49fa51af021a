
use pretty_assertions::assert_eq;
use unitsched_api::{config::ApiConfig, ApiState};

use test_utils::unreachable_pool;

#[tokio::test]
async fn zero_retry_budget_is_honoured() {
    let config = ApiConfig {
        allocation_max_retries: 0,
        ..Default::default()
    };

    let state = ApiState::from_config(&config, unreachable_pool());

    assert_eq!(state.allocations.max_retries(), 0);
}

#[tokio::test]
async fn defaults_come_from_config() {
    let state = ApiState::new(unreachable_pool());

    assert_eq!(state.allocations.max_retries(), 5);
    assert_eq!(state.sessions.ttl(), chrono::Duration::hours(336));
    assert!(!state.secure_cookies);
}
