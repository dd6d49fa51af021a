pub mod allocations;
pub mod auth;
pub mod slots;
pub mod units;
