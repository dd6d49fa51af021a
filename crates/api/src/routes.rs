pub mod allocations;
pub mod auth;
pub mod health;
pub mod slots;
pub mod units;
