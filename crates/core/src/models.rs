pub mod allocation;
pub mod auth;
pub mod slot;
pub mod unit;
