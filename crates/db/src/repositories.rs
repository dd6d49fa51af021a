pub mod allocation;
pub mod session;
pub mod slot;
pub mod unit;
pub mod user;
