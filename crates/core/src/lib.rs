//! Domain types for the unit scheduler: units, weekly slots, allocations,
//! the error taxonomy, and the slot clash check.

pub mod clash;
pub mod errors;
pub mod models;
pub mod principal;
