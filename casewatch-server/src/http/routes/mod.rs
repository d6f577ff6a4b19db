//! Route handlers

pub mod cases;
pub mod filters;
pub mod health;
pub mod search;
pub mod statistics;
