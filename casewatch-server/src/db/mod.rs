//! Database layer - connection pool, schema and the case repository
//!
//! # Design Principles
//!
//! - One shared `PgPool`; every query borrows a connection only for its own duration
//! - Filters are composed with bound parameters, never string interpolation
//! - Detail lookups fetch child collections per case, not per row

pub mod cases;
pub mod migrations;
pub mod pool;
pub mod seed;

pub use cases::{CaseRepo, DbError};
pub use pool::{create_lazy_pool, create_pool};
