//! Case repository facade
//!
//! A live [`CaseSource`] answers when it can; the in-memory fallback dataset
//! answers when it cannot. Every result records which tier produced it.

mod facade;
mod source;

pub use facade::{CaseRepository, DataSource, Sourced};
pub use source::{CaseSource, PgCaseSource, SourceError};
