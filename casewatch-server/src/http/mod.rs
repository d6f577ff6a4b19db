//! HTTP server layer
//!
//! Axum server with:
//! - CORS (localhost only by default)
//! - Request tracing
//! - Graceful shutdown
//! - JSON envelopes tagged with the answering data source

pub mod envelope;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use envelope::{Envelope, PaginationMeta};
pub use error::ApiError;
pub use server::{build_router, run_server, AppState, ServerConfig};
