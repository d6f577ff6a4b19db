//! Error types for casewatch-server startup and maintenance tasks
//!
//! Request-time errors live in `http::error::ApiError`; read queries never
//! surface datastore failures because the repository falls back instead.

use thiserror::Error;

use crate::db::DbError;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Repo(#[from] DbError),

    #[error("Configuration error: {0}")]
    Core(#[from] casewatch_core::CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
