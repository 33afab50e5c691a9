// fidelis-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FidelisError {
    // --- DOMAIN ERRORS (configuration rules, templates, assignments) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, parsing, database) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- GENERIC / APPLICATION ERRORS ---
    #[error("Internal Error: {0}")]
    InternalError(String),

    #[error("Unsafe path traversal detected: {0}")]
    UnsafePath(String),
}

// Manual implementations to avoid duplicate enum variants but keep `?` ergonomics
impl From<std::io::Error> for FidelisError {
    fn from(err: std::io::Error) -> Self {
        FidelisError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<duckdb::Error> for FidelisError {
    fn from(err: duckdb::Error) -> Self {
        FidelisError::Infrastructure(InfrastructureError::Database(DatabaseError::DuckDB(err)))
    }
}

impl FidelisError {
    pub(crate) fn poisoned(what: &str) -> Self {
        FidelisError::InternalError(format!("{} lock poisoned", what))
    }
}
