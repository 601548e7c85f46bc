//! Storage Layer
//!
//! Component and combination persistence behind the [`Repository`] trait,
//! with an in-memory backend and a SQLite backend.

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
mod records;
mod repository;
mod sqlite;

pub use records::{
    Adhesion, BioRecognitionLayer, Catalog, CombinationKey, Component, ComponentKind,
    ImmobilizationLayer, MemristiveLayer, Page, Passport, SensorCombination, Solubility,
    TableCounts, TargetAnalyte,
};
pub use repository::{MemoryRepository, Repository, StorageResult};
pub use sqlite::SqliteRepository;

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StorageError::Conflict(db.message().to_string())
            }
            sqlx::Error::RowNotFound => StorageError::NotFound(err.to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                StorageError::SerializationError(err.to_string())
            }
            _ => StorageError::DatabaseError(err.to_string()),
        }
    }
}
