pub mod sqlite;
pub mod repository;

pub use sqlite::*;
pub use repository::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    /// A stored value could not be read back into its typed form.
    #[error("Corrupt value in {column}: {value} ({reason})")]
    Decode {
        column: &'static str,
        value: String,
        reason: String,
    },

    #[error("Cannot create database directory {path}: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },
}

impl DatabaseError {
    /// Map a rusqlite error, turning UNIQUE failures into `ConstraintViolation`
    /// so callers can tell a duplicate apart from a broken database.
    pub fn from_write(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, message)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DatabaseError::ConstraintViolation(
                    message.clone().unwrap_or_else(|| err.to_string()),
                )
            }
            _ => DatabaseError::Sqlite(err),
        }
    }
}
