//! # Database Error Types
//!
//! Error types for repository operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Tagged with the operation that failed         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller (HTTP handler, CLI) ← Decides retry / status code              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Kinds
//! ```text
//! get_all / get_one / get_by_name   fetch fails   → Query
//!                                   decode fails  → Scan
//! store                             any failure   → Insert
//! update                            any failure   → Update
//! delete                            any failure   → Delete
//! get_one / get_by_name / delete    no row        → NotFound
//! update                            ctx cancelled → Cancelled
//! update                            ctx expired   → Timeout
//! ```
//!
//! Driver errors are tagged at each call site with `map_err`; there is no
//! `From<sqlx::Error>`.

use thiserror::Error;

/// Repository operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// A read statement could not be prepared or executed.
    #[error("Query failed: {0}")]
    Query(#[source] sqlx::Error),

    /// A fetched row could not be decoded into an entity.
    ///
    /// ## When This Occurs
    /// - NULL in a column the entity requires
    /// - Column type incompatible with the field type
    #[error("Row decoding failed: {0}")]
    Scan(#[source] sqlx::Error),

    /// The insert statement could not be prepared or executed.
    #[error("Insert failed: {0}")]
    Insert(#[source] sqlx::Error),

    /// The update statement could not be prepared or executed.
    #[error("Update failed: {0}")]
    Update(#[source] sqlx::Error),

    /// The delete statement could not be prepared or executed.
    #[error("Delete failed: {0}")]
    Delete(#[source] sqlx::Error),

    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `get_one` / `get_by_name` match no row
    /// - `delete` affects zero rows
    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },

    /// The operation context was cancelled before the operation completed.
    #[error("Operation cancelled")]
    Cancelled,

    /// The operation context deadline passed before the operation completed.
    #[error("Operation timed out")]
    Timeout,

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Schema provisioning failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A configuration value could not be parsed.
    #[error("Invalid value for {0}")]
    InvalidConfig(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and lookup key.
    pub fn not_found(entity: impl Into<String>, key: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            key: key.to_string(),
        }
    }

    /// Whether this error means the requested row does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = DbError::not_found("Product", 42);
        assert_eq!(err.to_string(), "Product not found: 42");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_wrapped_errors_keep_source() {
        use std::error::Error as _;

        let err = DbError::Insert(sqlx::Error::RowNotFound);
        assert!(err.to_string().starts_with("Insert failed"));
        assert!(err.source().is_some());
        assert!(!err.is_not_found());
    }
}
