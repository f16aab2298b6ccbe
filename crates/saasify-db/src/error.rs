//! Database-specific error types and conversions.

use saasify_core::error::SaasifyError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// A unique index rejected the write.
    #[error("Duplicate {entity}")]
    AlreadyExists { entity: String },

    /// Concurrent transactions touched the same record; safe to retry.
    #[error("Transaction conflict: {0}")]
    Conflict(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

impl DbError {
    /// Classifies an error reported by `Response::check()`.
    ///
    /// Unique index violations and transaction conflicts are only
    /// distinguishable by message text.
    pub fn from_statement(entity: &str, err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        if msg.contains("already contains") || msg.contains("already exists") {
            Self::AlreadyExists {
                entity: entity.to_string(),
            }
        } else if msg.contains("conflict") || msg.contains("can be retried") {
            Self::Conflict(msg)
        } else {
            Self::Query(msg)
        }
    }

    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<DbError> for SaasifyError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => SaasifyError::NotFound { entity, id },
            DbError::AlreadyExists { entity } => SaasifyError::AlreadyExists { entity },
            other => SaasifyError::Database(other.to_string()),
        }
    }
}
