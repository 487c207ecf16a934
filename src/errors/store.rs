//! Errors from the persistence layer.

/// Errors that can occur while reading or writing swap records and the
/// error quarantine.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The database rejected or failed a statement.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness or check constraint was violated.
    #[error("Constraint violation: {details}")]
    ConstraintViolation {
        /// Description of the violated constraint
        details: String,
    },

    /// A stored `raw_data` payload could not be (de)serialized.
    #[error("Payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Helper to create a `ConstraintViolation` error.
    pub fn constraint(details: impl Into<String>) -> Self {
        StoreError::ConstraintViolation {
            details: details.into(),
        }
    }
}
