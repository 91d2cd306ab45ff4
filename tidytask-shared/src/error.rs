/// Error types shared by the store and the domain operations
///
/// `StoreError` is what a [`crate::store::Store`] implementation returns.
/// `TaskError` is what the operations in [`crate::service`] return; it
/// separates caller mistakes (validation, not found, conflict) from store
/// failures so front ends can map each kind to a response.

/// Failure reported by a store implementation
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The database rejected or failed the operation
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique or foreign key constraint was violated (constraint name)
    #[error("Constraint violation: {0}")]
    Conflict(String),
}

impl StoreError {
    /// Constraint name when this is a conflict
    pub fn constraint(&self) -> Option<&str> {
        match self {
            StoreError::Conflict(name) => Some(name),
            StoreError::Database(_) => None,
        }
    }
}

/// Failure of a task or category operation
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Bad or missing input; nothing was written
    #[error("{0}")]
    Validation(String),

    /// The record does not exist or belongs to another user
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The write would duplicate an existing record
    #[error("{0}")]
    Conflict(String),

    /// The store failed; the write was rolled back
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TaskError {
    pub fn validation(message: impl Into<String>) -> Self {
        TaskError::Validation(message.into())
    }
}

impl From<crate::models::ParseEnumError> for TaskError {
    fn from(err: crate::models::ParseEnumError) -> Self {
        TaskError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    #[test]
    fn test_task_error_display() {
        assert_eq!(
            TaskError::validation("Title is required").to_string(),
            "Title is required"
        );
        assert_eq!(TaskError::NotFound("Task").to_string(), "Task not found");
    }

    #[test]
    fn test_parse_error_becomes_validation() {
        let err: TaskError = "urgent".parse::<Priority>().unwrap_err().into();
        assert!(matches!(err, TaskError::Validation(ref m) if m.contains("urgent")));
    }

    #[test]
    fn test_store_error_constraint() {
        let err = StoreError::Conflict("users_email_key".to_string());
        assert_eq!(err.constraint(), Some("users_email_key"));

        let err = StoreError::Database(sqlx::Error::PoolTimedOut);
        assert!(err.constraint().is_none());
    }
}
