//! Error types for chatdb.

use thiserror::Error;

/// The main error type for chatdb operations.
#[derive(Debug, Error)]
pub enum ChatDbError {
    /// The table has no columns, so no query can be produced.
    #[error("Table '{table}' has no columns")]
    EmptySchema { table: String },

    /// A table or column name is not a plain SQL identifier.
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// A column name appears more than once in a schema.
    #[error("Duplicate column: '{0}'")]
    DuplicateColumn(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChatDbError {
    /// Create an empty schema error for the given table.
    pub fn empty_schema(table: impl Into<String>) -> Self {
        Self::EmptySchema {
            table: table.into(),
        }
    }
}

/// Result type alias for chatdb operations.
pub type ChatDbResult<T> = Result<T, ChatDbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChatDbError::empty_schema("sales");
        assert_eq!(err.to_string(), "Table 'sales' has no columns");
    }

    #[test]
    fn test_invalid_identifier_display() {
        let err = ChatDbError::InvalidIdentifier("drop table".to_string());
        assert_eq!(err.to_string(), "Invalid identifier: 'drop table'");
    }
}
