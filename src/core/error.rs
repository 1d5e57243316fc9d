/// Customer Directory Error Module
///
/// This module defines the error type returned by every directory operation.
/// Each variant is a distinct, matchable outcome so callers can decide how
/// to surface it instead of parsing printed messages.
use rusqlite::ffi;
use thiserror::Error;

/// Error type for the customer directory.
///
/// The variants cover:
/// - Database operations (connection, statements, constraint failures)
/// - Validation failures detected before any write
/// - Not-found and duplicate conditions checked by explicit lookups
/// - Configuration and I/O problems in the ambient layer
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// Database-related errors from SQLite operations
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Email failed the format check
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    /// Phone failed the format check
    #[error("Invalid phone format: {0}")]
    InvalidPhone(String),

    /// No customer with the given id
    #[error("Customer {0} not found")]
    CustomerNotFound(i64),

    /// The customer does not own the given phone
    #[error("Phone {phone} not found for customer {customer_id}")]
    PhoneNotFound { customer_id: i64, phone: String },

    /// The customer already owns the given phone
    #[error("Phone {phone} already exists for customer {customer_id}")]
    DuplicatePhone { customer_id: i64, phone: String },

    /// The phone is owned by a different customer
    #[error("Phone {0} is already registered to another customer")]
    PhoneTaken(String),

    /// Table name outside the directory's allow-list
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DirectoryError {
    /// Returns true for a UNIQUE or PRIMARY KEY constraint failure.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self.extended_code(),
            Some(ffi::SQLITE_CONSTRAINT_UNIQUE) | Some(ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
        )
    }

    /// Returns true for a FOREIGN KEY constraint failure.
    pub fn is_foreign_key_violation(&self) -> bool {
        self.extended_code() == Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
    }

    /// Returns true for any constraint failure (unique, check, not null, ...).
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            DirectoryError::Database(rusqlite::Error::SqliteFailure(err, _)) => {
                err.code == rusqlite::ErrorCode::ConstraintViolation
            }
            _ => false,
        }
    }

    fn extended_code(&self) -> Option<i32> {
        match self {
            DirectoryError::Database(rusqlite::Error::SqliteFailure(err, _)) => {
                Some(err.extended_code)
            }
            _ => None,
        }
    }
}

/// Type alias for Result to use DirectoryError as the error type.
pub type Result<T> = std::result::Result<T, DirectoryError>;
