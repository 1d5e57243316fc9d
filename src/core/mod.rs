/// Core Module for the customer directory
///
/// This module contains the shared infrastructure the directory operations
/// are built on: database connection setup, schema management, the table
/// dump utility and the common error type.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{DirectoryError, Result};
