/// # Test Utilities Module
///
/// Fixtures and assertion helpers shared by the unit and integration tests
/// inside the crate.
///
/// This module provides:
/// - Isolated in-memory directory databases
/// - Sample customer data
/// - Error-variant assertion macros

use crate::core::db::{create_schema, open_in_memory};
use crate::core::Result;
use crate::directory::add_customer;
use rusqlite::Connection;

/// Isolated database test fixture
pub struct DirectoryFixture {
    pub name: String,
    pub connection: Connection,
}

impl DirectoryFixture {
    /// Create a new in-memory database with the directory schema
    pub fn new(name: &str) -> Result<Self> {
        let connection = open_in_memory()?;
        create_schema(&connection)?;

        Ok(DirectoryFixture {
            name: name.to_string(),
            connection,
        })
    }

    /// Create fixture with sample customers
    pub fn with_sample_data(name: &str) -> Result<Self> {
        let fixture = Self::new(name)?;
        fixture.populate_sample_data()?;
        Ok(fixture)
    }

    /// Three customers: one with two phones, one with one, one with none
    pub fn populate_sample_data(&self) -> Result<()> {
        let customers: [(&str, &str, &str, &[&str]); 3] = [
            ("Alice", "Smith", "alice@example.com", &["88005553535", "+78005553535"]),
            ("Bob", "Jones", "bob@example.com", &["89990001122"]),
            ("Charlie", "Smithson", "charlie@example.org", &[]),
        ];

        for (first, last, email, phones) in customers {
            add_customer(&self.connection, first, last, email, phones)?;
        }
        Ok(())
    }

    /// Number of rows in a directory table
    pub fn count(&self, table: &str) -> i64 {
        self.connection
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .expect("Failed to count rows")
    }
}

#[macro_export]
macro_rules! assert_directory_error {
    ($result:expr, $pattern:pat, $context:expr) => {
        match $result {
            Err($pattern) => {}
            Ok(ref value) => panic!(
                "Expected {} but got Ok({:?}) in {}",
                stringify!($pattern),
                value,
                $context
            ),
            Err(ref other) => panic!(
                "Expected {} but got {:?} in {}",
                stringify!($pattern),
                other,
                $context
            ),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DirectoryError;
    use crate::directory::delete_customer;

    #[test]
    fn test_fixture_creation() {
        let fixture = DirectoryFixture::new("test_create").unwrap();
        assert_eq!(fixture.name, "test_create");
        assert_eq!(fixture.count("customers"), 0);
    }

    #[test]
    fn test_sample_data_fixture() {
        let fixture = DirectoryFixture::with_sample_data("test_sample").unwrap();
        assert_eq!(fixture.count("customers"), 3);
        assert_eq!(fixture.count("phones"), 3);
    }

    #[test]
    fn test_error_assertion_macro() {
        let fixture = DirectoryFixture::new("macro").unwrap();
        assert_directory_error!(
            delete_customer(&fixture.connection, 1),
            DirectoryError::CustomerNotFound(1),
            "macro test"
        );
    }
}
