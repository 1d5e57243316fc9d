/// Customer Directory Operations
///
/// Stateless operations over the customers and phones tables. Every
/// function borrows the caller's connection and returns a tagged outcome
/// (`Ok` value or `DirectoryError`) instead of printing.
///
/// Multi-statement operations run in SQLite autocommit mode: statements
/// already executed inside one call stay committed when a later one fails.
pub mod customers;
pub mod phones;
pub mod search;

pub use customers::*;
pub use phones::*;
pub use search::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A row of the customers table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// A row of the phones table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Phone {
    pub id: i64,
    pub customer_id: i64,
    pub phone: String,
}

/// A search hit: one customer with the phones that matched the filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRecord {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Phones in the order they were added
    pub phones: Vec<String>,
}

/// Whether update paths re-check email and phone formats.
///
/// `add_customer` always validates. `Lenient` keeps `update_customer` and
/// standalone `add_phone` unvalidated; `Strict` validates them as well and
/// rejects the whole call before any write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    #[default]
    Lenient,
    Strict,
}

/// Editable customer columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerField {
    FirstName,
    LastName,
    Email,
}

impl CustomerField {
    /// Column name in the customers table.
    pub fn column(self) -> &'static str {
        match self {
            CustomerField::FirstName => "first_name",
            CustomerField::LastName => "last_name",
            CustomerField::Email => "email",
        }
    }
}

impl fmt::Display for CustomerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Returns the value, unchanged, when it is present and non-empty.
pub(crate) fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
