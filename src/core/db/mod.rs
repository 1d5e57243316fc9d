/// Database Module
///
/// This module provides the database layer of the customer directory,
/// organized into focused submodules.
///
/// ## Architecture
///
/// - **Connection Management** (`connection.rs`): opens configured connections and scopes their lifetime
/// - **Schema Management** (`schema.rs`): creates, drops and introspects the directory tables
/// - **Query Execution** (`query.rs`): the table dump utility and SQL helper functions
///
/// ## Error Handling
///
/// All database operations use the standardized `DirectoryError` type for consistent error propagation.
pub mod connection;
pub mod query;
pub mod schema;

pub use connection::*;
pub use query::*;
pub use schema::*;
