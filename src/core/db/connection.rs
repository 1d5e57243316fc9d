/// Connection Management Module
///
/// Opens SQLite connections configured for the customer directory and
/// scopes their lifetime. The directory never holds a connection itself:
/// every operation borrows one from its caller.

use crate::config::DatabaseConfig;
use crate::core::Result;
use crate::core::db::query::register_functions;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Path understood by SQLite as a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Settings applied to every connection opened by this module
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionOptions {
    /// SQLite journal mode (e.g. "WAL", "DELETE"); left untouched when None
    pub journal_mode: Option<String>,
    /// How long a statement waits on a locked database before failing
    pub busy_timeout: Option<Duration>,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        ConnectionOptions {
            journal_mode: Some("WAL".to_string()),
            busy_timeout: None,
        }
    }
}

impl From<&DatabaseConfig> for ConnectionOptions {
    fn from(config: &DatabaseConfig) -> Self {
        let defaults = ConnectionOptions::default();
        ConnectionOptions {
            journal_mode: config.journal_mode.clone().or(defaults.journal_mode),
            busy_timeout: config.busy_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Opens a SQLite database at `path` and applies the directory pragmas.
///
/// # Arguments
///
/// * `path` - Path to the database file, or ":memory:" for an in-memory database
/// * `options` - Connection settings
///
/// # Returns
///
/// The configured connection, or `DirectoryError::Database` on failure.
pub fn open<P: AsRef<Path>>(path: P, options: &ConnectionOptions) -> Result<Connection> {
    let path = path.as_ref();
    debug!("Opening database at {:?}", path);
    let conn = Connection::open(path)?;
    configure(&conn, options)?;
    Ok(conn)
}

/// Opens a private in-memory database with default options.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn, &ConnectionOptions::default())?;
    Ok(conn)
}

/// Applies the directory pragmas and SQL functions to an existing connection.
///
/// Foreign keys are always enabled: phone rows rely on cascading deletes.
pub fn configure(conn: &Connection, options: &ConnectionOptions) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", true)?;

    if let Some(mode) = &options.journal_mode {
        let applied: String =
            conn.pragma_update_and_check(None, "journal_mode", mode, |row| row.get(0))?;
        debug!("journal_mode requested {}, applied {}", mode, applied);
    }

    if let Some(timeout) = options.busy_timeout {
        conn.busy_timeout(timeout)?;
    }

    register_functions(conn)?;
    Ok(())
}

/// Runs `f` with a freshly opened connection and closes it afterwards.
///
/// The connection is released when `f` returns, whether it succeeded or not.
///
/// # Examples
///
/// ```no_run
/// use customer_directory::core::db::{with_connection, ConnectionOptions, create_schema};
///
/// with_connection("customers.db", &ConnectionOptions::default(), |conn| {
///     create_schema(conn)
/// })?;
/// # Ok::<(), customer_directory::core::DirectoryError>(())
/// ```
pub fn with_connection<P, T, F>(path: P, options: &ConnectionOptions, f: F) -> Result<T>
where
    P: AsRef<Path>,
    F: FnOnce(&Connection) -> Result<T>,
{
    let conn = open(path, options)?;
    let result = f(&conn);
    if let Err(e) = conn.close().map_err(|(_, e)| e) {
        // An error from `f` takes precedence over a failed close.
        if result.is_ok() {
            return Err(e.into());
        }
    }
    result
}
