/// Schema Management Module
///
/// Creates and drops the two directory tables and introspects the live
/// schema (tables, columns, indexes, foreign keys) for verification and
/// diagnostics.

use crate::core::{DirectoryError, Result};
use rusqlite::{Connection, Row};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Maximum length of a customer's first or last name.
pub const MAX_NAME_LEN: usize = 50;
/// Maximum length of a customer's email.
pub const MAX_EMAIL_LEN: usize = 50;
/// Maximum length of a phone number, including an optional leading '+'.
pub const MAX_PHONE_LEN: usize = 12;

const CREATE_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS customers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name VARCHAR(50) NOT NULL CHECK (length(first_name) <= 50),
    last_name VARCHAR(50) NOT NULL CHECK (length(last_name) <= 50),
    email VARCHAR(50) NOT NULL CHECK (length(email) <= 50)
);
CREATE TABLE IF NOT EXISTS phones (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_id INTEGER NOT NULL REFERENCES customers (id) ON DELETE CASCADE,
    phone VARCHAR(12) NOT NULL UNIQUE CHECK (length(phone) <= 12)
);
"#;

/// The tables owned by the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryTable {
    Customers,
    Phones,
}

impl DirectoryTable {
    /// Every directory table, parents first.
    pub const ALL: [DirectoryTable; 2] = [DirectoryTable::Customers, DirectoryTable::Phones];

    /// SQL name of the table.
    pub fn name(self) -> &'static str {
        match self {
            DirectoryTable::Customers => "customers",
            DirectoryTable::Phones => "phones",
        }
    }
}

impl fmt::Display for DirectoryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DirectoryTable {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self> {
        DirectoryTable::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DirectoryError::UnknownTable(s.to_string()))
    }
}

/// Ensures the customers and phones tables exist. Safe to call repeatedly.
pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_SCHEMA_SQL)?;
    info!("Directory schema ready");
    Ok(())
}

/// Drops both directory tables and all their data.
///
/// SQLite has no `DROP TABLE ... CASCADE`; the dependent phones table is
/// dropped before customers.
pub fn clear_schema(conn: &Connection) -> Result<()> {
    for table in DirectoryTable::ALL.iter().rev() {
        conn.execute(&format!("DROP TABLE IF EXISTS {}", table.name()), [])?;
    }
    info!("Directory schema cleared");
    Ok(())
}

/// Represents a foreign key relationship
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    /// The table this foreign key references
    pub referenced_table: String,
    /// The column in this table that is the foreign key
    pub from_column: String,
    /// The referenced column in the foreign table
    pub to_column: String,
    /// Action taken when the referenced row is deleted (e.g. "CASCADE")
    pub on_delete: String,
}

/// Represents a database column with its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    /// Declared type name (e.g., "INTEGER", "VARCHAR(50)")
    pub type_name: String,
    pub notnull: bool,
    pub pk: bool,
}

impl Column {
    /// Creates a Column from a PRAGMA table_info result row
    fn from_pragma_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Column {
            name: row.get(1)?,
            type_name: row.get(2)?,
            notnull: row.get(3)?,
            pk: row.get(5)?,
        })
    }
}

/// Represents a database index
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub name: String,
    pub unique: bool,
    /// Column names that make up this index
    pub columns: Vec<String>,
}

/// Represents a database table with its structure and metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub indexes: Vec<Index>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    /// Creates a Table by introspecting the database for the given table name
    fn from_database(conn: &Connection, table_name: &str) -> Result<Self> {
        Ok(Table {
            name: table_name.to_string(),
            columns: get_table_columns(conn, table_name)?,
            indexes: get_table_indexes(conn, table_name)?,
            foreign_keys: get_table_foreign_keys(conn, table_name)?,
        })
    }
}

/// Schema information for a database
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Map of table name to table information
    pub tables: HashMap<String, Table>,
}

impl Schema {
    /// Creates a new Schema by introspecting all user tables in the database
    pub fn from_connection(conn: &Connection) -> Result<Self> {
        let mut tables = HashMap::new();

        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for name in names {
            let table = Table::from_database(conn, &name)?;
            tables.insert(name, table);
        }

        Ok(Schema { tables })
    }

    /// Returns true when both directory tables are present.
    pub fn has_directory_tables(&self) -> bool {
        DirectoryTable::ALL
            .iter()
            .all(|t| self.tables.contains_key(t.name()))
    }
}

fn get_table_columns(conn: &Connection, table_name: &str) -> Result<Vec<Column>> {
    let mut stmt = conn.prepare("SELECT * FROM pragma_table_info(?1)")?;
    let columns = stmt
        .query_map([table_name], |row| Column::from_pragma_row(row))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

fn get_table_indexes(conn: &Connection, table_name: &str) -> Result<Vec<Index>> {
    let mut stmt = conn.prepare("SELECT name, \"unique\" FROM pragma_index_list(?1)")?;
    let listed = stmt
        .query_map([table_name], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut info = conn.prepare("SELECT name FROM pragma_index_info(?1) ORDER BY seqno")?;
    let mut indexes = Vec::with_capacity(listed.len());
    for (name, unique) in listed {
        let columns = info
            .query_map([&name], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        indexes.push(Index {
            name,
            unique,
            columns,
        });
    }
    Ok(indexes)
}

fn get_table_foreign_keys(conn: &Connection, table_name: &str) -> Result<Vec<ForeignKey>> {
    let mut stmt = conn.prepare(
        "SELECT \"table\", \"from\", \"to\", on_delete FROM pragma_foreign_key_list(?1)",
    )?;
    let foreign_keys = stmt
        .query_map([table_name], |row| {
            Ok(ForeignKey {
                referenced_table: row.get(0)?,
                from_column: row.get(1)?,
                to_column: row.get(2)?,
                on_delete: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(foreign_keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::connection::open_in_memory;

    #[test]
    fn test_create_schema_tables_and_constraints() {
        let conn = open_in_memory().unwrap();
        create_schema(&conn).unwrap();

        let schema = Schema::from_connection(&conn).unwrap();
        assert!(schema.has_directory_tables());

        let customers = schema.tables.get("customers").unwrap();
        let names: Vec<&str> = customers.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "first_name", "last_name", "email"]);
        assert!(customers.columns[0].pk);
        assert!(customers.columns[1..].iter().all(|c| c.notnull));

        let phones = schema.tables.get("phones").unwrap();
        assert_eq!(phones.foreign_keys.len(), 1);
        let fk = &phones.foreign_keys[0];
        assert_eq!(fk.referenced_table, "customers");
        assert_eq!(fk.from_column, "customer_id");
        assert_eq!(fk.to_column, "id");
        assert_eq!(fk.on_delete, "CASCADE");

        let phone_index = phones
            .indexes
            .iter()
            .find(|i| i.columns == vec!["phone".to_string()])
            .expect("phone column should carry a unique index");
        assert!(phone_index.unique);
    }

    #[test]
    fn test_create_schema_is_idempotent() {
        let conn = open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        let first = Schema::from_connection(&conn).unwrap();

        create_schema(&conn).unwrap();
        let second = Schema::from_connection(&conn).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_clear_schema_drops_tables() {
        let conn = open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO customers (first_name, last_name, email) VALUES ('a', 'b', 'c@d.e');
             INSERT INTO phones (customer_id, phone) VALUES (1, '88005553535');",
        )
        .unwrap();

        clear_schema(&conn).unwrap();
        let schema = Schema::from_connection(&conn).unwrap();
        assert!(!schema.tables.contains_key("customers"));
        assert!(!schema.tables.contains_key("phones"));

        // Clearing an empty database is a no-op
        clear_schema(&conn).unwrap();
    }

    #[test]
    fn test_width_checks_enforced() {
        let conn = open_in_memory().unwrap();
        create_schema(&conn).unwrap();

        let long_name = "x".repeat(MAX_NAME_LEN + 1);
        let result = conn.execute(
            "INSERT INTO customers (first_name, last_name, email) VALUES (?1, 'b', 'c@d.e')",
            [&long_name],
        );
        assert!(result.is_err());

        let long_email = format!("{}@d.e", "c".repeat(MAX_EMAIL_LEN - 3));
        let result = conn.execute(
            "INSERT INTO customers (first_name, last_name, email) VALUES ('a', 'b', ?1)",
            [&long_email],
        );
        assert!(result.is_err());

        let widest_email = format!("{}@d.e", "c".repeat(MAX_EMAIL_LEN - 4));
        conn.execute(
            "INSERT INTO customers (first_name, last_name, email) VALUES ('a', 'b', ?1)",
            [&widest_email],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO customers (first_name, last_name, email) VALUES ('a', 'b', 'c@d.e')",
            [],
        )
        .unwrap();
        let long_phone = "1".repeat(MAX_PHONE_LEN + 1);
        let result = conn.execute(
            "INSERT INTO phones (customer_id, phone) VALUES (1, ?1)",
            [&long_phone],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_directory_table_parsing() {
        assert_eq!("customers".parse::<DirectoryTable>().unwrap(), DirectoryTable::Customers);
        assert_eq!(" Phones ".parse::<DirectoryTable>().unwrap(), DirectoryTable::Phones);

        match "customers; DROP TABLE phones".parse::<DirectoryTable>() {
            Err(DirectoryError::UnknownTable(name)) => {
                assert_eq!(name, "customers; DROP TABLE phones")
            }
            other => panic!("Expected UnknownTable, got {:?}", other),
        }
        assert_eq!(DirectoryTable::Phones.to_string(), "phones");
    }
}
