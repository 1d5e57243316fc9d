//! Phone operations: lookup, add and delete.

use super::{Phone, ValidationPolicy};
use crate::core::{DirectoryError, Result};
use crate::validation::validate_phone;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

/// Lists the phones owned by `customer_id`, oldest first.
pub fn list_phones(conn: &Connection, customer_id: i64) -> Result<Vec<Phone>> {
    let mut stmt = conn.prepare(
        "SELECT id, customer_id, phone FROM phones WHERE customer_id = ?1 ORDER BY id",
    )?;
    let phones = stmt
        .query_map([customer_id], |row| {
            Ok(Phone {
                id: row.get(0)?,
                customer_id: row.get(1)?,
                phone: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(phones)
}

/// Returns the id of the (customer_id, phone) row, if it exists.
pub fn find_phone_id(conn: &Connection, customer_id: i64, phone: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM phones WHERE customer_id = ?1 AND phone = ?2",
            params![customer_id, phone.trim()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Adds `phone` to the customer's phones.
///
/// # Errors
///
/// - `InvalidPhone` if `policy` is `Strict` and the format check fails
/// - `DuplicatePhone` if the customer already owns this number (nothing written)
/// - `PhoneTaken` if another customer owns this number
/// - `CustomerNotFound` if the customer does not exist
pub fn add_phone(
    conn: &Connection,
    customer_id: i64,
    phone: &str,
    policy: ValidationPolicy,
) -> Result<Phone> {
    if policy == ValidationPolicy::Strict {
        validate_phone(phone)?;
    }

    let phone = phone.trim();
    if find_phone_id(conn, customer_id, phone)?.is_some() {
        debug!("Phone {} already present for customer {}", phone, customer_id);
        return Err(DirectoryError::DuplicatePhone {
            customer_id,
            phone: phone.to_string(),
        });
    }

    let added = insert_phone(conn, customer_id, phone)?;
    info!("Phone {} added for customer {}", phone, customer_id);
    Ok(added)
}

/// Inserts a phone row, classifying constraint failures.
pub(crate) fn insert_phone(conn: &Connection, customer_id: i64, phone: &str) -> Result<Phone> {
    let result = conn.execute(
        "INSERT INTO phones (customer_id, phone) VALUES (?1, ?2)",
        params![customer_id, phone],
    );

    match result {
        Ok(_) => Ok(Phone {
            id: conn.last_insert_rowid(),
            customer_id,
            phone: phone.to_string(),
        }),
        Err(e) => {
            let err = DirectoryError::from(e);
            if err.is_unique_violation() {
                warn!("Phone {} is already registered to another customer", phone);
                Err(DirectoryError::PhoneTaken(phone.to_string()))
            } else if err.is_foreign_key_violation() {
                Err(DirectoryError::CustomerNotFound(customer_id))
            } else {
                Err(err)
            }
        }
    }
}

/// Removes `phone` from the customer's phones.
///
/// Returns `PhoneNotFound` when the customer does not own this number.
pub fn delete_phone(conn: &Connection, customer_id: i64, phone: &str) -> Result<()> {
    let phone = phone.trim();
    let id = find_phone_id(conn, customer_id, phone)?.ok_or_else(|| {
        DirectoryError::PhoneNotFound {
            customer_id,
            phone: phone.to_string(),
        }
    })?;

    conn.execute("DELETE FROM phones WHERE id = ?1", [id])?;
    info!("Phone {} removed from customer {}", phone, customer_id);
    Ok(())
}
