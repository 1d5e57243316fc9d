//! Customer operations: create, load, update and delete.

use super::phones::{add_phone, insert_phone};
use super::{supplied, Customer, CustomerField, ValidationPolicy};
use crate::core::{DirectoryError, Result};
use crate::validation::{validate_email, validate_phone};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Result of a successful `add_customer`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerCreated {
    /// Generated id of the new customer
    pub id: i64,
    /// Phones stored for the customer
    pub added_phones: Vec<String>,
    /// Phones skipped because the database refused them (e.g. owned by someone else)
    pub rejected_phones: Vec<String>,
}

/// Fields to change on an existing customer. Absent or empty values are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    /// A phone to add to the customer
    pub phone: Option<String>,
}

impl CustomerUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_name(mut self, value: impl Into<String>) -> Self {
        self.first_name = Some(value.into());
        self
    }

    pub fn last_name(mut self, value: impl Into<String>) -> Self {
        self.last_name = Some(value.into());
        self
    }

    pub fn email(mut self, value: impl Into<String>) -> Self {
        self.email = Some(value.into());
        self
    }

    pub fn phone(mut self, value: impl Into<String>) -> Self {
        self.phone = Some(value.into());
        self
    }

    fn fields(&self) -> [(CustomerField, Option<&str>); 3] {
        [
            (CustomerField::FirstName, supplied(&self.first_name)),
            (CustomerField::LastName, supplied(&self.last_name)),
            (CustomerField::Email, supplied(&self.email)),
        ]
    }
}

/// What happened to the phone supplied with an update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PhoneChange {
    Added { phone: String },
    AlreadyPresent { phone: String },
    Rejected { phone: String, reason: String },
}

/// Result of a successful `update_customer`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerUpdated {
    pub id: i64,
    /// Columns that were written, in the order they were applied
    pub updated_fields: Vec<CustomerField>,
    /// Outcome of the phone addition, when a phone was supplied
    pub phone: Option<PhoneChange>,
}

/// Result of a successful `delete_customer`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerDeleted {
    pub id: i64,
    /// Number of phone rows removed with the customer
    pub phones_removed: usize,
}

/// Loads a customer by id.
pub fn get_customer(conn: &Connection, id: i64) -> Result<Option<Customer>> {
    let customer = conn
        .query_row(
            "SELECT id, first_name, last_name, email FROM customers WHERE id = ?1",
            [id],
            |row| {
                Ok(Customer {
                    id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    email: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(customer)
}

/// Creates a customer and, optionally, its phones.
///
/// The email and every phone are validated before anything is written; a
/// single malformed value rejects the whole call. Once the customer row is
/// inserted, each phone is inserted on its own: a phone the database refuses
/// (for instance one already owned by another customer) is recorded in
/// `rejected_phones` and the remaining phones are still attempted.
pub fn add_customer(
    conn: &Connection,
    first_name: &str,
    last_name: &str,
    email: &str,
    phones: &[&str],
) -> Result<CustomerCreated> {
    validate_email(email)?;
    for phone in phones {
        validate_phone(phone)?;
    }

    conn.execute(
        "INSERT INTO customers (first_name, last_name, email) VALUES (?1, ?2, ?3)",
        params![first_name, last_name, email],
    )?;
    let id = conn.last_insert_rowid();
    debug!("Inserted customer row {}", id);

    let mut created = CustomerCreated {
        id,
        added_phones: Vec::new(),
        rejected_phones: Vec::new(),
    };

    for phone in phones.iter().map(|p| p.trim()) {
        match insert_phone(conn, id, phone) {
            Ok(added) => created.added_phones.push(added.phone),
            Err(e) if is_phone_rejection(&e) => {
                warn!("Skipping phone {} for customer {}: {}", phone, id, e);
                created.rejected_phones.push(phone.to_string());
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        "Customer {} added with {} phone(s), {} rejected",
        id,
        created.added_phones.len(),
        created.rejected_phones.len()
    );
    Ok(created)
}

fn is_phone_rejection(err: &DirectoryError) -> bool {
    matches!(err, DirectoryError::PhoneTaken(_)) || err.is_constraint_violation()
}

/// Updates an existing customer.
///
/// Each supplied, non-empty field is written as given, whitespace included,
/// with its own statement. When a
/// phone is supplied it is added with `add_phone` semantics and the outcome
/// is reported in `CustomerUpdated::phone`; a refused phone does not undo
/// the field updates.
///
/// Under `ValidationPolicy::Lenient` the email and phone are stored without
/// format checks. Under `Strict` both are validated before any write.
pub fn update_customer(
    conn: &Connection,
    customer_id: i64,
    update: &CustomerUpdate,
    policy: ValidationPolicy,
) -> Result<CustomerUpdated> {
    if get_customer(conn, customer_id)?.is_none() {
        return Err(DirectoryError::CustomerNotFound(customer_id));
    }

    // Phones are stored trimmed, so a whitespace-only phone is no phone
    let phone = supplied(&update.phone)
        .map(str::trim)
        .filter(|p| !p.is_empty());
    if policy == ValidationPolicy::Strict {
        if let Some(email) = supplied(&update.email) {
            validate_email(email)?;
        }
        if let Some(phone) = phone {
            validate_phone(phone)?;
        }
    }

    let mut updated_fields = Vec::new();
    for (field, value) in update.fields() {
        let Some(value) = value else { continue };
        // Column names come from CustomerField, never from input
        let sql = format!("UPDATE customers SET {} = ?1 WHERE id = ?2", field.column());
        conn.execute(&sql, params![value, customer_id])?;
        updated_fields.push(field);
    }

    let phone = phone.map(|phone| match add_phone(conn, customer_id, phone, policy) {
        Ok(added) => PhoneChange::Added { phone: added.phone },
        Err(DirectoryError::DuplicatePhone { phone, .. }) => PhoneChange::AlreadyPresent { phone },
        Err(e) => {
            warn!("Phone {} not added to customer {}: {}", phone, customer_id, e);
            PhoneChange::Rejected {
                phone: phone.to_string(),
                reason: e.to_string(),
            }
        }
    });

    info!("Customer {} updated: {:?}", customer_id, updated_fields);
    Ok(CustomerUpdated {
        id: customer_id,
        updated_fields,
        phone,
    })
}

/// Deletes a customer and every phone it owns.
pub fn delete_customer(conn: &Connection, customer_id: i64) -> Result<CustomerDeleted> {
    if get_customer(conn, customer_id)?.is_none() {
        return Err(DirectoryError::CustomerNotFound(customer_id));
    }

    let phones_removed = conn.execute("DELETE FROM phones WHERE customer_id = ?1", [customer_id])?;
    conn.execute("DELETE FROM customers WHERE id = ?1", [customer_id])?;

    info!("Customer {} deleted with {} phone(s)", customer_id, phones_removed);
    Ok(CustomerDeleted {
        id: customer_id,
        phones_removed,
    })
}
