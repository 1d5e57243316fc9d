//! Human-readable report lines for directory outcomes.
//!
//! Operations return values; this module turns them into the messages a
//! reporting sink (the console, a log, a test buffer) prints.

use crate::core::DirectoryError;
use crate::directory::{
    CustomerCreated, CustomerDeleted, CustomerRecord, CustomerUpdated, Phone, PhoneChange,
};
use std::fmt;

/// Directory operations, used to prefix failure reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateSchema,
    ClearSchema,
    AddCustomer,
    AddPhone,
    UpdateCustomer,
    DeletePhone,
    DeleteCustomer,
    FindCustomers,
    DumpTable,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            Operation::CreateSchema => "create the schema",
            Operation::ClearSchema => "clear the schema",
            Operation::AddCustomer => "add customer",
            Operation::AddPhone => "add phone",
            Operation::UpdateCustomer => "update customer",
            Operation::DeletePhone => "delete phone",
            Operation::DeleteCustomer => "delete customer",
            Operation::FindCustomers => "find customers",
            Operation::DumpTable => "dump table",
        };
        f.write_str(action)
    }
}

pub fn schema_created() -> String {
    "Database schema created".to_string()
}

pub fn schema_cleared() -> String {
    "Database cleared.".to_string()
}

pub fn customer_created(created: &CustomerCreated) -> Vec<String> {
    let mut lines: Vec<String> = created
        .rejected_phones
        .iter()
        .map(|phone| format!("Phone {} already exists, customer {}", phone, created.id))
        .collect();
    lines.push(format!("Customer added: {}", created.id));
    lines
}

pub fn phone_added(phone: &Phone) -> String {
    format!("Phone {} added for customer {}", phone.phone, phone.customer_id)
}

pub fn customer_updated(updated: &CustomerUpdated) -> Vec<String> {
    let mut lines = Vec::new();
    match &updated.phone {
        Some(PhoneChange::Added { phone }) => {
            lines.push(format!("Phone {} added for customer {}", phone, updated.id))
        }
        Some(PhoneChange::AlreadyPresent { phone }) => lines.push(format!(
            "Phone {} already exists, customer {}",
            phone, updated.id
        )),
        Some(PhoneChange::Rejected { phone, reason }) => {
            lines.push(format!("Could not add phone {}: {}", phone, reason))
        }
        None => {}
    }
    lines.push(format!("Customer {} data changed.", updated.id));
    lines
}

pub fn phone_deleted(customer_id: i64, phone: &str) -> String {
    format!("Phone {} removed from customer {}", phone, customer_id)
}

pub fn customer_deleted(deleted: &CustomerDeleted) -> String {
    format!("Customer {} deleted.", deleted.id)
}

/// One line per record, or a single "no match" line.
pub fn search_results(records: &[CustomerRecord]) -> Vec<String> {
    if records.is_empty() {
        return vec!["No customer found.".to_string()];
    }
    records.iter().map(customer_record).collect()
}

pub fn customer_record(record: &CustomerRecord) -> String {
    format!(
        "ID: {}, First name: {}, Last name: {}, Email: {}, Phones: {}",
        record.id,
        record.first_name,
        record.last_name,
        record.email,
        record.phones.join(", ")
    )
}

/// Describes a failed operation.
///
/// Domain outcomes (not found, duplicate, validation) are reported as-is;
/// anything else is prefixed with the operation that failed.
pub fn failure(operation: Operation, err: &DirectoryError) -> String {
    match err {
        DirectoryError::InvalidEmail(_) | DirectoryError::InvalidPhone(_) => {
            format!("Error: {}", err)
        }
        DirectoryError::CustomerNotFound(_)
        | DirectoryError::PhoneNotFound { .. }
        | DirectoryError::DuplicatePhone { .. }
        | DirectoryError::PhoneTaken(_) => err.to_string(),
        _ => format!("Failed to {}: {}", operation, err),
    }
}
