//! The end-to-end walkthrough run by the `customer-directory` binary.

use crate::core::db::{clear_schema, create_schema, dump_table, DirectoryTable};
use crate::directory::{
    add_customer, add_phone, delete_customer, delete_phone, find_customers, update_customer,
    CustomerFilter, CustomerUpdate, ValidationPolicy,
};
use crate::report::{self, Operation};
use rusqlite::Connection;
use tracing::info;

/// Options for a walkthrough run
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoOptions {
    pub policy: ValidationPolicy,
    /// Dump both tables before clearing the schema
    pub dump_tables: bool,
}

/// Runs the full operation sequence against `conn` and returns every
/// report line in order.
///
/// create schema → add customer with two phones → search → update → add
/// phone → search → delete phone → search → delete customer → search →
/// clear schema.
pub fn run(conn: &Connection, options: DemoOptions) -> Vec<String> {
    info!("Running directory walkthrough with {:?}", options);
    let mut out = Vec::new();

    match create_schema(conn) {
        Ok(()) => out.push(report::schema_created()),
        Err(e) => {
            // Nothing else can work without the tables
            out.push(report::failure(Operation::CreateSchema, &e));
            return out;
        }
    }

    let customer_id = match add_customer(
        conn,
        "Имя",
        "Фамилия",
        "имя_почтового_ящика@домен.ru",
        &["88005553535", "+78005553535"],
    ) {
        Ok(created) => {
            out.extend(report::customer_created(&created));
            created.id
        }
        Err(e) => {
            // Every later step needs the customer id
            out.push(report::failure(Operation::AddCustomer, &e));
            return out;
        }
    };

    search(conn, &CustomerFilter::new().first_name("Имя"), &mut out);

    let update = CustomerUpdate::new()
        .first_name("Новое Имя")
        .last_name("Новая Фамилия")
        .email("новое_имя_почтового_ящика@домен.ru")
        .phone("88888888888");
    match update_customer(conn, customer_id, &update, options.policy) {
        Ok(updated) => out.extend(report::customer_updated(&updated)),
        Err(e) => out.push(report::failure(Operation::UpdateCustomer, &e)),
    }

    match add_phone(conn, customer_id, "99999999999", options.policy) {
        Ok(phone) => out.push(report::phone_added(&phone)),
        Err(e) => out.push(report::failure(Operation::AddPhone, &e)),
    }

    let renamed = CustomerFilter::new().first_name("Новое Имя");
    search(conn, &renamed, &mut out);

    match delete_phone(conn, customer_id, "88888888888") {
        Ok(()) => out.push(report::phone_deleted(customer_id, "88888888888")),
        Err(e) => out.push(report::failure(Operation::DeletePhone, &e)),
    }

    search(conn, &renamed, &mut out);

    match delete_customer(conn, customer_id) {
        Ok(deleted) => out.push(report::customer_deleted(&deleted)),
        Err(e) => out.push(report::failure(Operation::DeleteCustomer, &e)),
    }

    search(conn, &renamed, &mut out);

    if options.dump_tables {
        for table in DirectoryTable::ALL {
            match dump_table(conn, table) {
                Ok(dump) => out.extend(dump.render().lines().map(String::from)),
                Err(e) => out.push(report::failure(Operation::DumpTable, &e)),
            }
        }
    }

    match clear_schema(conn) {
        Ok(()) => out.push(report::schema_cleared()),
        Err(e) => out.push(report::failure(Operation::ClearSchema, &e)),
    }

    out
}

fn search(conn: &Connection, filter: &CustomerFilter, out: &mut Vec<String>) {
    match find_customers(conn, filter) {
        Ok(records) => out.extend(report::search_results(&records)),
        Err(e) => out.push(report::failure(Operation::FindCustomers, &e)),
    }
}
