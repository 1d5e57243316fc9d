//! Customer search with per-customer phone aggregation.

use super::{supplied, CustomerRecord};
use crate::core::db::register_functions;
use crate::core::Result;
use rusqlite::{params_from_iter, Connection};
use serde::Deserialize;
use tracing::debug;

/// Search criteria. Every supplied, non-empty criterion must match as a
/// case-insensitive substring, whitespace included; absent or empty
/// criteria are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerFilter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    /// Matches any of the customer's phones
    pub phone: Option<String>,
}

impl CustomerFilter {
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

    /// Returns the WHERE clause and its parameters.
    fn where_clause(&self) -> (String, Vec<String>) {
        let criteria = [
            ("c.first_name", supplied(&self.first_name)),
            ("c.last_name", supplied(&self.last_name)),
            ("c.email", supplied(&self.email)),
            ("p.phone", supplied(&self.phone)),
        ];

        let mut clause = String::from("WHERE 1 = 1");
        let mut params = Vec::new();
        for (column, value) in criteria {
            if let Some(value) = value {
                params.push(value.to_string());
                clause.push_str(&format!(" AND contains_ci({}, ?{})", column, params.len()));
            }
        }
        (clause, params)
    }
}

/// One element of the aggregated phone list; both fields are null for a
/// customer without phones.
#[derive(Debug, Deserialize)]
struct AggregatedPhone {
    id: Option<i64>,
    phone: Option<String>,
}

/// Finds customers matching `filter`, ordered by id.
///
/// Customers without phones are included unless a phone criterion is
/// given. Each record lists the customer's phones that satisfied the
/// filter, in insertion order. An empty result means no customer matched.
pub fn find_customers(conn: &Connection, filter: &CustomerFilter) -> Result<Vec<CustomerRecord>> {
    register_functions(conn)?;

    let (clause, params) = filter.where_clause();
    let sql = format!(
        "SELECT c.id, c.first_name, c.last_name, c.email,
                json_group_array(json_object('id', p.id, 'phone', p.phone))
         FROM customers c
         LEFT JOIN phones p ON p.customer_id = c.id
         {}
         GROUP BY c.id
         ORDER BY c.id",
        clause
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            Ok((
                CustomerRecord {
                    id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    email: row.get(3)?,
                    phones: Vec::new(),
                },
                row.get::<_, String>(4)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut records = Vec::with_capacity(rows.len());
    for (mut record, aggregated) in rows {
        let mut phones: Vec<AggregatedPhone> = serde_json::from_str(&aggregated)?;
        phones.sort_by_key(|p| p.id);
        record.phones = phones.into_iter().filter_map(|p| p.phone).collect();
        records.push(record);
    }

    debug!("Search {:?} matched {} customer(s)", filter, records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::{create_schema, open_in_memory};
    use crate::directory::{add_customer, add_phone, ValidationPolicy};

    fn setup() -> Connection {
        let conn = open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        add_customer(&conn, "Имя", "Фамилия", "x@y.ru", &["88005553535"]).unwrap();
        add_customer(&conn, "Ann", "Lee", "ann@lee.io", &["+78005553535", "99999999999"]).unwrap();
        add_customer(&conn, "Bob", "Leeds", "bob@leeds.co.uk", &[]).unwrap();
        conn
    }

    fn ids(records: &[CustomerRecord]) -> Vec<i64> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_find_by_first_name_prefix() {
        let conn = setup();
        let found = find_customers(&conn, &CustomerFilter::new().first_name("Им")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].first_name, "Имя");
        assert_eq!(found[0].phones, vec!["88005553535"]);

        let none = find_customers(&conn, &CustomerFilter::new().first_name("zzz")).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_find_is_case_insensitive_for_unicode() {
        let conn = setup();
        let found = find_customers(&conn, &CustomerFilter::new().last_name("фАМ")).unwrap();
        assert_eq!(ids(&found), vec![1]);

        let found = find_customers(&conn, &CustomerFilter::new().first_name("ANN")).unwrap();
        assert_eq!(ids(&found), vec![2]);
    }

    #[test]
    fn test_empty_filter_returns_everyone() {
        let conn = setup();
        let found = find_customers(&conn, &CustomerFilter::new()).unwrap();
        assert_eq!(ids(&found), vec![1, 2, 3]);

        // Customers without phones get an empty list, not a null entry
        assert!(found[2].phones.is_empty());
        assert_eq!(found[1].phones, vec!["+78005553535", "99999999999"]);
    }

    #[test]
    fn test_empty_criteria_are_ignored() {
        let conn = setup();
        let filter = CustomerFilter::new().first_name("").email("");
        assert_eq!(ids(&find_customers(&conn, &filter).unwrap()), vec![1, 2, 3]);
    }

    #[test]
    fn test_criteria_whitespace_is_significant() {
        let conn = open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        add_customer(&conn, "Новое Имя", "Фамилия", "new@x.ru", &[]).unwrap();
        add_customer(&conn, "Имярек", "Фамилия", "any@x.ru", &[]).unwrap();

        let found = find_customers(&conn, &CustomerFilter::new().first_name(" Имя")).unwrap();
        let names: Vec<&str> = found.iter().map(|r| r.first_name.as_str()).collect();
        assert_eq!(names, vec!["Новое Имя"]);

        let found = find_customers(&conn, &CustomerFilter::new().first_name(" ")).unwrap();
        assert_eq!(ids(&found), vec![1]);
    }

    #[test]
    fn test_criteria_are_conjunctive() {
        let conn = setup();
        let found = find_customers(&conn, &CustomerFilter::new().last_name("lee")).unwrap();
        assert_eq!(ids(&found), vec![2, 3]);

        let found = find_customers(
            &conn,
            &CustomerFilter::new().last_name("lee").email(".co.uk"),
        )
        .unwrap();
        assert_eq!(ids(&found), vec![3]);
    }

    #[test]
    fn test_find_by_phone_aggregates_matching_phones() {
        let conn = setup();
        let found = find_customers(&conn, &CustomerFilter::new().phone("9999")).unwrap();
        assert_eq!(ids(&found), vec![2]);
        assert_eq!(found[0].phones, vec!["99999999999"]);

        // A phone criterion excludes customers with no phones
        let found = find_customers(&conn, &CustomerFilter::new().phone("8")).unwrap();
        assert_eq!(ids(&found), vec![1, 2]);
    }

    #[test]
    fn test_phones_keep_insertion_order() {
        let conn = setup();
        add_phone(&conn, 3, "33333333333", ValidationPolicy::Lenient).unwrap();
        add_phone(&conn, 3, "11111111111", ValidationPolicy::Lenient).unwrap();
        add_phone(&conn, 3, "22222222222", ValidationPolicy::Lenient).unwrap();

        let found = find_customers(&conn, &CustomerFilter::new().first_name("Bob")).unwrap();
        assert_eq!(
            found[0].phones,
            vec!["33333333333", "11111111111", "22222222222"]
        );
    }

    #[test]
    fn test_wildcards_match_literally() {
        let conn = setup();
        assert!(find_customers(&conn, &CustomerFilter::new().first_name("%"))
            .unwrap()
            .is_empty());
        assert!(find_customers(&conn, &CustomerFilter::new().email("_"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_find_on_unconfigured_connection() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        add_customer(&conn, "Ann", "Lee", "ann@lee.io", &[]).unwrap();

        let found = find_customers(&conn, &CustomerFilter::new().first_name("an")).unwrap();
        assert_eq!(ids(&found), vec![1]);
    }
}
