//! Creates the application's database schema.

use rusqlite::{Connection, Row};

use crate::{
    auth::create_admin_table, category::create_category_table, product::create_product_table,
    statistics::create_statistics_table,
};

/// Create the all of the database tables for the application.
///
/// Foreign key enforcement is switched on for `connection` first, since
/// SQLite leaves it off by default.
///
/// # Errors
/// This function may return a [rusqlite::Error] if something went wrong creating the tables.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = connection.unchecked_transaction()?;

    create_category_table(&transaction)?;
    create_product_table(&transaction)?;
    create_admin_table(&transaction)?;
    create_statistics_table(&transaction)?;

    transaction.commit()
}

/// Read a non-negative count from the first column of `row`.
///
/// # Errors
/// Returns [rusqlite::Error::IntegralValueOutOfRange] if the value is negative.
pub(crate) fn count_from_row(row: &Row) -> Result<u64, rusqlite::Error> {
    let count: i64 = row.get(0)?;

    u64::try_from(count).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, count))
}
