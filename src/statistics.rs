//! Site wide counters, currently only the number of home page views.

use rusqlite::Connection;

use crate::Error;

/// Create the statistics table with its single row.
///
/// # Errors
/// Returns an error if the table could not be created.
pub fn create_statistics_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS statistics (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            home_view_count INTEGER NOT NULL DEFAULT 0
        )",
        (),
    )?;

    connection.execute(
        "INSERT OR IGNORE INTO statistics (id, home_view_count) VALUES (1, 0)",
        (),
    )?;

    Ok(())
}

/// Add one to the home page view count.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn increment_home_view_count(connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "UPDATE statistics SET home_view_count = home_view_count + 1 WHERE id = 1",
        (),
    )?;

    Ok(())
}

/// Overwrite the home page view count.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn set_home_view_count(count: u64, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "UPDATE statistics SET home_view_count = ?1 WHERE id = 1",
        [count as i64],
    )?;

    Ok(())
}

/// The number of times the home page has been viewed.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn get_home_view_count(connection: &Connection) -> Result<u64, Error> {
    let count: i64 = connection.query_row(
        "SELECT home_view_count FROM statistics WHERE id = 1",
        [],
        |row| row.get(0),
    )?;

    Ok(count.max(0) as u64)
}
