//! Admin accounts and the queries for log-in and remember-me tokens.

use std::fmt::Display;

use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::PasswordHash, error::is_unique_violation};

/// The database ID of an admin account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminId(i64);

impl AdminId {
    /// Create a new admin ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the admin ID as a 64-bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for AdminId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An admin who may log in to the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Admin {
    /// The ID of the admin.
    pub id: AdminId,
    /// The name the admin logs in with.
    pub username: String,
    /// The admin's hashed password.
    pub password_hash: PasswordHash,
}

/// Create the admin table.
///
/// # Errors
/// Returns an error if the table could not be created.
pub fn create_admin_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS admin (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            token TEXT
        )",
        (),
    )?;

    Ok(())
}

/// Insert an admin into the database.
///
/// # Errors
///
/// Returns [Error::DuplicateUsername] if the username is taken.
pub fn create_admin(
    username: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<Admin, Error> {
    connection
        .execute(
            "INSERT INTO admin (username, password) VALUES (?1, ?2)",
            (username, password_hash.to_string()),
        )
        .map_err(|error| {
            if is_unique_violation(&error, "admin.username") {
                Error::DuplicateUsername(username.to_owned())
            } else {
                error.into()
            }
        })?;

    let id = AdminId::new(connection.last_insert_rowid());

    Ok(Admin {
        id,
        username: username.to_owned(),
        password_hash,
    })
}

/// Get the admin with `username`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such admin.
pub fn get_admin_by_username(username: &str, connection: &Connection) -> Result<Admin, Error> {
    connection
        .prepare("SELECT id, username, password FROM admin WHERE username = :username")?
        .query_row(&[(":username", &username)], map_row)
        .map_err(|error| error.into())
}

/// Replace the stored remember-me token digest for `admin_id`.
///
/// Pass `None` to forget the token.
pub fn set_token_digest(
    admin_id: AdminId,
    token_digest: Option<&str>,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE admin SET token = ?1 WHERE id = ?2",
        (token_digest, admin_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Find the admin whose stored token digest equals `token_digest`.
pub fn get_admin_id_by_token_digest(
    token_digest: &str,
    connection: &Connection,
) -> Result<Option<AdminId>, Error> {
    connection
        .prepare("SELECT id FROM admin WHERE token = ?1")?
        .query_row([token_digest], |row| row.get(0).map(AdminId::new))
        .optional()
        .map_err(|error| error.into())
}

fn map_row(row: &Row) -> Result<Admin, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let username = row.get(1)?;
    let raw_password_hash: String = row.get(2)?;

    Ok(Admin {
        id: AdminId::new(raw_id),
        username,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}

#[cfg(test)]
mod admin_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::{
            PasswordHash,
            admin::{
                create_admin, create_admin_table, get_admin_by_username,
                get_admin_id_by_token_digest, set_token_digest,
            },
        },
    };

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_admin_table(&connection).expect("Could not create admin table");
        connection
    }

    #[test]
    fn create_admin_succeeds() {
        let connection = get_test_db_connection();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let admin = create_admin("admin", password_hash.clone(), &connection).unwrap();

        assert!(admin.id.as_i64() > 0);
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.password_hash, password_hash);
    }

    #[test]
    fn create_admin_fails_on_duplicate_username() {
        let connection = get_test_db_connection();
        create_admin("admin", PasswordHash::new_unchecked("a"), &connection).unwrap();

        let result = create_admin("admin", PasswordHash::new_unchecked("b"), &connection);

        assert_eq!(result, Err(Error::DuplicateUsername("admin".to_owned())));
    }

    #[test]
    fn get_admin_by_username_succeeds() {
        let connection = get_test_db_connection();
        let admin = create_admin("admin", PasswordHash::new_unchecked("a"), &connection).unwrap();

        assert_eq!(get_admin_by_username("admin", &connection), Ok(admin));
        assert_eq!(
            get_admin_by_username("nobody", &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn token_digest_round_trip() {
        let connection = get_test_db_connection();
        let admin = create_admin("admin", PasswordHash::new_unchecked("a"), &connection).unwrap();

        set_token_digest(admin.id, Some("abc123"), &connection).unwrap();

        assert_eq!(
            get_admin_id_by_token_digest("abc123", &connection),
            Ok(Some(admin.id))
        );
        assert_eq!(
            get_admin_id_by_token_digest("other", &connection),
            Ok(None)
        );

        set_token_digest(admin.id, None, &connection).unwrap();

        assert_eq!(
            get_admin_id_by_token_digest("abc123", &connection),
            Ok(None)
        );
    }
}
