//! Code for creating the user table and reading and writing the local user records.
//!
//! The identity provider is the system of record for users. The rows in this
//! table mirror the provider's users so that transactions can reference them.

use std::fmt::Display;

use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

use crate::{Error, PasswordHash, email::Email};

/// A newtype wrapper for user IDs.
///
/// User IDs are issued by the identity provider (e.g. "user_2abc...") and
/// shared with the local user record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The user ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID, shared with the identity provider.
    pub id: UserId,
    /// The user's full name.
    pub fullname: String,
    /// The user's email address, unique across users.
    pub email: Email,
    /// The local copy of the user's password hash.
    pub password_hash: PasswordHash,
    /// When the local user record was created.
    pub created_at: OffsetDateTime,
}

/// The data needed to create a local user record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The ID issued by the identity provider.
    pub id: UserId,
    /// The user's full name.
    pub fullname: String,
    /// The user's email address.
    pub email: Email,
    /// The local copy of the user's password hash.
    pub password_hash: PasswordHash,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id TEXT PRIMARY KEY,
                fullname TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// The creation time is set to the current time.
///
/// # Errors
///
/// Returns an [Error::EmailInUse] if another user already has the email, or an
/// [Error::SqlError] if any other SQL related error occurred, e.g. the ID is
/// already taken.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    let created_at = OffsetDateTime::now_utc();

    connection
        .execute(
            "INSERT INTO user (id, fullname, email, password, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                new_user.id.as_str(),
                &new_user.fullname,
                new_user.email.as_str(),
                new_user.password_hash.as_ref(),
                created_at,
            ),
        )
        .map_err(|error| match error {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("email") =>
            {
                Error::EmailInUse
            }
            error => error.into(),
        })?;

    Ok(User {
        id: new_user.id,
        fullname: new_user.fullname,
        email: new_user.email,
        password_hash: new_user.password_hash,
        created_at,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// Returns `None` if there is no such user.
///
/// # Errors
///
/// Returns a [Error::SqlError] if there was an error trying to access the store.
pub fn get_user_by_id(user_id: &UserId, connection: &Connection) -> Result<Option<User>, Error> {
    connection
        .prepare("SELECT id, fullname, email, password, created_at FROM user WHERE id = :id")?
        .query_row(&[(":id", user_id.as_str())], map_user_row)
        .optional()
        .map_err(|error| error.into())
}

/// Check whether a user with the ID `user_id` exists.
///
/// # Errors
///
/// Returns a [Error::SqlError] if there was an error trying to access the store.
pub fn user_exists(user_id: &UserId, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM user WHERE id = ?1)",
            (user_id.as_str(),),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Check whether `email` is already registered to a user.
///
/// # Errors
///
/// Returns a [Error::SqlError] if there was an error trying to access the store.
pub fn email_in_use(email: &Email, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM user WHERE email = ?1)",
            (email.as_str(),),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
#[cfg(test)]
pub fn count_users(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_id: String = row.get(0)?;
    let fullname = row.get(1)?;
    let raw_email: String = row.get(2)?;
    let raw_password_hash: String = row.get(3)?;
    let created_at: OffsetDateTime = row.get(4)?;

    Ok(User {
        id: UserId::new(raw_id),
        fullname,
        email: Email::new_unchecked(&raw_email),
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        created_at: created_at.to_offset(UtcOffset::UTC),
    })
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{
        Error, PasswordHash,
        db::initialize,
        email::Email,
        user::{NewUser, UserId, count_users, create_user, email_in_use, get_user_by_id, user_exists},
    };

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        initialize(&conn).expect("Could not initialize database");

        conn
    }

    fn new_user(id: &str, email: &str) -> NewUser {
        NewUser {
            id: UserId::new(id),
            fullname: "Jane Doe".to_owned(),
            email: Email::new_unchecked(email),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        }
    }

    #[test]
    fn insert_user_succeeds() {
        let db_connection = get_db_connection();

        let inserted_user =
            create_user(new_user("user_1", "jane@example.com"), &db_connection).unwrap();

        assert_eq!(inserted_user.id, UserId::new("user_1"));
        assert_eq!(inserted_user.fullname, "Jane Doe");
        assert_eq!(inserted_user.email.as_str(), "jane@example.com");
    }

    #[test]
    fn insert_user_fails_with_duplicate_email() {
        let db_connection = get_db_connection();
        create_user(new_user("user_1", "jane@example.com"), &db_connection).unwrap();

        let result = create_user(new_user("user_2", "jane@example.com"), &db_connection);

        assert_eq!(result, Err(Error::EmailInUse));
        assert_eq!(count_users(&db_connection).unwrap(), 1);
    }

    #[test]
    fn insert_user_fails_with_duplicate_id() {
        let db_connection = get_db_connection();
        create_user(new_user("user_1", "jane@example.com"), &db_connection).unwrap();

        let result = create_user(new_user("user_1", "john@example.com"), &db_connection);

        assert!(matches!(result, Err(Error::SqlError(_))), "got {result:?}");
    }

    #[test]
    fn get_user_returns_none_with_non_existent_id() {
        let db_connection = get_db_connection();

        let id = UserId::new("user_42");

        assert_eq!(get_user_by_id(&id, &db_connection), Ok(None));
    }

    #[test]
    fn get_user_succeeds_with_existing_id() {
        let db_connection = get_db_connection();
        let test_user =
            create_user(new_user("user_1", "jane@example.com"), &db_connection).unwrap();

        let retrieved_user = get_user_by_id(&test_user.id, &db_connection)
            .unwrap()
            .expect("user should exist");

        assert_eq!(retrieved_user.id, test_user.id);
        assert_eq!(retrieved_user.fullname, test_user.fullname);
        assert_eq!(retrieved_user.email, test_user.email);
        assert_eq!(retrieved_user.password_hash, test_user.password_hash);
        assert_eq!(
            retrieved_user.created_at.unix_timestamp(),
            test_user.created_at.unix_timestamp()
        );
    }

    #[test]
    fn user_exists_reports_presence() {
        let db_connection = get_db_connection();
        create_user(new_user("user_1", "jane@example.com"), &db_connection).unwrap();

        assert_eq!(user_exists(&UserId::new("user_1"), &db_connection), Ok(true));
        assert_eq!(user_exists(&UserId::new("user_2"), &db_connection), Ok(false));
    }

    #[test]
    fn email_in_use_reports_presence() {
        let db_connection = get_db_connection();
        create_user(new_user("user_1", "jane@example.com"), &db_connection).unwrap();

        assert_eq!(
            email_in_use(&Email::new_unchecked("jane@example.com"), &db_connection),
            Ok(true)
        );
        assert_eq!(
            email_in_use(&Email::new_unchecked("john@example.com"), &db_connection),
            Ok(false)
        );
    }

    #[test]
    fn returns_correct_count() {
        let db_connection = get_db_connection();

        let count = count_users(&db_connection).expect("Could not get user count");
        assert_eq!(0, count, "Want zero users before insertion, got {count}");

        create_user(new_user("user_1", "jane@example.com"), &db_connection).unwrap();

        let count = count_users(&db_connection).expect("Could not get user count");
        assert_eq!(1, count, "Want one user after insertion, got {count}");
    }
}
