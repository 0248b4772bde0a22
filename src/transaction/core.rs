//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

use crate::{Error, database_id::TransactionId, user::UserId};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    /// The lowercase name used in JSON and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// The category a transaction is filed under, chosen by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// The client's identifier for the category.
    pub id: String,
    /// The display name, also used to group transactions on the dashboard.
    pub name: String,
    /// The name of the icon the client displays for the category.
    pub icon: String,
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// Transactions are immutable once stored. To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that recorded the transaction.
    pub user_id: UserId,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The amount of money spent or earned, always greater than zero.
    pub amount: f64,
    /// The category the transaction is filed under.
    pub category: Category,
    /// A text description of what the transaction was for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last written.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        user_id: UserId,
        transaction_type: TransactionType,
        amount: f64,
        category: Category,
    ) -> TransactionBuilder {
        TransactionBuilder {
            user_id,
            transaction_type,
            amount,
            category,
            description: None,
            created_at: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// Pass the builder to [create_transaction] to store the transaction and get
/// back the stored record.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The user the transaction belongs to.
    pub user_id: UserId,

    /// Whether the transaction is income or an expense.
    pub transaction_type: TransactionType,

    /// The monetary amount of the transaction.
    ///
    /// Must be greater than zero, the direction of the money is given by
    /// `transaction_type`.
    pub amount: f64,

    /// The category of the transaction, e.g. "Groceries", "Transport", "Rent".
    pub category: Category,

    /// An optional human-readable description of the transaction.
    pub description: Option<String>,

    /// When the transaction was recorded.
    ///
    /// Defaults to the time the transaction is stored. Only tools that seed
    /// data set this explicitly.
    pub created_at: Option<OffsetDateTime>,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Set the creation time for the transaction.
    pub fn created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// The creation and update times are set to the current time unless the builder
/// specifies a creation time. Times are stored in UTC.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is not a positive, finite number,
/// - or [Error::SqlError] if there is some SQL error, e.g. the user does not exist.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if !(builder.amount.is_finite() && builder.amount > 0.0) {
        return Err(Error::InvalidAmount(builder.amount));
    }

    let now = OffsetDateTime::now_utc();
    let created_at = builder.created_at.unwrap_or(now).to_offset(UtcOffset::UTC);

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\"
                (user_id, type, amount, category_id, category_name, category_icon, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING id, user_id, type, amount, category_id, category_name, category_icon, description, created_at, updated_at",
        )?
        .query_row(
            (
                builder.user_id.as_str(),
                builder.transaction_type,
                builder.amount,
                &builder.category.id,
                &builder.category.name,
                &builder.category.icon,
                &builder.description,
                created_at,
                now,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve every transaction recorded by `user_id`, oldest first.
///
/// An unknown user has no transactions, so this returns an empty vector rather
/// than an error.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_transactions_by_user(
    user_id: &UserId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, type, amount, category_id, category_name, category_icon, description, created_at, updated_at
             FROM \"transaction\"
             WHERE user_id = :user_id
             ORDER BY created_at ASC, id ASC",
        )?
        .query_map(&[(":user_id", user_id.as_str())], map_transaction_row)?
        .collect::<Result<Vec<Transaction>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is no such
/// transaction or some other SQL error occurred.
#[cfg(test)]
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, user_id, type, amount, category_id, category_name, category_icon, description, created_at, updated_at
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)
        .map_err(|error| error.into())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                amount REAL NOT NULL CHECK (amount > 0),
                category_id TEXT NOT NULL,
                category_name TEXT NOT NULL,
                category_icon TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Indexes used by the dashboard queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_created_at ON \"transaction\"(user_id, created_at);",
        (),
    )?;
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_type ON \"transaction\"(user_id, type);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id: String = row.get(1)?;
    let transaction_type = row.get(2)?;
    let amount = row.get(3)?;
    let category = Category {
        id: row.get(4)?,
        name: row.get(5)?,
        icon: row.get(6)?,
    };
    let description = row.get(7)?;
    let created_at: OffsetDateTime = row.get(8)?;
    let updated_at: OffsetDateTime = row.get(9)?;

    Ok(Transaction {
        id,
        user_id: UserId::new(raw_user_id),
        transaction_type,
        amount,
        category,
        description,
        created_at: created_at.to_offset(UtcOffset::UTC),
        updated_at: updated_at.to_offset(UtcOffset::UTC),
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        Error,
        test_utils::{create_test_user, food_category, get_test_connection},
        transaction::{
            Transaction, TransactionType, count_transactions, create_transaction,
            get_transactions_by_user,
        },
        user::UserId,
    };

    fn connection_with_user() -> (Connection, UserId) {
        let conn = get_test_connection();
        let user_id = create_test_user("user_1", "jane@example.com", &conn);

        (conn, user_id)
    }

    #[test]
    fn create_succeeds() {
        let (conn, user_id) = connection_with_user();
        let amount = 12.3;

        let result = create_transaction(
            Transaction::build(user_id.clone(), TransactionType::Expense, amount, food_category())
                .description(Some("Lunch".to_owned())),
            &conn,
        );

        match result {
            Ok(transaction) => {
                assert_eq!(transaction.amount, amount);
                assert_eq!(transaction.user_id, user_id);
                assert_eq!(transaction.transaction_type, TransactionType::Expense);
                assert_eq!(transaction.category, food_category());
                assert_eq!(transaction.description.as_deref(), Some("Lunch"));
                assert!(transaction.id > 0);
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn create_assigns_timestamps() {
        let (conn, user_id) = connection_with_user();
        let before = time::OffsetDateTime::now_utc();

        let transaction = create_transaction(
            Transaction::build(user_id, TransactionType::Income, 10.0, food_category()),
            &conn,
        )
        .unwrap();

        assert!(transaction.created_at >= before - time::Duration::seconds(1));
        assert_eq!(transaction.created_at, transaction.updated_at);
    }

    #[test]
    fn create_keeps_explicit_creation_time() {
        let (conn, user_id) = connection_with_user();
        let created_at = datetime!(2025-03-01 08:30 UTC);

        let transaction = create_transaction(
            Transaction::build(user_id, TransactionType::Income, 10.0, food_category())
                .created_at(created_at),
            &conn,
        )
        .unwrap();

        assert_eq!(transaction.created_at, created_at);
    }

    #[test]
    fn create_fails_on_non_positive_amount() {
        let (conn, user_id) = connection_with_user();

        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let result = create_transaction(
                Transaction::build(user_id.clone(), TransactionType::Expense, amount, food_category()),
                &conn,
            );

            assert!(
                matches!(result, Err(Error::InvalidAmount(_))),
                "want invalid amount error for {amount}, got {result:?}"
            );
        }

        assert_eq!(count_transactions(&conn).unwrap(), 0);
    }

    #[test]
    fn create_fails_on_unknown_user() {
        let conn = get_test_connection();

        let result = create_transaction(
            Transaction::build(
                UserId::new("user_404"),
                TransactionType::Expense,
                1.0,
                food_category(),
            ),
            &conn,
        );

        assert!(matches!(result, Err(Error::SqlError(_))), "got {result:?}");
        assert_eq!(count_transactions(&conn).unwrap(), 0);
    }

    #[test]
    fn get_by_user_returns_only_that_users_transactions_in_order() {
        let (conn, user_id) = connection_with_user();
        let other_user = create_test_user("user_2", "john@example.com", &conn);
        let later = datetime!(2025-03-02 08:30 UTC);
        let earlier = datetime!(2025-03-01 08:30 UTC);
        create_transaction(
            Transaction::build(user_id.clone(), TransactionType::Income, 2.0, food_category())
                .created_at(later),
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(user_id.clone(), TransactionType::Expense, 1.0, food_category())
                .created_at(earlier),
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(other_user, TransactionType::Income, 3.0, food_category()),
            &conn,
        )
        .unwrap();

        let transactions = get_transactions_by_user(&user_id, &conn).unwrap();

        let amounts: Vec<f64> = transactions.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![1.0, 2.0]);
        assert!(transactions.iter().all(|t| t.user_id == user_id));
    }

    #[test]
    fn get_by_user_returns_empty_for_unknown_user() {
        let conn = get_test_connection();

        let transactions = get_transactions_by_user(&UserId::new("nobody"), &conn).unwrap();

        assert!(transactions.is_empty());
    }

    #[test]
    fn get_count() {
        let (conn, user_id) = connection_with_user();
        let want_count = 20;
        for i in 1..=want_count {
            create_transaction(
                Transaction::build(user_id.clone(), TransactionType::Income, i as f64, food_category()),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let got_count = count_transactions(&conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }
}

#[cfg(test)]
mod model_tests {
    use serde_json::json;
    use time::macros::datetime;

    use crate::{
        Error,
        test_utils::food_category,
        transaction::{Transaction, TransactionType},
        user::UserId,
    };

    #[test]
    fn parses_transaction_types() {
        assert_eq!("income".parse(), Ok(TransactionType::Income));
        assert_eq!("expense".parse(), Ok(TransactionType::Expense));
        assert_eq!(
            "Income".parse::<TransactionType>(),
            Err(Error::InvalidTransactionType("Income".to_owned()))
        );
    }

    #[test]
    fn serializes_with_camel_case_and_type_field() {
        let transaction = Transaction {
            id: 7,
            user_id: UserId::new("user_1"),
            transaction_type: TransactionType::Expense,
            amount: 40.0,
            category: food_category(),
            description: None,
            created_at: datetime!(2025-03-01 08:30 UTC),
            updated_at: datetime!(2025-03-01 08:30 UTC),
        };

        let value = serde_json::to_value(&transaction).unwrap();

        assert_eq!(
            value,
            json!({
                "id": 7,
                "userId": "user_1",
                "type": "expense",
                "amount": 40.0,
                "category": {"id": "food", "name": "Food", "icon": "utensils"},
                "createdAt": "2025-03-01T08:30:00Z",
                "updatedAt": "2025-03-01T08:30:00Z",
            })
        );
    }
}
