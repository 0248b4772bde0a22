//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    api_response::{ApiJson, ApiResponse},
    transaction::{Category, Transaction, TransactionType, core::create_transaction},
    user::{UserId, user_exists},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body for creating a transaction.
///
/// Every field is optional at the parsing stage so that missing fields can be
/// reported together with a validation error instead of a parse error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// The ID of the user recording the transaction.
    pub user_id: Option<String>,
    /// Either "income" or "expense".
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// The amount of money, must be greater than zero.
    pub amount: Option<f64>,
    /// The category to file the transaction under.
    pub category: Option<CategoryRequest>,
    /// Text detailing the transaction.
    pub description: Option<String>,
}

/// The category part of a [TransactionRequest].
#[derive(Debug, Default, Deserialize)]
pub struct CategoryRequest {
    pub id: Option<String>,
    pub name: Option<String>,
    pub icon: Option<String>,
}

const REQUIRED_FIELDS: &str = "userId, type, amount, and category";

/// A route handler for creating a new transaction.
///
/// Responds with 201 and the stored transaction on success. Fields are
/// checked in this order: presence of the required fields (400), existence
/// of the user (404), then the type, amount and category (400).
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    ApiJson(request): ApiJson<TransactionRequest>,
) -> Result<ApiResponse<Transaction>, Error> {
    let (Some(raw_user_id), Some(raw_type), Some(amount), Some(category)) = (
        non_empty(request.user_id),
        non_empty(request.transaction_type),
        request.amount,
        request.category,
    ) else {
        return Err(Error::MissingFields(REQUIRED_FIELDS));
    };

    let user_id = UserId::new(raw_user_id);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    if !user_exists(&user_id, &connection)? {
        return Err(Error::UserNotFound(user_id.to_string()));
    }

    let transaction_type: TransactionType = raw_type.parse()?;

    if !(amount.is_finite() && amount > 0.0) {
        return Err(Error::InvalidAmount(amount));
    }

    let category = validate_category(category)?;

    let builder = Transaction::build(user_id, transaction_type, amount, category)
        .description(non_empty(request.description));

    let transaction = create_transaction(builder, &connection).inspect_err(|error| {
        tracing::error!("could not create transaction: {error}");
    })?;

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        transaction,
        "Transaction created successfully",
    ))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn validate_category(category: CategoryRequest) -> Result<Category, Error> {
    match (
        non_empty(category.id),
        non_empty(category.name),
        non_empty(category.icon),
    ) {
        (Some(id), Some(name), Some(icon)) => Ok(Category { id, name, icon }),
        _ => Err(Error::InvalidCategory),
    }
}
