//! Defines the app level error type and its conversion to the JSON response envelope.
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api_response::ApiResponse;

/// The broad classes of failure, each of which maps to one HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed client input.
    Validation,
    /// A resource referenced by the request does not exist.
    NotFound,
    /// The request clashes with existing data, e.g. a duplicate email.
    Conflict,
    /// The external identity provider rejected or failed a request.
    UpstreamAuth,
    /// The store or some other part of the server failed unexpectedly.
    Internal,
}

impl ErrorKind {
    /// The HTTP status code used when reporting this kind of error.
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::UpstreamAuth | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// One or more required fields were missing or empty.
    ///
    /// Holds a human readable list of the required fields, e.g.
    /// "fullname, email, and password".
    #[error("missing required fields, expected {0}")]
    MissingFields(&'static str),

    /// The request body could not be parsed as the expected JSON document.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// The email address given at sign-up is not shaped like an email address.
    #[error("{0} is not a valid email address")]
    InvalidEmail(String),

    /// The transaction type was not one of "income" or "expense".
    #[error("invalid transaction type {0:?}")]
    InvalidTransactionType(String),

    /// The transaction amount was zero, negative or not finite.
    #[error("amount must be a positive number, got {0}")]
    InvalidAmount(f64),

    /// The transaction category was missing its ID, name or icon.
    #[error("category must include a non-empty id, name, and icon")]
    InvalidCategory,

    /// The user referenced by the request does not exist.
    #[error("the user {0:?} does not exist")]
    UserNotFound(String),

    /// The email address is already registered to another user.
    #[error("the email address is already in use")]
    EmailInUse,

    /// A request to the identity provider failed.
    ///
    /// The string holds the upstream details and should only be logged.
    #[error("identity provider request failed: {0}")]
    IdentityProvider(String),

    /// The identity was created at the identity provider, but the local user
    /// record could not be saved.
    #[error("the local user record could not be created")]
    RegistrationIncomplete,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl Error {
    /// The class of failure this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingFields(_)
            | Error::MalformedBody(_)
            | Error::InvalidEmail(_)
            | Error::InvalidTransactionType(_)
            | Error::InvalidAmount(_)
            | Error::InvalidCategory => ErrorKind::Validation,
            Error::UserNotFound(_) => ErrorKind::NotFound,
            Error::EmailInUse => ErrorKind::Conflict,
            Error::IdentityProvider(_) => ErrorKind::UpstreamAuth,
            Error::RegistrationIncomplete
            | Error::HashingError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::InvalidTimezoneError(_) => ErrorKind::Internal,
        }
    }

    /// A short summary of the error that is safe to show to the client.
    fn title(&self) -> &'static str {
        match self {
            Error::MissingFields(_) => "Missing required fields",
            Error::MalformedBody(_) => "Malformed request body",
            Error::InvalidEmail(_) => "Invalid email address",
            Error::InvalidTransactionType(_) => "Invalid transaction type",
            Error::InvalidAmount(_) => "Invalid amount",
            Error::InvalidCategory => "Invalid category format",
            Error::UserNotFound(_) => "User not found",
            Error::EmailInUse => "Email already in use",
            Error::IdentityProvider(_) => "Failed to create user authentication",
            _ => "Internal server error",
        }
    }

    /// A description of how the client can fix the request, or a generic
    /// message for server side failures.
    fn client_message(&self) -> String {
        match self {
            Error::MissingFields(fields) => format!("Please provide {fields}"),
            Error::MalformedBody(details) => details.clone(),
            Error::InvalidEmail(email) => format!("{email} is not a valid email address"),
            Error::InvalidTransactionType(_) => {
                "Transaction type must be either 'income' or 'expense'".to_owned()
            }
            Error::InvalidAmount(_) => "Amount must be a positive number".to_owned(),
            Error::InvalidCategory => {
                "Category must include id, name, and icon as strings".to_owned()
            }
            Error::UserNotFound(_) => "The specified user does not exist".to_owned(),
            Error::EmailInUse => "An account with this email address already exists".to_owned(),
            Error::IdentityProvider(_) => "Could not complete registration".to_owned(),
            Error::RegistrationIncomplete => {
                "Something went wrong during registration".to_owned()
            }
            _ => "An unexpected error occurred, check the server logs for more details.".to_owned(),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let kind = self.kind();

        // Upstream and internal details are not intended to be shown to the client.
        if matches!(kind, ErrorKind::UpstreamAuth | ErrorKind::Internal) {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        ApiResponse::<()>::failure(kind.status_code(), self.title(), &self.client_message())
            .into_response()
    }
}
