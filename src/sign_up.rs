//! The sign-up endpoint.
//!
//! Signing up writes to two systems that share no transaction: the identity
//! provider and the local user table. The identity is created first. If the
//! local record cannot be saved afterwards, the identity is deleted again so
//! that the provider does not keep a user the application knows nothing about.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error, PasswordHash,
    api_response::{ApiJson, ApiResponse},
    config::PASSWORD_HASH_COST,
    email::Email,
    identity::{IdentityProvider, NewIdentity},
    user::{NewUser, User, UserId, create_user, email_in_use},
};

/// The state needed to sign up a user.
#[derive(Debug, Clone)]
pub struct SignUpState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The provider that owns the user's credentials.
    pub identity_provider: Arc<dyn IdentityProvider>,
}

impl FromRef<AppState> for SignUpState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            identity_provider: state.identity_provider.clone(),
        }
    }
}

/// The JSON body for signing up.
#[derive(Debug, Default, Deserialize)]
pub struct SignUpRequest {
    pub fullname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// The user returned after a successful sign-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    pub id: UserId,
    /// The ID at the identity provider, always equal to `id`.
    pub clerk_id: UserId,
    pub fullname: String,
    pub email: Email,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for SignUpResponse {
    fn from(user: User) -> Self {
        Self {
            clerk_id: user.id.clone(),
            id: user.id,
            fullname: user.fullname,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

const REQUIRED_FIELDS: &str = "fullname, email, and password";

/// A route handler for signing up a new user.
///
/// Responds with 201 and the new user on success, 400 for missing fields or
/// a malformed email, 409 if the email is already registered and 500 if the
/// identity provider or the local store failed.
pub async fn sign_up(
    State(state): State<SignUpState>,
    ApiJson(request): ApiJson<SignUpRequest>,
) -> Result<ApiResponse<SignUpResponse>, Error> {
    let (Some(fullname), Some(raw_email), Some(password)) = (
        request.fullname.filter(|value| !value.trim().is_empty()),
        request.email.filter(|value| !value.trim().is_empty()),
        request.password.filter(|value| !value.is_empty()),
    ) else {
        return Err(Error::MissingFields(REQUIRED_FIELDS));
    };

    let fullname = fullname.trim().to_owned();
    let email = Email::new(&raw_email)?;

    {
        let connection = lock_connection(&state.db_connection)?;
        if email_in_use(&email, &connection)? {
            return Err(Error::EmailInUse);
        }
    }

    let identity = NewIdentity::from_fullname(&fullname, email.clone(), &password);
    let id = state
        .identity_provider
        .create_identity(&identity)
        .await
        .inspect_err(|error| tracing::error!("could not create identity: {error}"))?;

    match save_local_user(id.clone(), fullname, email, &password, &state.db_connection) {
        Ok(user) => Ok(ApiResponse::success(
            StatusCode::CREATED,
            SignUpResponse::from(user),
            "User created successfully",
        )),
        Err(error) => {
            tracing::error!("could not save local user {id}: {error}");
            compensate(state.identity_provider.as_ref(), &id).await;

            Err(Error::RegistrationIncomplete)
        }
    }
}

/// Hash the password and insert the local user record.
fn save_local_user(
    id: UserId,
    fullname: String,
    email: Email,
    password: &str,
    db_connection: &Mutex<Connection>,
) -> Result<User, Error> {
    let password_hash = PasswordHash::new(password, PASSWORD_HASH_COST)?;
    let new_user = NewUser {
        id,
        fullname,
        email,
        password_hash,
    };

    let connection = lock_connection(db_connection)?;
    create_user(new_user, &connection)
}

/// Delete the identity created for a sign-up that could not be completed.
///
/// Failure is logged and otherwise ignored.
async fn compensate(identity_provider: &dyn IdentityProvider, id: &UserId) {
    match identity_provider.delete_identity(id).await {
        Ok(()) => tracing::info!("deleted identity {id} after failed sign-up"),
        Err(error) => tracing::warn!(
            "could not delete identity {id} after failed sign-up, it is now orphaned \
            at the identity provider and must be removed manually: {error}"
        ),
    }
}

fn lock_connection(
    db_connection: &Mutex<Connection>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
}
