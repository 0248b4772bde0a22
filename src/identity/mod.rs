//! The external identity provider that owns user credentials and sessions.
//!
//! The application only creates identities at sign-up and deletes them again
//! when the local user record cannot be saved.

mod clerk;

pub use clerk::ClerkClient;

use std::fmt::Debug;

use async_trait::async_trait;

use crate::{Error, email::Email, user::UserId};

/// The details sent to the identity provider when signing a user up.
#[derive(Clone, PartialEq)]
pub struct NewIdentity {
    /// The first whitespace separated word of the full name.
    pub first_name: String,
    /// The rest of the full name, empty for single word names.
    pub last_name: String,
    /// The address the provider registers as the primary email.
    pub email: Email,
    /// The plain text password, the provider hashes it on its side.
    pub password: String,
}

impl NewIdentity {
    /// Split `fullname` into a first and last name.
    ///
    /// "Mary Jane Watson" gives the first name "Mary" and last name "Jane Watson".
    pub fn from_fullname(fullname: &str, email: Email, password: &str) -> Self {
        let mut words = fullname.split_whitespace();
        let first_name = words.next().unwrap_or_default().to_owned();
        let last_name = words.collect::<Vec<_>>().join(" ");

        Self {
            first_name,
            last_name,
            email,
            password: password.to_owned(),
        }
    }
}

impl Debug for NewIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewIdentity")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Creates and deletes user identities at an external provider.
#[async_trait]
pub trait IdentityProvider: Debug + Send + Sync {
    /// Register a new identity and return the ID the provider issued for it.
    ///
    /// # Errors
    /// Returns [Error::IdentityProvider] if the provider could not be reached
    /// or rejected the request.
    async fn create_identity(&self, identity: &NewIdentity) -> Result<UserId, Error>;

    /// Delete the identity with `id`.
    ///
    /// # Errors
    /// Returns [Error::IdentityProvider] if the provider could not be reached
    /// or rejected the request.
    async fn delete_identity(&self, id: &UserId) -> Result<(), Error>;
}
