//! An [IdentityProvider] backed by Clerk's backend API.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    config::{IDENTITY_PROVIDER_CONNECT_TIMEOUT, IDENTITY_PROVIDER_TIMEOUT},
    identity::{IdentityProvider, NewIdentity},
    user::UserId,
};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// The body of a create user request.
#[derive(Debug, Serialize)]
struct CreateUserRequest<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email_address: [&'a str; 1],
    password: &'a str,
    public_metadata: PublicMetadata<'a>,
}

/// Profile details copied into the user's public metadata at Clerk.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PublicMetadata<'a> {
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
}

/// The part of Clerk's user object the application needs.
#[derive(Debug, Deserialize)]
struct ClerkUser {
    id: String,
}

/// A client for the Clerk backend API.
#[derive(Clone)]
pub struct ClerkClient {
    base_url: String,
    secret_key: String,
    client: Client,
}

impl ClerkClient {
    /// Create a client for the API at `base_url`, e.g. "https://api.clerk.com/v1",
    /// authenticating with the instance's `secret_key`.
    ///
    /// # Errors
    /// Returns [Error::IdentityProvider] if the HTTP client could not be built.
    pub fn new(base_url: &str, secret_key: String) -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(IDENTITY_PROVIDER_TIMEOUT)
            .connect_timeout(IDENTITY_PROVIDER_CONNECT_TIMEOUT)
            .build()
            .map_err(|error| {
                Error::IdentityProvider(format!("could not build HTTP client: {error}"))
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            secret_key,
            client,
        })
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.base_url)
    }
}

impl std::fmt::Debug for ClerkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClerkClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl IdentityProvider for ClerkClient {
    async fn create_identity(&self, identity: &NewIdentity) -> Result<UserId, Error> {
        let request = CreateUserRequest {
            first_name: &identity.first_name,
            last_name: &identity.last_name,
            email_address: [identity.email.as_str()],
            password: &identity.password,
            public_metadata: PublicMetadata {
                email: identity.email.as_str(),
                first_name: &identity.first_name,
                last_name: &identity.last_name,
            },
        };

        let response = self
            .client
            .post(self.users_url())
            .bearer_auth(&self.secret_key)
            .json(&request)
            .send()
            .await
            .map_err(|error| {
                Error::IdentityProvider(format!("create user request failed: {error}"))
            })?;

        let user: ClerkUser = check_status(response)
            .await?
            .json()
            .await
            .map_err(|error| {
                Error::IdentityProvider(format!("could not parse created user: {error}"))
            })?;

        Ok(UserId::new(user.id))
    }

    async fn delete_identity(&self, id: &UserId) -> Result<(), Error> {
        let response = self
            .client
            .delete(format!("{}/{}", self.users_url(), id))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|error| {
                Error::IdentityProvider(format!("delete user request failed: {error}"))
            })?;

        check_status(response).await?;

        Ok(())
    }
}

/// Turn a non-success response into an error holding the status and body.
async fn check_status(response: Response) -> Result<Response, Error> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_owned());

    Err(Error::IdentityProvider(format!("Clerk API error ({status}): {body}")))
}
