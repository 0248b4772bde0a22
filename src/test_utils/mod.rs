#![allow(missing_docs)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use rusqlite::Connection;

use crate::{
    AppState, Error, PasswordHash,
    db::initialize,
    email::Email,
    identity::{IdentityProvider, NewIdentity},
    transaction::Category,
    user::{NewUser, UserId, create_user},
};

/// An [IdentityProvider] that keeps identities in memory.
///
/// Issues the IDs "user_1", "user_2", ... in order and records every created
/// and deleted identity.
#[derive(Debug, Default)]
pub struct FakeIdentityProvider {
    next_id: AtomicUsize,
    pub fail_create: AtomicBool,
    pub fail_delete: AtomicBool,
    pub created: Mutex<Vec<NewIdentity>>,
    pub deleted: Mutex<Vec<UserId>>,
}

impl FakeIdentityProvider {
    pub fn failing_create() -> Self {
        let provider = Self::default();
        provider.fail_create.store(true, Ordering::SeqCst);
        provider
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub fn deleted_ids(&self) -> Vec<UserId> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn create_identity(&self, identity: &NewIdentity) -> Result<UserId, Error> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Error::IdentityProvider(
                "422 Unprocessable Entity: password has been found in a breach".to_owned(),
            ));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.created.lock().unwrap().push(identity.clone());

        Ok(UserId::new(format!("user_{id}")))
    }

    async fn delete_identity(&self, id: &UserId) -> Result<(), Error> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Error::IdentityProvider("503 Service Unavailable".to_owned()));
        }

        self.deleted.lock().unwrap().push(id.clone());

        Ok(())
    }
}

pub fn get_test_connection() -> Connection {
    let conn = Connection::open_in_memory().expect("Could not open in-memory database");
    initialize(&conn).expect("Could not initialize database");
    conn
}

pub fn get_test_app_state(identity_provider: Arc<FakeIdentityProvider>) -> AppState {
    let conn = Connection::open_in_memory().expect("Could not open in-memory database");

    AppState::new(conn, identity_provider, "Etc/UTC").expect("Could not create app state")
}

/// Insert a local user directly, bypassing the identity provider.
pub fn create_test_user(id: &str, email: &str, connection: &Connection) -> UserId {
    create_user(
        NewUser {
            id: UserId::new(id),
            fullname: "Test User".to_owned(),
            email: Email::new_unchecked(email),
            password_hash: PasswordHash::new_unchecked("not a real hash"),
        },
        connection,
    )
    .expect("Could not create test user")
    .id
}

pub fn food_category() -> Category {
    Category {
        id: "food".to_owned(),
        name: "Food".to_owned(),
        icon: "utensils".to_owned(),
    }
}
