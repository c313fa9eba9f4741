//! User records and the in-memory [`UserStore`].

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use utoipa::ToSchema;

/// Public projection of a user; never carries the password hash.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
}

/// Stored user row.
#[derive(Clone)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

impl UserRecord {
    #[must_use]
    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"***")
            .finish()
    }
}

/// Outcome when attempting to insert a new user.
#[derive(Debug)]
pub enum InsertOutcome {
    Created(User),
    Conflict,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; a taken username is `Ok(InsertOutcome::Conflict)`, not an error.
    async fn insert(&self, username: &str, password_hash: &str) -> Result<InsertOutcome>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn ping(&self) -> Result<()>;
}

#[derive(Default)]
struct Users {
    next_id: i64,
    by_id: BTreeMap<i64, UserRecord>,
    by_username: HashMap<String, i64>,
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Users>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, username: &str, password_hash: &str) -> Result<InsertOutcome> {
        let mut users = self.users.write().await;
        if users.by_username.contains_key(username) {
            return Ok(InsertOutcome::Conflict);
        }

        users.next_id += 1;
        let record = UserRecord {
            id: users.next_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        let user = record.to_user();
        users.by_username.insert(record.username.clone(), record.id);
        users.by_id.insert(record.id, record);
        Ok(InsertOutcome::Created(user))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users
            .by_username
            .get(username)
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.by_id.get(&id).map(UserRecord::to_user))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
