//! Credential validation and session lifecycle.
//!
//! [`AuthService`] is the only entry point the HTTP layer talks to. It owns a
//! [`PasswordHasher`] and two stores:
//!
//! - [`UserStore`]: `{id, username, password_hash}` records with unique usernames.
//! - [`SessionStore`]: session records keyed by the SHA-256 of the session token.
//!
//! Both stores have an in-memory implementation (used in tests and when no
//! database is configured) and a PostgreSQL implementation.

mod config;
mod error;
mod password;
pub mod postgres;
mod service;
mod sessions;
mod users;
mod utils;

pub use config::AuthConfig;
pub use error::AuthError;
pub use password::PasswordHasher;
pub use service::{AuthService, LogoutOutcome, Session, spawn_session_sweeper};
pub use sessions::{MemorySessionStore, SessionRecord, SessionStore};
pub use users::{InsertOutcome, MemoryUserStore, User, UserRecord, UserStore};
pub use utils::{generate_session_token, hash_session_token};
