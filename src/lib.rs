//! # Tessera (session-based authentication)
//!
//! `tessera` registers users, verifies their passwords and hands out opaque
//! session tokens.
//!
//! ## Credentials
//!
//! Passwords are hashed with Argon2id and stored as PHC strings. The plaintext
//! only lives for the duration of a request and is wrapped in a
//! [`secrecy::SecretString`] while it does.
//!
//! ## Sessions
//!
//! A successful login issues a random 256-bit token, returned in the
//! `tessera_session` cookie. Only the SHA-256 of the token is persisted, so a
//! leaked session table cannot be replayed. Sessions expire after a configurable
//! TTL and are purged by a background sweeper.
//!
//! ## Storage
//!
//! Users and sessions live behind the [`auth::UserStore`] and
//! [`auth::SessionStore`] traits. PostgreSQL is used when a DSN is configured;
//! otherwise the service falls back to in-memory stores.

pub mod auth;
pub mod cli;
pub mod tessera;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
