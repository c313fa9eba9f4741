//! Registration, login, logout and session resolution.

use anyhow::{Context, anyhow};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument};

use super::{
    config::AuthConfig,
    error::AuthError,
    password::PasswordHasher,
    sessions::{SessionRecord, SessionStore},
    users::{InsertOutcome, User, UserStore},
    utils::{
        generate_session_token, hash_session_token, normalize_username, now_unix_seconds,
        valid_password_length, valid_username,
    },
};

const SESSION_INSERT_ATTEMPTS: usize = 3;

/// A freshly issued session. `token` is the only copy of the raw token.
#[derive(Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
    pub created_at_unix: i64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"***")
            .field("user", &self.user)
            .field("created_at_unix", &self.created_at_unix)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    LoggedOut,
    NoSession,
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    hasher: PasswordHasher,
    config: AuthConfig,
    // Verified against when the username is unknown, so both login failures cost one hash.
    dummy_hash: String,
}

impl AuthService {
    /// # Errors
    /// Returns an error if the placeholder hash cannot be computed.
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        hasher: PasswordHasher,
        config: AuthConfig,
    ) -> anyhow::Result<Self> {
        let dummy_hash = hasher
            .hash("tessera-placeholder")
            .context("failed to compute placeholder hash")?;
        Ok(Self {
            users,
            sessions,
            hasher,
            config,
            dummy_hash,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Create a user. The username check runs before the password length check.
    ///
    /// # Errors
    /// `InvalidUsername`, `UsernameTaken`, `PasswordTooShort`, or `Store`.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &SecretString) -> Result<User, AuthError> {
        let username = normalize_username(username);
        if !valid_username(username) {
            return Err(AuthError::InvalidUsername);
        }

        if self.users.find_by_username(username).await?.is_some() {
            debug!("username already registered");
            return Err(AuthError::UsernameTaken);
        }

        if !valid_password_length(password.expose_secret()) {
            return Err(AuthError::PasswordTooShort);
        }

        let password_hash = self.hasher.hash_blocking(password).await?;

        match self.users.insert(username, &password_hash).await? {
            InsertOutcome::Created(user) => {
                info!(user_id = user.id, "user registered");
                Ok(user)
            }
            // Lost a race with a concurrent registration of the same name.
            InsertOutcome::Conflict => Err(AuthError::UsernameTaken),
        }
    }

    /// Verify credentials and issue a new session.
    ///
    /// # Errors
    /// `InvalidCredentials` for an unknown username or wrong password, or `Store`.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<Session, AuthError> {
        let username = normalize_username(username);
        let record = self.users.find_by_username(username).await?;

        let Some(record) = record else {
            // Burn one verification so unknown usernames cost the same as a wrong password.
            if let Err(err) = self.hasher.verify_blocking(password, &self.dummy_hash).await {
                debug!("placeholder verification failed: {err:?}");
            }
            debug!("unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .hasher
            .verify_blocking(password, &record.password_hash)
            .await?
        {
            debug!(user_id = record.id, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let created_at_unix = now_unix_seconds();
        let session_record = SessionRecord {
            user_id: record.id,
            created_at_unix,
        };

        for _ in 0..SESSION_INSERT_ATTEMPTS {
            let token = generate_session_token()?;
            if self
                .sessions
                .insert(&hash_session_token(&token), session_record)
                .await?
            {
                info!(user_id = record.id, "session created");
                return Ok(Session {
                    token,
                    user: record.to_user(),
                    created_at_unix,
                });
            }
        }

        Err(anyhow!("failed to generate unique session token").into())
    }

    /// Destroy the session behind `token`, if any. Never fails for a missing session.
    ///
    /// # Errors
    /// Only `Store`.
    #[instrument(skip_all)]
    pub async fn logout(&self, token: Option<&str>) -> Result<LogoutOutcome, AuthError> {
        let Some(token) = token else {
            return Ok(LogoutOutcome::NoSession);
        };

        match self.sessions.delete(&hash_session_token(token)).await? {
            Some(record) if !self.is_expired(&record) => {
                info!(user_id = record.user_id, "session destroyed");
                Ok(LogoutOutcome::LoggedOut)
            }
            _ => Ok(LogoutOutcome::NoSession),
        }
    }

    /// Resolve `token` to its user.
    ///
    /// Expired sessions and sessions whose user no longer exists are removed
    /// and reported as `NoSession`.
    ///
    /// # Errors
    /// `NoSession` or `Store`.
    #[instrument(skip_all)]
    pub async fn current_user(&self, token: Option<&str>) -> Result<User, AuthError> {
        let token = token.ok_or(AuthError::NoSession)?;
        let token_hash = hash_session_token(token);

        let record = self
            .sessions
            .lookup(&token_hash)
            .await?
            .ok_or(AuthError::NoSession)?;

        if self.is_expired(&record) {
            debug!(user_id = record.user_id, "session expired");
            self.sessions.delete(&token_hash).await?;
            return Err(AuthError::NoSession);
        }

        if let Some(user) = self.users.find_by_id(record.user_id).await? {
            Ok(user)
        } else {
            error!(user_id = record.user_id, "session references missing user");
            self.sessions.delete(&token_hash).await?;
            Err(AuthError::NoSession)
        }
    }

    /// Remove every expired session.
    ///
    /// # Errors
    /// Only `Store`.
    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        let cutoff = self.config.expiry_cutoff(now_unix_seconds());
        Ok(self.sessions.purge_created_before(cutoff).await?)
    }

    /// Check that the user store is reachable.
    ///
    /// # Errors
    /// Only `Store`.
    pub async fn ping(&self) -> Result<(), AuthError> {
        Ok(self.users.ping().await?)
    }

    fn is_expired(&self, record: &SessionRecord) -> bool {
        record.created_at_unix <= self.config.expiry_cutoff(now_unix_seconds())
    }
}

/// Periodically purge expired sessions until the task is aborted.
pub fn spawn_session_sweeper(service: Arc<AuthService>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let interval = Duration::from_secs(service.config().sweep_interval_seconds().max(1));

        loop {
            sleep(interval).await;

            match service.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => info!(purged, "expired sessions purged"),
                Err(err) => error!("session sweep failed: {err:?}"),
            }
        }
    })
}
