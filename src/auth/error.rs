use thiserror::Error;

/// Failures surfaced by [`super::AuthService`].
///
/// Every variant except [`AuthError::Store`] is a user-facing condition whose
/// `Display` text is safe to return to clients as-is.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username taken")]
    UsernameTaken,
    #[error("Password must be longer than 3 chars")]
    PasswordTooShort,
    #[error("Invalid username")]
    InvalidUsername,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("no session")]
    NoSession,
    #[error("store failure")]
    Store(#[from] anyhow::Error),
}

impl AuthError {
    /// True for failures caused by the backing stores or hashing, not the caller.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}
