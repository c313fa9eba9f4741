use crate::{
    auth::{
        AuthConfig, AuthService, MemorySessionStore, MemoryUserStore, PasswordHasher,
        SessionStore, UserStore, postgres,
    },
    tessera,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<String>,
    pub session_ttl_seconds: i64,
    pub session_sweep_seconds: u64,
    pub cookie_secure: bool,
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
    pub hash_parallelism: u32,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the hasher parameters are invalid, the database is unreachable,
/// or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let hasher = PasswordHasher::new(
        args.hash_memory_kib,
        args.hash_iterations,
        args.hash_parallelism,
    )?;

    let config = AuthConfig::new()
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_sweep_interval_seconds(args.session_sweep_seconds)
        .with_session_cookie_secure(args.cookie_secure);

    let (users, sessions): (Arc<dyn UserStore>, Arc<dyn SessionStore>) = match &args.dsn {
        Some(dsn) => {
            info!("Connecting to database: {}", redact_dsn(dsn)?);

            let pool = postgres::connect(dsn).await?;
            postgres::apply_schema(&pool).await?;

            (
                Arc::new(postgres::PgUserStore::new(pool.clone())),
                Arc::new(postgres::PgSessionStore::new(pool)),
            )
        }
        None => {
            warn!("No DSN configured, users and sessions are kept in memory");

            (
                Arc::new(MemoryUserStore::new()),
                Arc::new(MemorySessionStore::new()),
            )
        }
    };

    let service = AuthService::new(users, sessions, hasher, config)?;

    tessera::new(args.port, Arc::new(service)).await
}

/// Render a DSN for logs with its password masked.
fn redact_dsn(dsn: &str) -> Result<String> {
    let mut url = Url::parse(dsn).context("Invalid DSN")?;
    if url.password().is_some() {
        // `set_password` only fails for URLs that cannot carry credentials
        let _ = url.set_password(Some("***"));
    }
    Ok(url.to_string())
}
