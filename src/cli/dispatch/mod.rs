use crate::cli::{
    actions::{Action, server},
    commands::{self, auth},
};
use anyhow::{Context, Result};

/// Turn parsed arguments into the [`Action`] to run.
///
/// # Errors
/// Returns an error if a required argument is missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let options = auth::Options::parse(matches)?;

    Ok(Action::Server(server::Args {
        port: matches
            .get_one::<u16>(commands::ARG_PORT)
            .copied()
            .context("missing required argument: --port")?,
        dsn: matches.get_one::<String>(commands::ARG_DSN).cloned(),
        session_ttl_seconds: options.session_ttl_seconds,
        session_sweep_seconds: options.session_sweep_seconds,
        cookie_secure: options.cookie_secure,
        hash_memory_kib: options.hash_memory_kib,
        hash_iterations: options.hash_iterations,
        hash_parallelism: options.hash_parallelism,
    }))
}
