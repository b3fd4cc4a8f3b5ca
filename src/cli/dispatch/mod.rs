//! Maps validated CLI arguments to the action to run.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{
    chat, identity, mail, otp, ARG_ALLOWED_ORIGINS, ARG_PORT, ARG_UPSTREAM_TIMEOUT_SECONDS,
};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8000);

    let allowed_origins: Vec<String> = matches
        .get_many::<String>(ARG_ALLOWED_ORIGINS)
        .map(|values| {
            values
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let upstream_timeout_seconds = matches
        .get_one::<u64>(ARG_UPSTREAM_TIMEOUT_SECONDS)
        .copied()
        .unwrap_or(15);

    Ok(Action::Server(Args {
        port,
        allowed_origins,
        upstream_timeout_seconds,
        identity: identity::Options::parse(matches)?,
        mail: mail::Options::parse(matches)?,
        otp: otp::Options::parse(matches),
        chat: chat::Options::parse(matches)?,
    }))
}
