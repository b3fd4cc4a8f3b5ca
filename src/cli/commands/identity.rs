use anyhow::{anyhow, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_IDENTITY_CREDENTIALS: &str = "identity-credentials";
pub const ARG_IDENTITY_EMULATOR_HOST: &str = "identity-emulator-host";
pub const ARG_IDENTITY_PROJECT_ID: &str = "identity-project-id";

/// Where account lookups and password updates are sent.
#[derive(Debug, Clone)]
pub enum Options {
    /// Base64 service account bundle for the production Identity Toolkit.
    ServiceAccount(SecretString),
    /// Firebase Auth emulator.
    Emulator { host: String, project_id: String },
}

impl Options {
    /// Parse identity provider arguments from matches.
    ///
    /// # Errors
    /// Returns an error if neither credentials nor an emulator host are set, or
    /// if the emulator is selected without a project id.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let read = |id: &str| -> Option<String> {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };

        if let Some(host) = read(ARG_IDENTITY_EMULATOR_HOST) {
            let project_id = read(ARG_IDENTITY_PROJECT_ID).ok_or_else(|| {
                anyhow!("missing required argument: --{ARG_IDENTITY_PROJECT_ID} (required with --{ARG_IDENTITY_EMULATOR_HOST})")
            })?;
            return Ok(Self::Emulator { host, project_id });
        }

        read(ARG_IDENTITY_CREDENTIALS)
            .map(|bundle| Self::ServiceAccount(SecretString::from(bundle)))
            .ok_or_else(|| {
                anyhow!(
                    "missing required argument: --{ARG_IDENTITY_CREDENTIALS} or --{ARG_IDENTITY_EMULATOR_HOST}"
                )
            })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_IDENTITY_CREDENTIALS)
                .long(ARG_IDENTITY_CREDENTIALS)
                .help("Base64 encoded Firebase service account JSON")
                .env("PASSGATE_IDENTITY_CREDENTIALS_B64")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_IDENTITY_EMULATOR_HOST)
                .long(ARG_IDENTITY_EMULATOR_HOST)
                .help("Firebase Auth emulator host:port, used instead of service account credentials")
                .env("FIREBASE_AUTH_EMULATOR_HOST"),
        )
        .arg(
            Arg::new(ARG_IDENTITY_PROJECT_ID)
                .long(ARG_IDENTITY_PROJECT_ID)
                .help("Firebase project id used with the Auth emulator")
                .env("PASSGATE_IDENTITY_PROJECT_ID"),
        )
}
