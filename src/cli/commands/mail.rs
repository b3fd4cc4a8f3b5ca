use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_SMTP_HOST: &str = "smtp-host";
pub const ARG_SMTP_PORT: &str = "smtp-port";
pub const ARG_SMTP_USERNAME: &str = "smtp-username";
pub const ARG_SMTP_PASSWORD: &str = "smtp-password";
pub const ARG_MAIL_FROM: &str = "mail-from";
pub const ARG_MAIL_BRAND: &str = "mail-brand";

#[derive(Debug, Clone)]
pub struct Options {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub from: Option<String>,
    pub brand: String,
}

impl Options {
    /// Parse mail arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a defaulted argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let read = |id: &str| -> Option<String> {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };
        let read_required = |id: &str| -> Result<String> {
            read(id).ok_or_else(|| anyhow::anyhow!("missing required argument: --{id}"))
        };

        Ok(Self {
            host: read_required(ARG_SMTP_HOST)?,
            port: matches.get_one::<u16>(ARG_SMTP_PORT).copied().unwrap_or(465),
            username: read(ARG_SMTP_USERNAME),
            password: read(ARG_SMTP_PASSWORD).map(SecretString::from),
            from: read(ARG_MAIL_FROM),
            brand: read_required(ARG_MAIL_BRAND)?,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SMTP_HOST)
                .long(ARG_SMTP_HOST)
                .help("SMTP relay host")
                .env("PASSGATE_SMTP_HOST")
                .default_value("smtp.gmail.com"),
        )
        .arg(
            Arg::new(ARG_SMTP_PORT)
                .long(ARG_SMTP_PORT)
                .help("SMTP relay port, 465 uses implicit TLS and any other port STARTTLS")
                .env("PASSGATE_SMTP_PORT")
                .default_value("465")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_SMTP_USERNAME)
                .long(ARG_SMTP_USERNAME)
                .help("SMTP account; without username and password emails are only logged")
                .env("PASSGATE_SMTP_USERNAME")
                .requires(ARG_SMTP_PASSWORD),
        )
        .arg(
            Arg::new(ARG_SMTP_PASSWORD)
                .long(ARG_SMTP_PASSWORD)
                .help("SMTP password or app password")
                .env("PASSGATE_SMTP_PASSWORD")
                .hide_env_values(true)
                .requires(ARG_SMTP_USERNAME),
        )
        .arg(
            Arg::new(ARG_MAIL_FROM)
                .long(ARG_MAIL_FROM)
                .help("Sender address (default: the SMTP username)")
                .env("PASSGATE_MAIL_FROM"),
        )
        .arg(
            Arg::new(ARG_MAIL_BRAND)
                .long(ARG_MAIL_BRAND)
                .help("Brand name used in email subjects and the assistant prompt")
                .env("PASSGATE_MAIL_BRAND")
                .default_value("Nike"),
        )
}
