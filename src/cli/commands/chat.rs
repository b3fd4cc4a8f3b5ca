use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use std::path::PathBuf;

pub const ARG_GEMINI_API_KEY: &str = "gemini-api-key";
pub const ARG_GEMINI_MODEL: &str = "gemini-model";
pub const ARG_GEMINI_BASE_URL: &str = "gemini-base-url";
pub const ARG_GUIDE_PATH: &str = "guide-path";

#[derive(Debug, Clone)]
pub struct Options {
    pub api_key: Option<SecretString>,
    pub model: String,
    pub base_url: String,
    pub guide_path: PathBuf,
}

impl Options {
    /// Parse assistant arguments from matches.
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
            api_key: read(ARG_GEMINI_API_KEY).map(SecretString::from),
            model: read_required(ARG_GEMINI_MODEL)?,
            base_url: read_required(ARG_GEMINI_BASE_URL)?,
            guide_path: PathBuf::from(read_required(ARG_GUIDE_PATH)?),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_GEMINI_API_KEY)
                .long(ARG_GEMINI_API_KEY)
                .help("Gemini API key; /api/ask fails without it")
                .env("PASSGATE_GEMINI_API_KEY")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_GEMINI_MODEL)
                .long(ARG_GEMINI_MODEL)
                .help("Gemini model name")
                .env("PASSGATE_GEMINI_MODEL")
                .default_value("gemini-1.5-flash"),
        )
        .arg(
            Arg::new(ARG_GEMINI_BASE_URL)
                .long(ARG_GEMINI_BASE_URL)
                .help("Gemini API base URL")
                .env("PASSGATE_GEMINI_BASE_URL")
                .default_value("https://generativelanguage.googleapis.com/v1"),
        )
        .arg(
            Arg::new(ARG_GUIDE_PATH)
                .long(ARG_GUIDE_PATH)
                .help("Text document the assistant answers from")
                .env("PASSGATE_GUIDE_PATH")
                .default_value("public/project-guide.txt"),
        )
}
