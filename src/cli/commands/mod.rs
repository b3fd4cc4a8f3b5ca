pub mod chat;
pub mod identity;
pub mod logging;
pub mod mail;
pub mod otp;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";
pub const ARG_ALLOWED_ORIGINS: &str = "allowed-origins";
pub const ARG_UPSTREAM_TIMEOUT_SECONDS: &str = "upstream-timeout-seconds";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("passgate")
        .about("Email one-time passcodes and a guide-backed shopping assistant")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8000")
                .env("PASSGATE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_ALLOWED_ORIGINS)
                .long(ARG_ALLOWED_ORIGINS)
                .help("Comma separated list of origins allowed by CORS")
                .env("PASSGATE_ALLOWED_ORIGINS")
                .value_delimiter(',')
                .default_value("http://localhost:3000,http://localhost:3001"),
        )
        .arg(
            Arg::new(ARG_UPSTREAM_TIMEOUT_SECONDS)
                .long(ARG_UPSTREAM_TIMEOUT_SECONDS)
                .help("Timeout for SMTP, identity provider and Gemini calls in seconds")
                .env("PASSGATE_UPSTREAM_TIMEOUT_SECONDS")
                .default_value("15")
                .value_parser(clap::value_parser!(u64)),
        );

    let command = identity::with_args(command);
    let command = mail::with_args(command);
    let command = otp::with_args(command);
    let command = chat::with_args(command);
    logging::with_args(command)
}
