use crate::otp::MAX_TTL;
use clap::{Arg, ArgMatches, Command};

const MAX_TTL_SECONDS: u64 = MAX_TTL.as_secs();

pub const ARG_OTP_TTL_SECONDS: &str = "otp-ttl-seconds";
pub const ARG_OTP_MAX_ENTRIES: &str = "otp-max-entries";
pub const ARG_OTP_SWEEP_SECONDS: &str = "otp-sweep-seconds";
pub const ARG_RESET_GRANT_TTL_SECONDS: &str = "reset-grant-ttl-seconds";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub ttl_seconds: u64,
    pub max_entries: usize,
    pub sweep_seconds: u64,
    pub reset_grant_ttl_seconds: u64,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            ttl_seconds: matches
                .get_one::<u64>(ARG_OTP_TTL_SECONDS)
                .copied()
                .unwrap_or(600),
            max_entries: matches
                .get_one::<usize>(ARG_OTP_MAX_ENTRIES)
                .copied()
                .unwrap_or(10_000),
            sweep_seconds: matches
                .get_one::<u64>(ARG_OTP_SWEEP_SECONDS)
                .copied()
                .unwrap_or(60),
            reset_grant_ttl_seconds: matches
                .get_one::<u64>(ARG_RESET_GRANT_TTL_SECONDS)
                .copied()
                .unwrap_or(300),
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_OTP_TTL_SECONDS)
                .long(ARG_OTP_TTL_SECONDS)
                .help("Lifetime of an issued passcode in seconds")
                .env("PASSGATE_OTP_TTL_SECONDS")
                .default_value("600")
                .value_parser(clap::value_parser!(u64).range(1..=MAX_TTL_SECONDS)),
        )
        .arg(
            Arg::new(ARG_OTP_MAX_ENTRIES)
                .long(ARG_OTP_MAX_ENTRIES)
                .help("Maximum number of outstanding passcodes")
                .env("PASSGATE_OTP_MAX_ENTRIES")
                .default_value("10000")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new(ARG_OTP_SWEEP_SECONDS)
                .long(ARG_OTP_SWEEP_SECONDS)
                .help("Interval between sweeps of expired passcodes and reset grants")
                .env("PASSGATE_OTP_SWEEP_SECONDS")
                .default_value("60")
                .value_parser(clap::value_parser!(u64).range(1..=MAX_TTL_SECONDS)),
        )
        .arg(
            Arg::new(ARG_RESET_GRANT_TTL_SECONDS)
                .long(ARG_RESET_GRANT_TTL_SECONDS)
                .help("Lifetime of the reset token returned by a verified reset passcode")
                .env("PASSGATE_RESET_GRANT_TTL_SECONDS")
                .default_value("300")
                .value_parser(clap::value_parser!(u64).range(1..=MAX_TTL_SECONDS)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> Command {
        with_args(Command::new("passgate"))
    }

    #[test]
    fn defaults() {
        temp_env::with_vars(
            [
                ("PASSGATE_OTP_TTL_SECONDS", None::<&str>),
                ("PASSGATE_OTP_MAX_ENTRIES", None),
                ("PASSGATE_OTP_SWEEP_SECONDS", None),
                ("PASSGATE_RESET_GRANT_TTL_SECONDS", None),
            ],
            || {
                let options = Options::parse(&command().get_matches_from(vec!["passgate"]));
                assert_eq!(
                    options,
                    Options {
                        ttl_seconds: 600,
                        max_entries: 10_000,
                        sweep_seconds: 60,
                        reset_grant_ttl_seconds: 300,
                    }
                );
            },
        );
    }

    #[test]
    fn lifetimes_are_bounded() {
        temp_env::with_vars(
            [
                ("PASSGATE_OTP_TTL_SECONDS", None::<&str>),
                ("PASSGATE_OTP_SWEEP_SECONDS", None),
                ("PASSGATE_RESET_GRANT_TTL_SECONDS", None),
            ],
            || {
                for arg in [
                    ARG_OTP_TTL_SECONDS,
                    ARG_OTP_SWEEP_SECONDS,
                    ARG_RESET_GRANT_TTL_SECONDS,
                ] {
                    let flag = format!("--{arg}");
                    for value in ["0", "86401", "18446744073709551615"] {
                        let result = command().try_get_matches_from(vec![
                            "passgate",
                            flag.as_str(),
                            value,
                        ]);
                        assert!(result.is_err(), "{flag} {value} accepted");
                    }

                    let result =
                        command().try_get_matches_from(vec!["passgate", flag.as_str(), "86400"]);
                    assert!(result.is_ok(), "{flag} 86400 rejected");
                }
            },
        );
    }

    #[test]
    fn oversized_ttl_from_env_is_rejected() {
        temp_env::with_vars(
            [("PASSGATE_OTP_TTL_SECONDS", Some("18446744073709551615"))],
            || {
                assert!(command().try_get_matches_from(vec!["passgate"]).is_err());
            },
        );
    }
}
