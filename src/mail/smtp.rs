use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{info, instrument};

use super::{Error, MailMessage, MailTransport};

const IMPLICIT_TLS_PORT: u16 = 465;
const DEFAULT_SMTP_TIMEOUT_SECONDS: u64 = 15;

#[derive(Clone)]
pub struct SmtpConfig {
    host: String,
    port: u16,
    username: String,
    password: SecretString,
    from: Option<String>,
    timeout: Duration,
}

impl SmtpConfig {
    #[must_use]
    pub fn new(host: String, username: String, password: SecretString) -> Self {
        Self {
            host,
            port: IMPLICIT_TLS_PORT,
            username,
            password,
            from: None,
            timeout: Duration::from_secs(DEFAULT_SMTP_TIMEOUT_SECONDS),
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_from(mut self, from: Option<String>) -> Self {
        self.from = from.filter(|value| !value.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout = Duration::from_secs(seconds.max(1));
        self
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Sender address; the SMTP account itself unless overridden.
    #[must_use]
    pub fn from(&self) -> &str {
        self.from.as_deref().unwrap_or(&self.username)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("from", &self.from)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// SMTP delivery through an authenticated relay.
///
/// Port 465 uses implicit TLS, any other port negotiates STARTTLS.
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    timeout: Duration,
}

impl SmtpMailTransport {
    /// Build the relay transport; no connection is opened until the first send.
    ///
    /// # Errors
    /// Returns an error if the sender address or relay host is invalid.
    pub fn new(config: &SmtpConfig) -> Result<Self, Error> {
        let from = config
            .from()
            .parse::<Mailbox>()
            .map_err(|err| Error::InvalidAddress(format!("{}: {err}", config.from())))?;

        let builder = if config.port() == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(config.host())
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(config.host())
        }
        .map_err(|err| Error::Transport(format!("invalid relay {}: {err}", config.host())))?;

        let transport = builder
            .port(config.port())
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.expose_secret().to_string(),
            ))
            .timeout(Some(config.timeout()))
            .build();

        Ok(Self {
            transport,
            from,
            timeout: config.timeout(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    #[instrument(skip(self, message), fields(subject = %message.subject))]
    async fn send(&self, message: &MailMessage) -> Result<(), Error> {
        let to = message
            .to
            .parse::<Mailbox>()
            .map_err(|err| Error::InvalidAddress(err.to_string()))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|err| Error::Build(err.to_string()))?;

        match tokio::time::timeout(self.timeout, self.transport.send(email)).await {
            Ok(Ok(_response)) => {
                info!("email sent");
                Ok(())
            }
            Ok(Err(err)) => Err(Error::Transport(err.to_string())),
            Err(_elapsed) => Err(Error::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SmtpConfig {
        SmtpConfig::new(
            "smtp.example.com".to_string(),
            "sender@example.com".to_string(),
            SecretString::from("app-password"),
        )
    }

    #[test]
    fn smtp_config_defaults_and_overrides() {
        let config = config();
        assert_eq!(config.port(), 465);
        assert_eq!(config.from(), "sender@example.com");
        assert_eq!(config.timeout(), Duration::from_secs(15));

        let config = config
            .with_port(587)
            .with_from(Some("Shop <noreply@example.com>".to_string()))
            .with_timeout_seconds(0);
        assert_eq!(config.port(), 587);
        assert_eq!(config.from(), "Shop <noreply@example.com>");
        assert_eq!(config.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn smtp_config_blank_from_falls_back_to_username() {
        let config = config().with_from(Some("  ".to_string()));
        assert_eq!(config.from(), "sender@example.com");
    }

    #[test]
    fn smtp_config_debug_redacts_password() {
        let debug = format!("{:?}", config());
        assert!(!debug.contains("app-password"));
        assert!(debug.contains("***"));
    }

    #[tokio::test]
    async fn smtp_transport_builds_for_both_tls_modes() {
        assert!(SmtpMailTransport::new(&config()).is_ok());
        assert!(SmtpMailTransport::new(&config().with_port(587)).is_ok());
    }

    #[test]
    fn smtp_transport_rejects_invalid_sender() {
        let config = config().with_from(Some("not an address".to_string()));
        assert!(matches!(
            SmtpMailTransport::new(&config),
            Err(Error::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn smtp_transport_rejects_invalid_recipient() -> anyhow::Result<()> {
        let transport = SmtpMailTransport::new(&config())?;
        let message = MailMessage {
            to: "not an address".to_string(),
            subject: "subject".to_string(),
            body: "body".to_string(),
        };
        assert!(matches!(
            transport.send(&message).await,
            Err(Error::InvalidAddress(_))
        ));
        Ok(())
    }
}
