use crate::{
    api::{self, AuthState},
    chat::{ChatProxy, GeminiClient, GeminiConfig},
    cli::commands::{chat, identity, mail, otp},
    identity::{IdentityProvider, IdentityToolkit, ServiceAccount, ToolkitConfig},
    mail::{LogMailTransport, MailTransport, SmtpConfig, SmtpMailTransport},
    otp::{OtpConfig, OtpManager, ResetGrants},
};
use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub upstream_timeout_seconds: u64,
    pub identity: identity::Options,
    pub mail: mail::Options,
    pub otp: otp::Options,
    pub chat: chat::Options,
}

/// Execute the server action.
/// # Errors
/// Returns an error if a collaborator cannot be configured or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Server args: {:?}", args);

    let identity = identity_provider(&args.identity, args.upstream_timeout_seconds)?;
    let mail = mail_transport(&args.mail, args.upstream_timeout_seconds)?;

    let otp = Arc::new(OtpManager::new(
        OtpConfig::new()
            .with_code_ttl_seconds(args.otp.ttl_seconds)
            .with_max_entries(args.otp.max_entries),
    ));
    let grants = Arc::new(ResetGrants::new(Duration::from_secs(
        args.otp.reset_grant_ttl_seconds,
    )));

    let auth_state = Arc::new(AuthState::new(
        otp,
        grants,
        identity,
        mail,
        args.mail.brand.clone(),
    ));

    let chat = Arc::new(chat_proxy(
        args.chat,
        args.mail.brand,
        args.upstream_timeout_seconds,
    )?);

    api::new(
        args.port,
        &args.allowed_origins,
        auth_state,
        chat,
        Duration::from_secs(args.otp.sweep_seconds),
    )
    .await
}

fn identity_provider(
    options: &identity::Options,
    timeout_seconds: u64,
) -> Result<Arc<dyn IdentityProvider>> {
    let config = match options {
        identity::Options::ServiceAccount(bundle) => {
            let account = ServiceAccount::from_base64(bundle.expose_secret())
                .context("Invalid identity provider credentials")?;
            info!(project_id = %account.project_id, "Using Identity Toolkit");
            ToolkitConfig::service_account(account)
        }
        identity::Options::Emulator { host, project_id } => {
            warn!(%host, %project_id, "Using Firebase Auth emulator");
            ToolkitConfig::emulator(host, project_id.clone())
        }
    };

    let toolkit = IdentityToolkit::new(config.with_timeout_seconds(timeout_seconds))?;

    Ok(Arc::new(toolkit))
}

fn mail_transport(options: &mail::Options, timeout_seconds: u64) -> Result<Arc<dyn MailTransport>> {
    match (&options.username, &options.password) {
        (Some(username), Some(password)) => {
            let config = SmtpConfig::new(options.host.clone(), username.clone(), password.clone())
                .with_port(options.port)
                .with_from(options.from.clone())
                .with_timeout_seconds(timeout_seconds);

            let transport =
                SmtpMailTransport::new(&config).context("Failed to configure SMTP transport")?;

            info!(host = %config.host(), port = config.port(), "Using SMTP transport");

            Ok(Arc::new(transport))
        }
        _ => {
            warn!("SMTP credentials not set, passcode emails will only be logged");
            Ok(Arc::new(LogMailTransport))
        }
    }
}

fn chat_proxy(options: chat::Options, brand: String, timeout_seconds: u64) -> Result<ChatProxy> {
    let config = GeminiConfig::new(options.api_key)
        .with_base_url(options.base_url)
        .with_model(&options.model)
        .with_timeout_seconds(timeout_seconds);

    if !config.has_api_key() {
        warn!("Gemini API key not set, /api/ask will fail");
    }

    let client = GeminiClient::new(config)?;

    Ok(ChatProxy::new(options.guide_path, brand, Arc::new(client)))
}
