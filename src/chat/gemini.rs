use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{extract_reply, Error, Generator};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1";
const GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_TIMEOUT_SECONDS: u64 = 15;
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone)]
pub struct GeminiConfig {
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
    timeout: Duration,
}

impl GeminiConfig {
    #[must_use]
    pub fn new(api_key: Option<SecretString>) -> Self {
        Self {
            base_url: GEMINI_BASE_URL.to_string(),
            model: GEMINI_MODEL.to_string(),
            api_key,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Accepts both `gemini-1.5-flash` and `models/gemini-1.5-flash`.
    #[must_use]
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.trim().trim_start_matches("models/").to_string();
        self
    }

    #[must_use]
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout = Duration::from_secs(seconds.max(1));
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: GeminiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(config.timeout())
            .build()
            .context("Failed to build generation API HTTP client")?;

        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[async_trait]
impl Generator for GeminiClient {
    #[instrument(skip(self, prompt), fields(model = %self.config.model))]
    async fn generate(&self, prompt: &str) -> Result<String, Error> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| Error::Upstream("generation API key is not configured".to_string()))?;

        let body = json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ]
        });

        let response = self
            .client
            .post(self.config.endpoint())
            .header(API_KEY_HEADER, api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let payload: Value = response.json().await.map_err(|err| {
            Error::Upstream(format!(
                "invalid generation response ({status}): {}",
                err.without_url()
            ))
        })?;

        // Error bodies are JSON too; they carry no candidates and fall back.
        if !status.is_success() {
            warn!(%status, error = %payload["error"]["message"], "generation API returned an error");
        }

        let reply = extract_reply(&payload);
        debug!(reply_chars = reply.chars().count(), "generation API replied");

        Ok(reply)
    }
}
