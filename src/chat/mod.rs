//! Guide-backed assistant proxy.
//!
//! Each question is answered independently: the guidance document is read from
//! disk, its first [`GUIDE_CHAR_LIMIT`] characters are embedded in a fixed
//! prompt together with the question, and the prompt is forwarded to a
//! [`Generator`]. No conversation state is kept between calls.

mod gemini;

pub use gemini::{GeminiClient, GeminiConfig};

use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

/// Upper bound on guide characters embedded in a prompt.
pub const GUIDE_CHAR_LIMIT: usize = 3000;

/// Reply used when the generation API answers without any candidate text.
pub const FALLBACK_REPLY: &str = "No reply from Gemini.";

#[derive(Debug, Error)]
pub enum Error {
    #[error("guide document not found: {}", .0.display())]
    ResourceMissing(PathBuf),
    #[error("failed to read guide document: {0}")]
    Io(#[from] std::io::Error),
    #[error("generation API request failed: {0}")]
    Upstream(String),
    #[error("generation API request timed out")]
    Timeout,
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Upstream(err.without_url().to_string())
        }
    }
}

/// Text generation backend.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Return the generated answer, or [`FALLBACK_REPLY`] when the response has no text.
    async fn generate(&self, prompt: &str) -> Result<String, Error>;
}

pub struct ChatProxy {
    guide_path: PathBuf,
    brand: String,
    generator: Arc<dyn Generator>,
}

impl ChatProxy {
    #[must_use]
    pub fn new(guide_path: PathBuf, brand: String, generator: Arc<dyn Generator>) -> Self {
        Self {
            guide_path,
            brand,
            generator,
        }
    }

    #[must_use]
    pub fn guide_path(&self) -> &Path {
        &self.guide_path
    }

    /// Answer `question` using the guidance document as the only context.
    ///
    /// # Errors
    /// Returns [`Error::ResourceMissing`] if the guide does not exist, or the
    /// generator's error if the upstream call fails.
    #[instrument(skip(self, question))]
    pub async fn ask(&self, question: &str) -> Result<String, Error> {
        let guide = load_guide(&self.guide_path).await?;
        let prompt = build_prompt(&self.brand, &guide, question);

        debug!(prompt_chars = prompt.chars().count(), "forwarding prompt");

        self.generator.generate(&prompt).await
    }
}

/// Read the guide and keep at most [`GUIDE_CHAR_LIMIT`] characters of it.
///
/// # Errors
/// Returns [`Error::ResourceMissing`] when the file does not exist and
/// [`Error::Io`] for any other read failure.
pub async fn load_guide(path: &Path) -> Result<String, Error> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(truncate_chars(&text, GUIDE_CHAR_LIMIT).to_string()),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            Err(Error::ResourceMissing(path.to_path_buf()))
        }
        Err(err) => Err(err.into()),
    }
}

/// Keep the first `limit` characters; never splits a UTF-8 sequence.
#[must_use]
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[must_use]
pub fn build_prompt(brand: &str, guide: &str, question: &str) -> String {
    format!(
        "\nYou are a helpful {brand} AI shopping assistant.\nUse ONLY this info:\n\n{guide}\n\n\nUser: {question}\n"
    )
}

/// Pull `candidates[0].content.parts[0].text` out of a generation response.
#[must_use]
pub fn extract_reply(response: &Value) -> String {
    response
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map_or_else(|| FALLBACK_REPLY.to_string(), ToString::to_string)
}
