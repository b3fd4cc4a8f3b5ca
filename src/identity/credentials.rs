use anyhow::{anyhow, Context, Result};
use base64ct::{Base64, Encoding};
use secrecy::SecretString;
use serde::Deserialize;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Deserialize)]
struct RawServiceAccount {
    project_id: String,
    client_email: String,
    private_key: String,
    #[serde(default)]
    token_uri: Option<String>,
}

/// Service account bundle as downloaded from the Firebase console.
#[derive(Clone)]
pub struct ServiceAccount {
    pub project_id: String,
    pub client_email: String,
    pub private_key: SecretString,
    pub token_uri: String,
}

impl ServiceAccount {
    /// Parse the service account JSON document.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or a required field is empty.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawServiceAccount =
            serde_json::from_str(json).context("Invalid service account JSON")?;

        if raw.project_id.trim().is_empty() {
            return Err(anyhow!("Service account is missing project_id"));
        }
        if raw.client_email.trim().is_empty() {
            return Err(anyhow!("Service account is missing client_email"));
        }
        if !raw.private_key.contains("PRIVATE KEY") {
            return Err(anyhow!("Service account private_key is not a PEM key"));
        }

        Ok(Self {
            project_id: raw.project_id,
            client_email: raw.client_email,
            private_key: SecretString::from(raw.private_key),
            token_uri: raw
                .token_uri
                .filter(|uri| !uri.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
        })
    }

    /// Parse a base64 encoded service account bundle (the form kept in env vars).
    ///
    /// # Errors
    /// Returns an error if the value is not base64 or the decoded JSON is invalid.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let compact: String = encoded.split_whitespace().collect();
        let bytes = Base64::decode_vec(&compact)
            .map_err(|err| anyhow!("Invalid base64 credentials bundle: {err}"))?;
        let json = String::from_utf8(bytes).context("Credentials bundle is not UTF-8")?;
        Self::from_json(&json)
    }
}

impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"***")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}
