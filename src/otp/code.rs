//! Passcode and grant token generation.

use anyhow::{Context, Result};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, Rng, RngCore};
use sha2::{Digest, Sha256};

pub const CODE_MIN: u32 = 100_000;
pub const CODE_MAX: u32 = 999_999;

/// Draw a six digit passcode uniformly from `[100000, 999999]` using the OS CSPRNG.
#[must_use]
pub fn generate_code() -> String {
    OsRng.gen_range(CODE_MIN..=CODE_MAX).to_string()
}

/// Create a new reset grant token.
///
/// The raw value is only returned to the client; the store keeps a digest.
pub(super) fn generate_grant_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate reset grant")?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

pub(super) fn hash_grant_token(token: &str) -> Vec<u8> {
    Sha256::digest(token.as_bytes()).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_code_is_six_digits_in_range() {
        for _ in 0..500 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            let value: u32 = code.parse().unwrap_or(0);
            assert!((CODE_MIN..=CODE_MAX).contains(&value), "out of range: {code}");
        }
    }

    #[test]
    fn generate_code_varies() {
        let codes: std::collections::HashSet<String> = (0..50).map(|_| generate_code()).collect();
        assert!(codes.len() > 1);
    }

    #[test]
    fn grant_token_decodes_to_32_bytes() {
        let decoded_len = generate_grant_token()
            .ok()
            .and_then(|token| Base64UrlUnpadded::decode_vec(&token).ok())
            .map(|bytes| bytes.len());
        assert_eq!(decoded_len, Some(32));
    }

    #[test]
    fn hash_grant_token_stable() {
        assert_eq!(hash_grant_token("token"), hash_grant_token("token"));
        assert_ne!(hash_grant_token("token"), hash_grant_token("other"));
    }
}
