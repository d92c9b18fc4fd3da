//! Credential verification — PIN to user record.
//!
//! The verifier is a pluggable capability behind [`CredentialVerifier`]:
//! [`HttpVerifier`] speaks the remote identity lookup's wire protocol, and
//! [`PinTable`] is a local digest-keyed table for development and tests.
//! This layer enforces nothing about PIN shape beyond non-emptiness; the
//! verifier is authoritative on PIN syntax and semantics.

use std::collections::HashMap;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::services::session::{Role, User};

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The verifier explicitly declined the PIN.
    #[error("PIN rejected")]
    Rejected { reason: Option<String> },

    /// Network failure or an unreadable response.
    #[error("verifier transport failed: {0}")]
    Transport(String),

    /// A well-formed response that breaks the protocol contract, e.g. a
    /// success without a user record or an unknown role.
    #[error("verifier protocol violation: {0}")]
    Protocol(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

/// Translates a PIN into a user record or a rejection.
#[async_trait::async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, pin: &str) -> Result<User, VerifyError>;
}

/// Trim a raw PIN; `None` when nothing remains. The only local validation.
#[must_use]
pub fn normalize_pin(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_owned()) }
}

/// SHA-256 hex digest of a PIN.
#[must_use]
pub fn hash_pin(pin: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pin.as_bytes());
    let bytes = hasher.finalize();
    bytes.iter().map(|b| format!("{b:02x}")).collect::<String>()
}

// =============================================================================
// HTTP VERIFIER
// =============================================================================

/// Remote verifier endpoint configuration loaded from environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    pub url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl VerifierConfig {
    /// Load from `VERIFIER_URL`, with optional `VERIFIER_TIMEOUT_SECS` and
    /// `VERIFIER_CONNECT_TIMEOUT_SECS` overrides. Returns `None` if the URL
    /// is missing (login is then impossible).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("VERIFIER_URL").ok()?;
        Some(Self {
            url,
            request_timeout_secs: env_parse_u64("VERIFIER_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout_secs: env_parse_u64("VERIFIER_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        })
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .unwrap_or(default)
}

#[derive(Debug, serde::Deserialize)]
struct WireResponse {
    success: bool,
    user: Option<WireUser>,
    error: Option<String>,
}

/// User record as the remote verifier ships it; `role` arrives as a free
/// string and is validated into [`Role`] here.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireUser {
    id: String,
    name: String,
    role: String,
    profile_image: String,
    #[serde(default)]
    additional_info: HashMap<String, String>,
}

fn decode_response(body: &str) -> Result<User, VerifyError> {
    let response: WireResponse = serde_json::from_str(body)
        .map_err(|err| VerifyError::Transport(format!("unreadable response: {err}")))?;
    if !response.success {
        return Err(VerifyError::Rejected { reason: response.error });
    }
    let wire = response
        .user
        .ok_or_else(|| VerifyError::Protocol("success without a user record".to_owned()))?;
    let role = Role::parse(&wire.role)
        .ok_or_else(|| VerifyError::Protocol(format!("unknown role: {}", wire.role)))?;
    Ok(User {
        id: wire.id,
        name: wire.name,
        role,
        profile_image: wire.profile_image,
        additional_info: wire.additional_info,
    })
}

/// Client for the remote identity lookup:
/// `GET {url}?action=login&pin=...` → `{ success, user?, error? }`.
pub struct HttpVerifier {
    client: reqwest::Client,
    url: String,
}

impl HttpVerifier {
    /// # Errors
    ///
    /// [`VerifyError::ClientBuild`] if the HTTP client cannot be constructed.
    pub fn new(config: VerifierConfig) -> Result<Self, VerifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|err| VerifyError::ClientBuild(err.to_string()))?;
        Ok(Self { client, url: config.url })
    }
}

#[async_trait::async_trait]
impl CredentialVerifier for HttpVerifier {
    async fn verify(&self, pin: &str) -> Result<User, VerifyError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("action", "login"), ("pin", pin)])
            .send()
            .await
            .map_err(|err| VerifyError::Transport(err.to_string()))?;
        if !response.status().is_success() {
            return Err(VerifyError::Transport(format!("status {}", response.status())));
        }
        let body = response
            .text()
            .await
            .map_err(|err| VerifyError::Transport(err.to_string()))?;
        decode_response(&body)
    }
}

// =============================================================================
// PIN TABLE
// =============================================================================

/// Local verifier keyed by SHA-256 PIN digests — never plaintext PINs.
/// Callers supply every entry; the core ships no credentials.
#[derive(Debug, Default)]
pub struct PinTable {
    users: HashMap<String, User>,
}

impl PinTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user under a PIN; a repeated PIN replaces the entry.
    #[must_use]
    pub fn with_user(mut self, pin: &str, user: User) -> Self {
        self.users.insert(hash_pin(pin), user);
        self
    }
}

#[async_trait::async_trait]
impl CredentialVerifier for PinTable {
    async fn verify(&self, pin: &str) -> Result<User, VerifyError> {
        self.users
            .get(&hash_pin(pin))
            .cloned()
            .ok_or(VerifyError::Rejected { reason: None })
    }
}

#[cfg(test)]
#[path = "verifier_test.rs"]
mod tests;
