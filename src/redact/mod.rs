//! Sensitive-value redaction.
//!
//! Any text derived from a response — headers, body, error messages — is
//! scrubbed before it reaches the caller: every literal occurrence of a
//! known sensitive value is replaced with the [`REDACTED`] sentinel. The
//! known set is every loaded secret with a non-empty value plus the
//! per-request [`SensitiveValues`] accumulated during request shaping.

use crate::store::SecretStore;

/// Sentinel emitted in place of any sensitive value.
pub const REDACTED: &str = "[REDACTED]";

/// Per-request accumulator of literal strings that must never appear in
/// text surfaced back to the caller.
///
/// Holds dynamic auth material and derived encodings (e.g. the basic-auth
/// base64 credential). Owned by the in-flight request and discarded once
/// the response has been scrubbed. Empty strings are never recorded.
#[derive(Debug, Clone, Default)]
pub struct SensitiveValues {
    values: Vec<String>,
}

impl SensitiveValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sensitive literal. Empty strings are ignored.
    pub fn push(&mut self, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.values.push(value);
        }
    }

    pub fn push_opt(&mut self, value: Option<&str>) {
        if let Some(v) = value {
            self.push(v);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Replace every literal occurrence of every known sensitive value in
/// `text` with the [`REDACTED`] sentinel.
///
/// Matching is exact-substring and global. Application order across values
/// does not matter for non-overlapping values; a value whose redaction
/// exposes a new accidental match is a known, accepted limitation.
pub fn redact(store: &SecretStore, text: &str, extra: &SensitiveValues) -> String {
    let mut result = text.to_string();
    for secret in store.secrets() {
        if !secret.value.is_empty() {
            result = result.replace(&secret.value, REDACTED);
        }
    }
    for value in extra.iter() {
        result = result.replace(value, REDACTED);
    }
    result
}
