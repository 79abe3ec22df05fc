//! `{secrets.<key>}` placeholder substitution.
//!
//! The engine walks string, array, and object payloads (modeled as
//! [`serde_json::Value`]) and replaces placeholders with values from the
//! [`SecretStore`]. Substitution runs in two passes: the destination URL is
//! resolved first with no restriction target, then headers, query
//! parameters, and body are resolved against the *resolved* URL so that
//! per-secret URL restrictions are checked against the real destination.
//!
//! An unknown key is a caller typo: it logs a warning and the placeholder
//! passes through unresolved. A URL restriction violation on a known key is
//! an access-control breach: the whole substitution call fails.

use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::error::{Result, VaultgateError};
use crate::pattern;
use crate::store::SecretStore;

/// Placeholder substitution engine.
pub struct TemplateEngine {
    placeholder: Regex,
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self {
            placeholder: Regex::new(r"(?i)\{secrets\.([a-z0-9_.\-]+)\}").unwrap(),
        }
    }

    /// Pass 1: resolve placeholders in the destination URL itself.
    ///
    /// No resolved URL exists yet to check restrictions against, so
    /// URL-scoped secrets are substituted unconditionally here; enforcement
    /// begins in pass 2 with the URL this call returns.
    pub fn resolve_url(&self, store: &SecretStore, url: &str) -> Result<String> {
        self.substitute_str(store, url, None)
    }

    /// Pass 2: resolve placeholders in headers/query/body payloads against
    /// the resolved destination URL.
    pub fn resolve_fields(
        &self,
        store: &SecretStore,
        payload: &Value,
        target_url: &str,
    ) -> Result<Value> {
        self.substitute(store, payload, Some(target_url))
    }

    /// Recursively substitute placeholders in a JSON-shaped payload.
    ///
    /// Strings are rewritten, arrays and objects are walked structurally,
    /// and non-string leaves pass through untouched.
    pub fn substitute(
        &self,
        store: &SecretStore,
        payload: &Value,
        target_url: Option<&str>,
    ) -> Result<Value> {
        match payload {
            Value::String(s) => Ok(Value::String(self.substitute_str(store, s, target_url)?)),
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.substitute(store, item, target_url)?);
                }
                Ok(Value::Array(out))
            }
            Value::Object(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k.clone(), self.substitute(store, v, target_url)?);
                }
                Ok(Value::Object(out))
            }
            other => Ok(other.clone()),
        }
    }

    /// Substitute every placeholder occurrence in a single string.
    pub fn substitute_str(
        &self,
        store: &SecretStore,
        input: &str,
        target_url: Option<&str>,
    ) -> Result<String> {
        let mut result = input.to_string();
        for cap in self.placeholder.captures_iter(input) {
            let key = cap[1].to_lowercase();
            let Some(secret) = store.lookup(&key) else {
                warn!("Unknown secret key '{}'; placeholder left unresolved", key);
                continue;
            };
            if let Some(url) = target_url {
                if !secret.allowed_urls.is_empty()
                    && !secret.allowed_urls.iter().any(|p| pattern::matches(url, p))
                {
                    return Err(VaultgateError::UrlRestriction {
                        key,
                        url: url.to_string(),
                    });
                }
            }
            // Replaces all occurrences of this placeholder in one pass.
            result = result.replace(&cap[0], &secret.value);
        }
        Ok(result)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}
