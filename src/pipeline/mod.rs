//! The request shaping pipeline.
//!
//! One request flows through a fixed stage order:
//!
//! 1. resolve placeholders in the destination URL (pass 1)
//! 2. resolve placeholders in headers/query/body against the resolved URL (pass 2)
//! 3. apply dynamic auth (overwrites/adds entries, collects raw values)
//! 4. assemble the final URL with query parameters
//! 5. global URL filter gate
//!
//! Hard failures abort the whole request and surface with a message that
//! has been redacted using every sensitive value known at the failure
//! point. Auth-derived values are collected before the filter gate runs,
//! so a filter-denial reason can never echo them.

use std::collections::HashMap;

use serde_json::Value;
use tracing::info;
use url::Url;

use crate::audit::DecisionRecord;
use crate::auth::{self, AuthDescriptor};
use crate::config::AppConfig;
use crate::error::{Result, VaultgateError};
use crate::filter::{FilterDecision, UrlFilter};
use crate::redact::{self, SensitiveValues};
use crate::store::SecretStore;
use crate::template::TemplateEngine;

/// An outbound request as described by the caller, before shaping.
#[derive(Debug, Clone, Default)]
pub struct OutboundRequest {
    /// Destination URL, possibly containing `{secrets.<key>}` placeholders.
    pub url: String,
    /// Header name → value (values may contain placeholders).
    pub headers: HashMap<String, String>,
    /// Query parameter name → value (values may contain placeholders).
    pub query: HashMap<String, String>,
    /// Optional JSON-shaped body.
    pub body: Option<Value>,
}

/// A request that has passed every stage and may be dispatched.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// Fully assembled destination URL, query parameters included.
    pub url: String,
    /// Final headers, dynamic auth applied.
    pub headers: HashMap<String, String>,
    /// Resolved body, if any.
    pub body: Option<Value>,
    /// Everything that must be scrubbed from text derived from the
    /// response or from any later failure message.
    pub sensitive: SensitiveValues,
}

/// A loaded pipeline snapshot: secret store, template engine, URL filter.
///
/// Built once from configuration and read-only afterwards; the [`reload`]
/// module replaces whole snapshots rather than mutating one in place.
///
/// [`reload`]: crate::reload
#[derive(Default)]
pub struct Pipeline {
    store: SecretStore,
    filter: UrlFilter,
    engine: TemplateEngine,
}

impl Pipeline {
    pub fn new(store: SecretStore, filter: UrlFilter) -> Self {
        Self {
            store,
            filter,
            engine: TemplateEngine::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            SecretStore::from_config(config),
            UrlFilter::from_config(&config.filter),
        )
    }

    pub fn store(&self) -> &SecretStore {
        &self.store
    }

    /// Pass 1: resolve placeholders in the destination URL.
    pub fn resolve_url(&self, url: &str) -> Result<String> {
        self.engine.resolve_url(&self.store, url)
    }

    /// Pass 2: resolve placeholders in a payload against the resolved URL.
    pub fn resolve_fields(&self, payload: &Value, target_url: &str) -> Result<Value> {
        self.engine.resolve_fields(&self.store, payload, target_url)
    }

    /// Apply a dynamic auth descriptor to header/query maps.
    pub fn apply_auth(
        &self,
        auth: Option<&AuthDescriptor>,
        url: &str,
        headers: &mut HashMap<String, String>,
        query: &mut HashMap<String, String>,
        sensitive: &mut SensitiveValues,
    ) {
        auth::apply(auth, url, headers, query, sensitive);
    }

    /// Evaluate the global URL filter against a finalized URL.
    pub fn check_global_filter(&self, url: &str) -> FilterDecision {
        self.filter.check(url)
    }

    /// Scrub all known sensitive values from a piece of outbound text.
    pub fn redact(&self, text: &str, extra: &SensitiveValues) -> String {
        redact::redact(&self.store, text, extra)
    }

    /// Run the full shaping pipeline for one request.
    ///
    /// On a hard failure (URL restriction violation, filter denial, invalid
    /// final URL) the error message is redacted with every sensitive value
    /// known at the failure point before it is returned.
    pub fn prepare(
        &self,
        request: &OutboundRequest,
        auth: Option<&AuthDescriptor>,
    ) -> Result<PreparedRequest> {
        let mut sensitive = SensitiveValues::new();
        self.shape(request, auth, &mut sensitive)
            .map_err(|err| self.redact_error(err, &sensitive))
    }

    fn shape(
        &self,
        request: &OutboundRequest,
        auth: Option<&AuthDescriptor>,
        sensitive: &mut SensitiveValues,
    ) -> Result<PreparedRequest> {
        // Pass 1: the URL itself may contain placeholders.
        let resolved_url = self.resolve_url(&request.url)?;

        // Pass 2: everything else is resolved against the resolved URL.
        let mut headers = self.resolve_string_map(&request.headers, &resolved_url)?;
        let mut query = self.resolve_string_map(&request.query, &resolved_url)?;
        let body = request
            .body
            .as_ref()
            .map(|b| self.resolve_fields(b, &resolved_url))
            .transpose()?;

        // Dynamic auth overrides any statically substituted entry and must
        // register its values before the filter gate can fail.
        auth::apply(auth, &resolved_url, &mut headers, &mut query, sensitive);

        let final_url = assemble_url(&resolved_url, &query)?;

        let decision = self.filter.check(&final_url);
        if !decision.allowed {
            return Err(VaultgateError::FilterDenied(
                decision
                    .reason
                    .unwrap_or_else(|| "denied by filter".to_string()),
            ));
        }

        info!(
            "Prepared outbound request to {}",
            self.redact(&final_url, sensitive)
        );

        Ok(PreparedRequest {
            url: final_url,
            headers,
            body,
            sensitive: std::mem::take(sensitive),
        })
    }

    /// Scrub response headers and body before they are surfaced to the
    /// caller. The status line is exempt and stays with the caller.
    pub fn scrub_response(
        &self,
        headers: &HashMap<String, String>,
        body: &str,
        sensitive: &SensitiveValues,
    ) -> (HashMap<String, String>, String) {
        let headers = headers
            .iter()
            .map(|(k, v)| (k.clone(), self.redact(v, sensitive)))
            .collect();
        let body = self.redact(body, sensitive);
        (headers, body)
    }

    /// Build an audit record for a pipeline outcome with the URL and reason
    /// already redacted; audit rows obey the same hygiene guarantee as any
    /// other outbound text.
    pub fn decision_record(
        &self,
        url: &str,
        decision: &str,
        reason: &str,
        sensitive: &SensitiveValues,
    ) -> DecisionRecord {
        DecisionRecord {
            id: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
            url: self.redact(url, sensitive),
            decision: decision.to_string(),
            reason: self.redact(reason, sensitive),
        }
    }

    fn resolve_string_map(
        &self,
        map: &HashMap<String, String>,
        target_url: &str,
    ) -> Result<HashMap<String, String>> {
        let mut out = HashMap::with_capacity(map.len());
        for (k, v) in map {
            out.insert(
                k.clone(),
                self.engine.substitute_str(&self.store, v, Some(target_url))?,
            );
        }
        Ok(out)
    }

    fn redact_error(&self, err: VaultgateError, sensitive: &SensitiveValues) -> VaultgateError {
        match err {
            VaultgateError::UrlRestriction { key, url } => VaultgateError::UrlRestriction {
                key,
                url: self.redact(&url, sensitive),
            },
            VaultgateError::FilterDenied(reason) => {
                VaultgateError::FilterDenied(self.redact(&reason, sensitive))
            }
            VaultgateError::InvalidUrl(msg) => {
                VaultgateError::InvalidUrl(self.redact(&msg, sensitive))
            }
            other => other,
        }
    }
}

/// Append query parameters to the resolved URL.
///
/// Parameters are appended in sorted name order for stable output.
fn assemble_url(base: &str, query: &HashMap<String, String>) -> Result<String> {
    let mut url = Url::parse(base)
        .map_err(|e| VaultgateError::InvalidUrl(format!("{}: {}", base, e)))?;
    if !query.is_empty() {
        let mut pairs: Vec<_> = query.iter().collect();
        pairs.sort();
        let mut serializer = url.query_pairs_mut();
        for (name, value) in pairs {
            serializer.append_pair(name, value);
        }
        drop(serializer);
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_url_appends_sorted_query() {
        let mut query = HashMap::new();
        query.insert("b".to_string(), "2".to_string());
        query.insert("a".to_string(), "1".to_string());
        let url = assemble_url("https://a.com/path", &query).unwrap();
        assert_eq!(url, "https://a.com/path?a=1&b=2");
    }

    #[test]
    fn assemble_url_keeps_existing_query() {
        let mut query = HashMap::new();
        query.insert("extra".to_string(), "x".to_string());
        let url = assemble_url("https://a.com/path?fixed=1", &query).unwrap();
        assert_eq!(url, "https://a.com/path?fixed=1&extra=x");
    }

    #[test]
    fn assemble_url_without_query_is_normalized_only() {
        let url = assemble_url("https://a.com", &HashMap::new()).unwrap();
        assert_eq!(url, "https://a.com/");
    }

    #[test]
    fn assemble_url_rejects_garbage() {
        let result = assemble_url("not a url", &HashMap::new());
        assert!(matches!(result, Err(VaultgateError::InvalidUrl(_))));
    }

    #[test]
    fn assemble_url_percent_encodes_values() {
        let mut query = HashMap::new();
        query.insert("q".to_string(), "a b&c".to_string());
        let url = assemble_url("https://a.com/s", &query).unwrap();
        assert_eq!(url, "https://a.com/s?q=a+b%26c");
    }
}
