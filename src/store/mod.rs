//! The named secret store.
//!
//! Secrets are loaded once from configuration at startup into an immutable
//! table keyed by canonical template key (`namespace.key` lowercase, or the
//! bare lowercased key). There is no mutation API after load; the [`reload`]
//! module swaps whole snapshots instead.
//!
//! [`reload`]: crate::reload

use std::collections::HashMap;

use crate::config::AppConfig;

/// A named credential available for template substitution.
#[derive(Debug, Clone)]
pub struct Secret {
    /// The literal secret value.
    pub value: String,
    /// Namespace label, if the raw name carried one.
    pub namespace: Option<String>,
    /// Wildcard URL patterns this secret may be sent to.
    /// Empty means "unrestricted", never "forbidden".
    pub allowed_urls: Vec<String>,
    /// Canonical lookup name: `namespace.key` or bare `key`, lowercased.
    pub template_key: String,
}

/// Process-wide immutable table of named secrets.
#[derive(Debug, Clone, Default)]
pub struct SecretStore {
    secrets: HashMap<String, Secret>,
}

impl SecretStore {
    /// Build the store from configuration.
    ///
    /// Each entry's raw name is parsed into an optional namespace and a key;
    /// a namespace, if present, is looked up against the configured
    /// namespace bindings to populate `allowed_urls`. Entries are processed
    /// in declaration order, so the last writer wins when two raw names
    /// normalize to the same template key.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut secrets = HashMap::new();
        for def in &config.secrets {
            let (namespace, template_key) = parse_raw_name(&def.name);
            let allowed_urls = namespace
                .as_deref()
                .and_then(|ns| {
                    config
                        .namespaces
                        .iter()
                        .find(|rule| rule.name.eq_ignore_ascii_case(ns))
                })
                .map(|rule| rule.allowed_urls.clone())
                .unwrap_or_default();
            secrets.insert(
                template_key.clone(),
                Secret {
                    value: def.value.clone(),
                    namespace,
                    allowed_urls,
                    template_key,
                },
            );
        }
        Self { secrets }
    }

    /// Look up a secret by template key (case-insensitive).
    pub fn lookup(&self, template_key: &str) -> Option<&Secret> {
        self.secrets.get(&template_key.to_lowercase())
    }

    /// Iterate over all loaded secrets.
    pub fn secrets(&self) -> impl Iterator<Item = &Secret> {
        self.secrets.values()
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

/// Split a raw secret name into an optional namespace and the canonical
/// template key.
///
/// Everything before the first separator (`.` or `:`) is the namespace,
/// everything after is the key; separators normalize to `.` and the whole
/// key is lowercased. A name with no separator, or with an empty namespace
/// or key segment, is a bare key.
fn parse_raw_name(raw: &str) -> (Option<String>, String) {
    let lowered = raw.trim().to_lowercase();
    if let Some(idx) = lowered.find(['.', ':']) {
        let (ns, rest) = lowered.split_at(idx);
        let key = &rest[1..];
        if !ns.is_empty() && !key.is_empty() {
            return (Some(ns.to_string()), format!("{}.{}", ns, key));
        }
    }
    (None, lowered.replace(':', "."))
}
