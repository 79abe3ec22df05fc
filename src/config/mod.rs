//! TOML configuration types for Vaultgate.
//!
//! The top-level [`AppConfig`] is deserialized from `vaultgate.toml` and
//! contains the named secret definitions, the namespace URL-restriction
//! bindings, and the global URL filter lists.
//!
//! # Example `vaultgate.toml`
//!
//! ```toml
//! [[secrets]]
//! name = "acme.api_key"
//! value = "${ACME_API_KEY}"
//!
//! [[secrets]]
//! name = "github_token"
//! value = "ghp-example"
//!
//! [[namespaces]]
//! name = "acme"
//! allowed_urls = ["https://api.acme.com/*"]
//!
//! [filter]
//! whitelist = ["https://api.acme.com/*", "https://api.github.com/*"]
//! ```

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultgateError};

/// A single named secret definition (`[[secrets]]` entry).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecretDef {
    /// Raw secret name, optionally namespaced (e.g. `"acme.api_key"` or
    /// `"acme:api_key"`). Everything before the first `.` or `:` is the
    /// namespace; without a separator the whole name is a bare key.
    pub name: String,
    /// The secret value, commonly an `${ENV_VAR}` reference.
    pub value: String,
}

/// A namespace → allowed-URL binding (`[[namespaces]]` entry).
///
/// Every secret in the named namespace may only be substituted into
/// requests whose resolved URL matches at least one of the patterns.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NamespaceRule {
    /// Namespace label (matched case-insensitively against secret names).
    pub name: String,
    /// Wildcard URL patterns. An empty list means "unrestricted".
    #[serde(default)]
    pub allowed_urls: Vec<String>,
}

/// Global URL filter configuration (`[filter]` section).
///
/// Either list may be absent. When a whitelist is configured it takes
/// unconditional precedence and any blacklist is ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FilterConfig {
    /// URLs must match at least one of these patterns to be allowed.
    #[serde(default)]
    pub whitelist: Option<Vec<String>>,
    /// URLs matching any of these patterns are denied.
    #[serde(default)]
    pub blacklist: Option<Vec<String>>,
}

/// Top-level application configuration deserialized from `vaultgate.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Named secret definitions, in declaration order (last writer wins on
    /// duplicate canonical keys).
    #[serde(default)]
    pub secrets: Vec<SecretDef>,
    /// Namespace URL-restriction bindings.
    #[serde(default)]
    pub namespaces: Vec<NamespaceRule>,
    /// Optional global URL filter.
    #[serde(default)]
    pub filter: FilterConfig,
}

impl AppConfig {
    /// Load and parse the configuration from a TOML file at the given path.
    ///
    /// Before parsing, `${VAR}` and `$VAR` placeholders in the TOML text are
    /// replaced with the corresponding environment variable values. An error
    /// is returned if a referenced variable is not set.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let content = substitute_env_vars(&content)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Replace `${VAR_NAME}` and `$VAR_NAME` placeholders with environment variable values.
///
/// Returns an error containing the variable name if the variable is not set.
fn substitute_env_vars(input: &str) -> Result<String> {
    // Match ${VAR_NAME} (braces form)
    let re_braces = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
    // Match $VAR_NAME (no braces, uppercase + underscore only to avoid false positives)
    let re_bare = Regex::new(r"\$([A-Z_][A-Z0-9_]*)").unwrap();

    let mut result = input.to_string();

    // First pass: ${VAR} form
    for cap in re_braces.captures_iter(input) {
        let var_name = &cap[1];
        let value = std::env::var(var_name)
            .map_err(|_| VaultgateError::ConfigEnvVar(var_name.to_string()))?;
        result = result.replace(&cap[0], &value);
    }

    // Second pass: $VAR form on the already-substituted string
    let intermediate = result.clone();
    for cap in re_bare.captures_iter(&intermediate) {
        let var_name = &cap[1];
        let value = std::env::var(var_name)
            .map_err(|_| VaultgateError::ConfigEnvVar(var_name.to_string()))?;
        result = result.replace(&cap[0], &value);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[secrets]]
name = "acme.api_key"
value = "sk-acme-123"

[[secrets]]
name = "token"
value = "tok-456"

[[namespaces]]
name = "acme"
allowed_urls = ["https://api.acme.com/*"]

[filter]
whitelist = ["https://api.acme.com/*"]
"#;

    #[test]
    fn parses_full_config() {
        let config: AppConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.secrets.len(), 2);
        assert_eq!(config.secrets[0].name, "acme.api_key");
        assert_eq!(config.namespaces.len(), 1);
        assert_eq!(config.namespaces[0].allowed_urls.len(), 1);
        assert!(config.filter.whitelist.is_some());
        assert!(config.filter.blacklist.is_none());
    }

    #[test]
    fn empty_config_is_valid() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.secrets.is_empty());
        assert!(config.namespaces.is_empty());
        assert!(config.filter.whitelist.is_none());
    }

    #[test]
    fn env_var_braces_form_substituted() {
        std::env::set_var("VAULTGATE_TEST_BRACES", "injected-value");
        let result = substitute_env_vars("value = \"${VAULTGATE_TEST_BRACES}\"").unwrap();
        assert_eq!(result, "value = \"injected-value\"");
    }

    #[test]
    fn env_var_bare_form_substituted() {
        std::env::set_var("VAULTGATE_TEST_BARE", "bare-value");
        let result = substitute_env_vars("value = \"$VAULTGATE_TEST_BARE\"").unwrap();
        assert_eq!(result, "value = \"bare-value\"");
    }

    #[test]
    fn missing_env_var_is_error() {
        let result = substitute_env_vars("value = \"${VAULTGATE_TEST_DEFINITELY_UNSET}\"");
        assert!(matches!(
            result,
            Err(VaultgateError::ConfigEnvVar(name)) if name == "VAULTGATE_TEST_DEFINITELY_UNSET"
        ));
    }

    #[test]
    fn load_from_path_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vaultgate.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.secrets[1].name, "token");
        assert_eq!(config.secrets[1].value, "tok-456");
    }

    #[test]
    fn load_from_missing_path_is_error() {
        let result = AppConfig::load_from_path(Path::new("/nonexistent/vaultgate.toml"));
        assert!(matches!(result, Err(VaultgateError::Io(_))));
    }
}
