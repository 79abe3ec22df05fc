use thiserror::Error;

/// Unified error type for the Vaultgate library.
#[derive(Debug, Error)]
pub enum VaultgateError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Environment variable not set: {0}")]
    ConfigEnvVar(String),

    #[error("Secret '{key}' is not permitted for URL '{url}'")]
    UrlRestriction { key: String, url: String },

    #[error("Request blocked by global URL filter: {0}")]
    FilterDenied(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Audit pool error: {0}")]
    Pool(String),
}

pub type Result<T> = std::result::Result<T, VaultgateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: VaultgateError = io_err.into();
        assert!(matches!(err, VaultgateError::Io(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn url_restriction_names_key_and_url() {
        let err = VaultgateError::UrlRestriction {
            key: "acme.api_key".to_string(),
            url: "https://evil.com/steal".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("acme.api_key"));
        assert!(msg.contains("https://evil.com/steal"));
    }

    #[test]
    fn filter_denied_displays_reason() {
        let err = VaultgateError::FilterDenied("no whitelist match".to_string());
        assert_eq!(
            err.to_string(),
            "Request blocked by global URL filter: no whitelist match"
        );
    }

    #[test]
    fn config_parse_error_converts() {
        let bad_toml = "[invalid";
        let toml_err = toml::from_str::<toml::Value>(bad_toml).unwrap_err();
        let err: VaultgateError = toml_err.into();
        assert!(matches!(err, VaultgateError::ConfigParse(_)));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VaultgateError>();
    }
}
