//! Global URL allow/deny gate.
//!
//! The filter is evaluated once per request against the fully assembled URL
//! (after secret substitution and query parameter assembly), never against
//! an earlier partial URL.

use tracing::warn;

use crate::config::FilterConfig;
use crate::pattern;

/// Result of a filter evaluation, including the reason for a denial.
#[derive(Debug, Clone)]
pub struct FilterDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl FilterDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: String) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }
}

/// Whitelist/blacklist gate over finalized URLs.
///
/// A configured whitelist takes unconditional precedence: the URL must
/// match at least one whitelist pattern, and the blacklist is ignored.
/// With only a blacklist, any match denies. With neither, all URLs pass.
#[derive(Debug, Clone, Default)]
pub struct UrlFilter {
    whitelist: Option<Vec<String>>,
    blacklist: Option<Vec<String>>,
}

impl UrlFilter {
    pub fn from_config(config: &FilterConfig) -> Self {
        if config.whitelist.is_some() && config.blacklist.is_some() {
            warn!(
                "Both whitelist and blacklist are configured; \
                 the whitelist takes precedence and the blacklist is ignored"
            );
        }
        Self {
            whitelist: config.whitelist.clone(),
            blacklist: config.blacklist.clone(),
        }
    }

    /// Evaluate a finalized URL against the configured lists.
    pub fn check(&self, url: &str) -> FilterDecision {
        if let Some(whitelist) = &self.whitelist {
            return if whitelist.iter().any(|p| pattern::matches(url, p)) {
                FilterDecision::allow()
            } else {
                FilterDecision::deny(format!(
                    "URL '{}' does not match any whitelist pattern",
                    url
                ))
            };
        }

        if let Some(blacklist) = &self.blacklist {
            if let Some(hit) = blacklist.iter().find(|p| pattern::matches(url, p)) {
                return FilterDecision::deny(format!(
                    "URL '{}' matches blacklist pattern '{}'",
                    url, hit
                ));
            }
        }

        FilterDecision::allow()
    }
}
