//! Dynamic per-call authorization.
//!
//! Callers may hand in an [`AuthDescriptor`] alongside a request. The
//! applicator maps it to concrete header/query mutations and records every
//! raw credential field — plus any derived encoding — in the request's
//! [`SensitiveValues`] so no downstream text can echo them unredacted.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::redact::SensitiveValues;

/// Header used by `apikey` descriptors with no explicit destination.
pub const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";

/// Caller-supplied, per-call authorization instructions.
///
/// Deserialized from `{ "type": "bearer", "value": "..." }`-shaped input.
/// Fields a variant requires are still optional at the type level: a
/// descriptor missing them performs no mutation rather than failing the
/// request (see [`apply`]).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthDescriptor {
    /// `Authorization: Bearer <value>`.
    Bearer { value: Option<String> },
    /// API key in a header (default `X-API-Key`) or a query parameter.
    ApiKey {
        value: Option<String>,
        header: Option<String>,
        query: Option<String>,
    },
    /// `Authorization: Basic base64(username:password)`.
    Basic {
        username: Option<String>,
        password: Option<String>,
    },
    /// Arbitrary header set verbatim.
    Custom {
        value: Option<String>,
        header: Option<String>,
    },
}

/// Apply a dynamic auth descriptor to the request's header and query maps.
///
/// With no descriptor this is a no-op. Otherwise every raw credential field
/// present is appended to `sensitive` first — even fields the variant does
/// not use — and then the variant's mutation is performed. A descriptor
/// missing required fields for its type performs no mutation and raises no
/// error. Entries written here overwrite any statically substituted entry
/// under the same name.
pub fn apply(
    auth: Option<&AuthDescriptor>,
    url: &str,
    headers: &mut HashMap<String, String>,
    query: &mut HashMap<String, String>,
    sensitive: &mut SensitiveValues,
) {
    let Some(auth) = auth else {
        return;
    };

    // Raw credential material is tracked unconditionally, before any
    // mutation or failure path downstream can echo it.
    match auth {
        AuthDescriptor::Bearer { value }
        | AuthDescriptor::ApiKey { value, .. }
        | AuthDescriptor::Custom { value, .. } => {
            sensitive.push_opt(value.as_deref());
        }
        AuthDescriptor::Basic { username, password } => {
            sensitive.push_opt(username.as_deref());
            sensitive.push_opt(password.as_deref());
        }
    }

    match auth {
        AuthDescriptor::Bearer { value: Some(value) } => {
            headers.insert("Authorization".to_string(), format!("Bearer {}", value));
        }
        AuthDescriptor::ApiKey {
            value: Some(value),
            header,
            query: query_param,
        } => {
            // Exactly one destination; header wins if both were supplied.
            if let Some(header_name) = header {
                headers.insert(header_name.clone(), value.clone());
            } else if let Some(param) = query_param {
                query.insert(param.clone(), value.clone());
            } else {
                headers.insert(DEFAULT_API_KEY_HEADER.to_string(), value.clone());
            }
        }
        AuthDescriptor::Basic {
            username: Some(username),
            password: Some(password),
        } => {
            let encoded = BASE64.encode(format!("{}:{}", username, password));
            // The encoded credential is what actually travels on the wire,
            // so it must be scrubbable from echoed text too.
            sensitive.push(encoded.clone());
            headers.insert("Authorization".to_string(), format!("Basic {}", encoded));
        }
        AuthDescriptor::Custom {
            value: Some(value),
            header: Some(header_name),
        } => {
            headers.insert(header_name.clone(), value.clone());
        }
        other => {
            debug!(
                "Auth descriptor {:?} missing required fields; no auth applied for {}",
                variant_name(other),
                url
            );
        }
    }
}

fn variant_name(auth: &AuthDescriptor) -> &'static str {
    match auth {
        AuthDescriptor::Bearer { .. } => "bearer",
        AuthDescriptor::ApiKey { .. } => "apikey",
        AuthDescriptor::Basic { .. } => "basic",
        AuthDescriptor::Custom { .. } => "custom",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_to_empty(
        auth: Option<&AuthDescriptor>,
    ) -> (
        HashMap<String, String>,
        HashMap<String, String>,
        SensitiveValues,
    ) {
        let mut headers = HashMap::new();
        let mut query = HashMap::new();
        let mut sensitive = SensitiveValues::new();
        apply(auth, "https://a.com", &mut headers, &mut query, &mut sensitive);
        (headers, query, sensitive)
    }

    #[test]
    fn absent_descriptor_is_noop() {
        let (headers, query, sensitive) = apply_to_empty(None);
        assert!(headers.is_empty());
        assert!(query.is_empty());
        assert!(sensitive.is_empty());
    }

    #[test]
    fn bearer_sets_authorization_header() {
        let auth = AuthDescriptor::Bearer {
            value: Some("tok-1".to_string()),
        };
        let (headers, _, sensitive) = apply_to_empty(Some(&auth));
        assert_eq!(headers["Authorization"], "Bearer tok-1");
        assert!(sensitive.iter().any(|v| v == "tok-1"));
    }

    #[test]
    fn apikey_defaults_to_fixed_header() {
        let auth = AuthDescriptor::ApiKey {
            value: Some("key-1".to_string()),
            header: None,
            query: None,
        };
        let (headers, query, _) = apply_to_empty(Some(&auth));
        assert_eq!(headers[DEFAULT_API_KEY_HEADER], "key-1");
        assert!(query.is_empty());
    }

    #[test]
    fn apikey_uses_named_header() {
        let auth = AuthDescriptor::ApiKey {
            value: Some("key-1".to_string()),
            header: Some("X-Custom-Key".to_string()),
            query: None,
        };
        let (headers, query, _) = apply_to_empty(Some(&auth));
        assert_eq!(headers["X-Custom-Key"], "key-1");
        assert!(query.is_empty());
    }

    #[test]
    fn apikey_uses_query_param() {
        let auth = AuthDescriptor::ApiKey {
            value: Some("key-1".to_string()),
            header: None,
            query: Some("api_key".to_string()),
        };
        let (headers, query, _) = apply_to_empty(Some(&auth));
        assert!(headers.is_empty());
        assert_eq!(query["api_key"], "key-1");
    }

    #[test]
    fn apikey_header_wins_over_query() {
        let auth = AuthDescriptor::ApiKey {
            value: Some("key-1".to_string()),
            header: Some("X-K".to_string()),
            query: Some("api_key".to_string()),
        };
        let (headers, query, _) = apply_to_empty(Some(&auth));
        assert_eq!(headers["X-K"], "key-1");
        assert!(query.is_empty());
    }

    #[test]
    fn basic_encodes_credentials() {
        let auth = AuthDescriptor::Basic {
            username: Some("u".to_string()),
            password: Some("p".to_string()),
        };
        let (headers, _, sensitive) = apply_to_empty(Some(&auth));
        let encoded = BASE64.encode("u:p");
        assert_eq!(headers["Authorization"], format!("Basic {}", encoded));
        // Raw fields and the wire encoding are all tracked.
        assert!(sensitive.iter().any(|v| v == "u"));
        assert!(sensitive.iter().any(|v| v == "p"));
        assert!(sensitive.iter().any(|v| v == encoded));
    }

    #[test]
    fn basic_missing_password_is_noop_but_tracked() {
        let auth = AuthDescriptor::Basic {
            username: Some("u".to_string()),
            password: None,
        };
        let (headers, _, sensitive) = apply_to_empty(Some(&auth));
        assert!(headers.is_empty());
        assert!(sensitive.iter().any(|v| v == "u"));
    }

    #[test]
    fn custom_sets_named_header() {
        let auth = AuthDescriptor::Custom {
            value: Some("v".to_string()),
            header: Some("X-Session".to_string()),
        };
        let (headers, _, _) = apply_to_empty(Some(&auth));
        assert_eq!(headers["X-Session"], "v");
    }

    #[test]
    fn custom_missing_header_is_noop_but_tracked() {
        let auth = AuthDescriptor::Custom {
            value: Some("v".to_string()),
            header: None,
        };
        let (headers, _, sensitive) = apply_to_empty(Some(&auth));
        assert!(headers.is_empty());
        assert!(sensitive.iter().any(|v| v == "v"));
    }

    #[test]
    fn bearer_overwrites_existing_authorization() {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "Bearer static".to_string());
        let mut query = HashMap::new();
        let mut sensitive = SensitiveValues::new();
        let auth = AuthDescriptor::Bearer {
            value: Some("dynamic".to_string()),
        };
        apply(
            Some(&auth),
            "https://a.com",
            &mut headers,
            &mut query,
            &mut sensitive,
        );
        assert_eq!(headers["Authorization"], "Bearer dynamic");
    }

    #[test]
    fn descriptor_deserializes_from_tagged_json() {
        let auth: AuthDescriptor =
            serde_json::from_str(r#"{"type":"apikey","value":"k","query":"api_key"}"#).unwrap();
        assert!(matches!(
            auth,
            AuthDescriptor::ApiKey { value: Some(ref v), header: None, query: Some(ref q) }
                if v == "k" && q == "api_key"
        ));

        let auth: AuthDescriptor =
            serde_json::from_str(r#"{"type":"basic","username":"u","password":"p"}"#).unwrap();
        assert!(matches!(auth, AuthDescriptor::Basic { .. }));
    }
}
