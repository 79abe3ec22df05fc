//! # Vaultgate
//!
//! **Credential hygiene pipeline for outbound AI agent HTTP calls.**
//!
//! Vaultgate sits between an automated caller (e.g. an AI agent invoking
//! generated API tools) and the HTTP transport. Callers reference privileged
//! credentials *by name* via `{secrets.<key>}` placeholders, or hand in
//! per-call auth material (bearer tokens, API keys, basic-auth pairs, custom
//! headers). Vaultgate resolves the placeholders, enforces per-secret URL
//! scoping and a global allow/deny gate, and guarantees that no credential
//! value ever appears in text surfaced back to the caller.
//!
//! ## Architecture
//!
//! - **[`pattern`]** — wildcard URL pattern matcher (`*` matches any sequence)
//! - **[`store`]** — immutable table of named, optionally namespaced secrets
//! - **[`template`]** — `{secrets.<key>}` placeholder substitution over JSON-shaped payloads
//! - **[`auth`]** — dynamic per-call authorization applicator
//! - **[`filter`]** — global URL whitelist/blacklist gate
//! - **[`redact`]** — `[REDACTED]` scrubbing of all known sensitive values
//! - **[`pipeline`]** — the fixed-order request shaping stage tying it together
//! - **[`config`]** — TOML configuration with environment variable interpolation
//! - **[`audit`]** — SQLite-backed decision log with JSON/CSV export
//! - **[`reload`]** — config snapshot hot-reload via atomic swap
//! - **[`error`]** — unified error types using `thiserror`
//!
//! ## Quick Start
//!
//! ```no_run
//! use vaultgate::config::AppConfig;
//! use vaultgate::pipeline::{OutboundRequest, Pipeline};
//!
//! # fn main() -> vaultgate::error::Result<()> {
//! let config = AppConfig::load_from_path("vaultgate.toml".as_ref())?;
//! let pipeline = Pipeline::from_config(&config);
//!
//! let request = OutboundRequest {
//!     url: "https://api.acme.com/v1/items?key={secrets.acme.api_key}".to_string(),
//!     ..Default::default()
//! };
//! let prepared = pipeline.prepare(&request, None)?;
//! // hand `prepared` to the transport, then scrub the response:
//! let body = pipeline.redact("response text", &prepared.sensitive);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod filter;
pub mod pattern;
pub mod pipeline;
pub mod redact;
pub mod reload;
pub mod store;
pub mod template;
