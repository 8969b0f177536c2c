//! Generation proxy.
//!
//! A small HTTP endpoint that takes a prompt from the browser, forwards it to
//! the text generation API with a credential only the server knows, and relays
//! the upstream JSON back. The handler is transport-agnostic
//! ([`ProxyHandler`]); [`ProxyServer`] puts it behind `tiny_http`.

pub mod handler;
pub mod server;
pub mod upstream;

use std::fmt;

use crate::{Error, Result};

pub use handler::{ProxyHandler, ProxyRequest, ProxyResponse};
pub use server::{ProxyServer, ServerHandle};
pub use upstream::{GeminiClient, ProxyClient, Upstream};

/// Environment variable holding the upstream credential
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
/// Optional model override
pub const MODEL_VAR: &str = "GEMINI_MODEL";
/// Optional bind address override
pub const BIND_VAR: &str = "SHOWREEL_BIND";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

/// Configuration for the proxy server and its upstream client
///
/// The defaults bind to localhost and talk to the public generation API. The
/// credential has no default: use [`ProxyConfig::from_env`] or set it
/// explicitly.
///
/// ```
/// let cfg = showreel::proxy::ProxyConfig::default();
/// assert!(cfg.api_key.is_empty());
/// assert_eq!(cfg.bind, "127.0.0.1:3000");
/// ```
#[derive(Clone)]
pub struct ProxyConfig {
    /// Address the HTTP server listens on
    pub bind: String,
    /// Upstream credential; never sent to clients or logged
    pub api_key: String,
    /// Scheme and host of the generation API
    pub base_url: String,
    /// Model name used in the upstream path
    pub model: String,
    /// Upstream request timeout in milliseconds
    pub timeout_ms: u64,
    /// Largest request body accepted from clients
    pub max_body_bytes: usize,
    /// Number of threads serving requests
    pub workers: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_ms: 30000,
            max_body_bytes: 64 * 1024,
            workers: num_cpus::get().max(1),
        }
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("bind", &self.bind)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("workers", &self.workers)
            .finish()
    }
}

impl ProxyConfig {
    /// Build a config from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. The credential is required.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        cfg.api_key = lookup(API_KEY_VAR)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::ConfigError(format!("{} is not set", API_KEY_VAR)))?;
        if let Some(model) = lookup(MODEL_VAR).filter(|m| !m.is_empty()) {
            cfg.model = model;
        }
        if let Some(bind) = lookup(BIND_VAR).filter(|b| !b.is_empty()) {
            cfg.bind = bind;
        }
        Ok(cfg)
    }

    /// Check the values a server needs before binding
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::ConfigError(format!("{} is not set", API_KEY_VAR)));
        }
        if self.model.is_empty() {
            return Err(Error::ConfigError("model must not be empty".into()));
        }
        if self.workers == 0 {
            return Err(Error::ConfigError("workers must be at least 1".into()));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| Error::ConfigError(format!("invalid base URL {}: {}", self.base_url, e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn credential_is_required() {
        let err = ProxyConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));

        let err = ProxyConfig::from_lookup(lookup(&[(API_KEY_VAR, "  ")])).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn reads_overrides() {
        let cfg = ProxyConfig::from_lookup(lookup(&[
            (API_KEY_VAR, "secret"),
            (MODEL_VAR, "gemini-test"),
            (BIND_VAR, "0.0.0.0:8080"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_key, "secret");
        assert_eq!(cfg.model, "gemini-test");
        assert_eq!(cfg.bind, "0.0.0.0:8080");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn debug_redacts_key() {
        let cfg = ProxyConfig {
            api_key: "super-secret".into(),
            ..Default::default()
        };
        let dbg = format!("{:?}", cfg);
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let cfg = ProxyConfig {
            api_key: "k".into(),
            base_url: "not a url".into(),
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::ConfigError(_))));
    }
}
