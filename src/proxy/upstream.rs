//! Clients for the text generation API.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::IgnoredAny;
use serde_json::json;
use url::Url;

use super::ProxyConfig;
use crate::{Error, Result};

/// Something that turns a prompt into a raw JSON generation response
pub trait Upstream: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<Vec<u8>>;
}

impl<U: Upstream + ?Sized> Upstream for Box<U> {
    fn generate(&self, prompt: &str) -> Result<Vec<u8>> {
        (**self).generate(prompt)
    }
}

fn build_client(timeout_ms: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()
        .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))
}

/// Read a response, requiring a success status and a JSON body
fn read_json_body(resp: reqwest::blocking::Response) -> Result<Vec<u8>> {
    let status = resp.status();
    let body = resp.bytes()?.to_vec();
    if !status.is_success() {
        return Err(Error::UpstreamError(format!("status {}", status.as_u16())));
    }
    serde_json::from_slice::<IgnoredAny>(&body)
        .map_err(|e| Error::UpstreamError(format!("response is not JSON: {}", e)))?;
    Ok(body)
}

/// Calls the generation API directly with the server-held credential
pub struct GeminiClient {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::ConfigError("missing API key".into()));
        }
        Ok(Self {
            client: build_client(config.timeout_ms)?,
            endpoint: endpoint_url(&config.base_url, &config.model)?,
            api_key: config.api_key.clone(),
        })
    }

    /// Endpoint without the credential
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// `{base}/v1beta/models/{model}:generateContent`
pub fn endpoint_url(base_url: &str, model: &str) -> Result<Url> {
    let raw = format!(
        "{}/v1beta/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    );
    Url::parse(&raw).map_err(|e| Error::ConfigError(format!("invalid upstream URL: {}", e)))
}

impl Upstream for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({ "contents": [{ "parts": [{ "text": prompt }] }] }))
            .send()?;
        read_json_body(resp)
    }
}

/// Calls a running proxy endpoint, the way the site's contact form does
pub struct ProxyClient {
    client: Client,
    endpoint: Url,
}

impl ProxyClient {
    pub fn new(endpoint: &str, timeout_ms: u64) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| Error::ConfigError(format!("invalid endpoint {}: {}", endpoint, e)))?;
        Ok(Self {
            client: build_client(timeout_ms)?,
            endpoint,
        })
    }
}

impl Upstream for ProxyClient {
    fn generate(&self, prompt: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({ "prompt": prompt }))
            .send()?;
        read_json_body(resp)
    }
}
