//! Request handling for the generation endpoint.

use log::{debug, warn};
use serde_json::{json, Value};

use super::upstream::Upstream;

/// Methods advertised to browsers in preflight responses
pub const ALLOWED_METHODS: &str = "GET,OPTIONS,PATCH,DELETE,POST,PUT";
/// Request headers browsers may send
pub const ALLOWED_HEADERS: &str = "X-CSRF-Token, X-Requested-With, Accept, Accept-Version, Content-Length, Content-MD5, Content-Type, Date, X-Api-Version";
/// Paths the endpoint answers on
pub const ROUTES: &[&str] = &["/generate", "/api/generate"];

/// A request as seen by the handler, independent of the HTTP server
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: String,
    /// Request target; any query string is ignored
    pub path: String,
    pub body: Vec<u8>,
}

impl ProxyRequest {
    pub fn new(method: &str, path: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            body: body.into(),
        }
    }
}

/// Response produced by the handler
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Response body bytes
    pub body: Vec<u8>,
}

impl ProxyResponse {
    fn new(status: u16, body: Vec<u8>) -> Self {
        let mut headers = cors_headers();
        if !body.is_empty() {
            headers.push(("Content-Type".into(), "application/json".into()));
        }
        Self {
            status,
            headers,
            body,
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self::new(status, json!({ "error": message }).to_string().into_bytes())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

fn cors_headers() -> Vec<(String, String)> {
    vec![
        ("Access-Control-Allow-Credentials".into(), "true".into()),
        ("Access-Control-Allow-Origin".into(), "*".into()),
        ("Access-Control-Allow-Methods".into(), ALLOWED_METHODS.into()),
        ("Access-Control-Allow-Headers".into(), ALLOWED_HEADERS.into()),
    ]
}

/// Pull a non-empty string `prompt` out of a JSON body
fn prompt_from_body(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .get("prompt")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

/// Maps requests to responses, calling the upstream for valid prompts
pub struct ProxyHandler<U: Upstream> {
    upstream: U,
    max_body_bytes: usize,
}

impl<U: Upstream> ProxyHandler<U> {
    pub fn new(upstream: U, max_body_bytes: usize) -> Self {
        Self {
            upstream,
            max_body_bytes,
        }
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    pub fn handle(&self, req: &ProxyRequest) -> ProxyResponse {
        if req.method.eq_ignore_ascii_case("OPTIONS") {
            return ProxyResponse::new(200, Vec::new());
        }

        let path = req.path.split('?').next().unwrap_or_default();
        if !ROUTES.contains(&path) {
            return ProxyResponse::error(404, "Not Found");
        }

        if !req.method.eq_ignore_ascii_case("POST") {
            return ProxyResponse::error(405, "Method Not Allowed");
        }

        if req.body.len() > self.max_body_bytes {
            return ProxyResponse::error(413, "Payload Too Large");
        }

        let prompt = match prompt_from_body(&req.body) {
            Some(p) => p,
            None => return ProxyResponse::error(400, "Prompt is required"),
        };

        debug!("proxy: forwarding prompt of {} bytes", prompt.len());
        match self.upstream.generate(&prompt) {
            Ok(body) => ProxyResponse::new(200, body),
            Err(e) => {
                warn!("proxy: upstream call failed: {}", e);
                ProxyResponse::error(500, "Internal Server Error")
            }
        }
    }
}
