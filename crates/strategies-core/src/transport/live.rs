use crate::config::Mode;
use crate::error::Result;
use crate::request::{Method, RouteRequest};
use crate::response::ApiResponse;
use crate::transport::Transport;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Transport that forwards requests verbatim to the backend.
///
/// Method, path, raw query, headers and body are passed through unchanged;
/// the backend's status is returned as-is.
#[derive(Clone)]
pub struct LiveTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl LiveTransport {
    pub fn new(base_url: Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL joined with the request path, keeping any path prefix the
    /// base URL carries.
    fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    /// Full target URL. The raw query is appended untouched.
    fn target(&self, request: &RouteRequest) -> String {
        let mut url = self.endpoint(&request.path);
        if let Some(query) = &request.query {
            url.push('?');
            url.push_str(query);
        }
        url
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// JSON when the body parses, a JSON string for other text, `null` when empty.
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[async_trait]
impl Transport for LiveTransport {
    fn mode(&self) -> Mode {
        Mode::Live
    }

    #[tracing::instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn send(&self, request: RouteRequest) -> Result<ApiResponse> {
        let url = self.target(&request);
        let mut builder = self.client.request(to_reqwest(request.method), &url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            if !request.headers.contains_key("content-type") {
                builder = builder.header(CONTENT_TYPE, "application/json");
            }
            builder = builder.body(serde_json::to_vec(body)?);
        }

        tracing::debug!(%url, "Forwarding request to backend");
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        tracing::debug!(status, "Backend responded");
        Ok(ApiResponse::new(status, decode_body(&bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_join() {
        let transport = LiveTransport::new(Url::parse("http://api.example.com").unwrap()).unwrap();
        assert_eq!(
            transport.endpoint("/api/v1/auth/me"),
            "http://api.example.com/api/v1/auth/me"
        );

        let nested =
            LiveTransport::new(Url::parse("http://example.com/backend/").unwrap()).unwrap();
        assert_eq!(nested.endpoint("healthz"), "http://example.com/backend/healthz");
    }

    #[test]
    fn test_target_keeps_raw_query() {
        let transport = LiveTransport::new(Url::parse("http://api.example.com").unwrap()).unwrap();
        let request = RouteRequest::get("/api/v1/x?q=a%20b&flag;z=1");
        assert_eq!(
            transport.target(&request),
            "http://api.example.com/api/v1/x?q=a%20b&flag;z=1"
        );
        assert_eq!(
            transport.target(&RouteRequest::get("/healthz")),
            "http://api.example.com/healthz"
        );
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(b""), Value::Null);
        assert_eq!(decode_body(br#"{"ok":true}"#), json!({ "ok": true }));
        assert_eq!(decode_body(b"plain text"), json!("plain text"));
    }
}
