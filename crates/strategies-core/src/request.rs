use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use url::form_urlencoded;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            other => Err(format!("unsupported method '{}'", other)),
        }
    }
}

/// An outbound API call intercepted by the router.
///
/// `path` never contains a query string. The query is kept exactly as the
/// caller wrote it, so a live transport forwards it byte for byte; it is only
/// decoded when a mock handler asks for a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub method: Method,
    pub path: String,
    /// Raw query string, without the leading `?`.
    #[serde(default)]
    pub query: Option<String>,
    /// Header names are stored lowercase.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<Value>,
}

impl RouteRequest {
    /// Creates a request. A `?query` suffix on `target` is split off, as is,
    /// into [`RouteRequest::query`].
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        let target = target.into();
        let (path, query) = match target.split_once('?') {
            Some((path, raw)) => (path.to_string(), Some(raw.to_string())),
            None => (target, None),
        };

        Self {
            method,
            path,
            query,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::Get, target)
    }

    pub fn post(target: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, target).with_body(body)
    }

    pub fn delete(target: impl Into<String>) -> Self {
        Self::new(Method::Delete, target)
    }

    /// Appends a form-encoded `key=value` pair to the query.
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        let existing = self.query.take().unwrap_or_default();
        let mut serializer = form_urlencoded::Serializer::for_suffix(existing, 0);
        serializer.append_pair(key, value);
        self.query = Some(serializer.finish());
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_bearer(self, token: &str) -> Self {
        self.with_header("authorization", format!("Bearer {}", token))
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// First value of a query parameter, form-decoded.
    pub fn query_param(&self, key: &str) -> Option<String> {
        let raw = self.query.as_deref()?;
        form_urlencoded::parse(raw.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Token from an `Authorization: Bearer <token>` header.
    pub fn bearer_token(&self) -> Option<&str> {
        let value = self.header("authorization")?;
        let (scheme, token) = value.split_once(' ')?;
        scheme
            .eq_ignore_ascii_case("bearer")
            .then(|| token.trim())
            .filter(|t| !t.is_empty())
    }

    /// String field of a JSON body, trimmed. Empty strings count as missing.
    pub fn body_str(&self, field: &str) -> Option<&str> {
        self.body
            .as_ref()?
            .get(field)?
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
