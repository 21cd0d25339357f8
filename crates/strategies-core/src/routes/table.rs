use crate::request::Method;
use crate::routes::MockHandler;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A path pattern such as `/api/v1/auth/sessions/{session_id}`.
///
/// Empty segments are ignored, so trailing slashes never matter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(raw: &str) -> Self {
        let segments = split_path(raw)
            .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(s.to_string()),
            })
            .collect();
        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Number of literal segments; higher is more specific.
    pub fn specificity(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    /// Captured parameters when `path` matches segment-for-segment.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let parts: Vec<&str> = split_path(path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = PathParams::default();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.0.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(params)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(BTreeMap<String, String>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

/// Result of resolving a request against the table.
pub struct RouteMatch {
    pub handler: Arc<dyn MockHandler>,
    pub params: PathParams,
    pub pattern: String,
}

#[derive(Clone)]
struct RouteEntry {
    method: Method,
    pattern: RoutePattern,
    handler: Arc<dyn MockHandler>,
}

/// Ordered dispatch table of mock handlers.
#[derive(Default, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Registers a handler for `method` + `pattern`.
    pub fn register<H: MockHandler + 'static>(&mut self, method: Method, pattern: &str, handler: H) {
        tracing::info!(%method, pattern, handler = handler.id(), "Registered mock route");
        self.entries.push(RouteEntry {
            method,
            pattern: RoutePattern::parse(pattern),
            handler: Arc::new(handler),
        });
    }

    /// Finds the handler for a request path (query string excluded).
    ///
    /// When several patterns match, the one with the most literal segments
    /// wins; equally specific patterns resolve to the earliest registration.
    pub fn resolve(&self, method: Method, path: &str) -> Option<RouteMatch> {
        let mut best: Option<(&RouteEntry, PathParams)> = None;

        for entry in self.entries.iter().filter(|e| e.method == method) {
            let Some(params) = entry.pattern.matches(path) else {
                continue;
            };
            let better = match &best {
                Some((current, _)) => {
                    entry.pattern.specificity() > current.pattern.specificity()
                }
                None => true,
            };
            if better {
                best = Some((entry, params));
            }
        }

        best.map(|(entry, params)| RouteMatch {
            handler: entry.handler.clone(),
            params,
            pattern: entry.pattern.as_str().to_string(),
        })
    }

    /// Registered `(method, pattern)` pairs in registration order.
    pub fn routes(&self) -> Vec<(Method, String)> {
        self.entries
            .iter()
            .map(|e| (e.method, e.pattern.as_str().to_string()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
