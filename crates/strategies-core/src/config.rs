use crate::error::{Result, RouterError};
use crate::latency::LatencyRange;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Routing mode, fixed for the lifetime of a router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Requests are answered locally with generated data.
    Mock,
    /// Requests are forwarded unmodified to the backend.
    Live,
}

impl Mode {
    pub fn from_flag(demo: bool) -> Self {
        if demo { Mode::Mock } else { Mode::Live }
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, Mode::Mock)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Mock => f.write_str("mock"),
            Mode::Live => f.write_str("live"),
        }
    }
}

/// Router configuration, read once at startup.
///
/// ## Environment
/// - `DEMO_MODE`: truthy (`1`, `true`, `yes`, `on`) selects [`Mode::Mock`].
/// - `API_BASE_URL`: live backend origin.
/// - `API_PREFIX`: prefix the API is mounted under.
/// - `DEMO_LATENCY_MIN_MS` / `DEMO_LATENCY_MAX_MS`: simulated delay bounds.
/// - `DEMO_SEED`: seed for reproducible mock payloads.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    mode: Mode,
    api_base_url: Option<Url>,
    api_prefix: String,
    latency: LatencyRange,
    seed: Option<u64>,
}

impl RouterConfig {
    fn with_mode(mode: Mode, api_base_url: Option<Url>) -> Self {
        Self {
            mode,
            api_base_url,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            latency: LatencyRange::default(),
            seed: None,
        }
    }

    /// Mock configuration with default prefix and latency. No backend URL is
    /// needed since nothing leaves the process.
    pub fn mock() -> Self {
        Self::with_mode(Mode::Mock, None)
    }

    pub fn live(api_base_url: &str) -> Result<Self> {
        Ok(Self::with_mode(Mode::Live, Some(parse_base_url(api_base_url)?)))
    }

    /// Loads the configuration from the process environment, reading a `.env`
    /// file first if one exists.
    #[tracing::instrument]
    pub fn from_env() -> Result<Self> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let demo = lookup("DEMO_MODE").map(|v| parse_flag(&v)).unwrap_or(false);
        let base = lookup("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let mut config = Self::with_mode(Mode::from_flag(demo), Some(parse_base_url(&base)?));

        if let Some(prefix) = lookup("API_PREFIX") {
            config.api_prefix = normalize_prefix(&prefix);
        }

        let min = parse_u64(&lookup, "DEMO_LATENCY_MIN_MS")?
            .unwrap_or(LatencyRange::DEFAULT_MIN_MS);
        let max = parse_u64(&lookup, "DEMO_LATENCY_MAX_MS")?
            .unwrap_or(LatencyRange::DEFAULT_MAX_MS);
        config.latency = LatencyRange::new(min, max)?;
        config.seed = parse_u64(&lookup, "DEMO_SEED")?;

        tracing::info!(mode = %config.mode, prefix = %config.api_prefix, "Loaded router configuration");
        Ok(config)
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.api_prefix = normalize_prefix(prefix);
        self
    }

    pub fn with_latency(mut self, latency: LatencyRange) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn api_base_url(&self) -> Option<&Url> {
        self.api_base_url.as_ref()
    }

    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    pub fn latency(&self) -> LatencyRange {
        self.latency
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| RouterError::Config(format!("invalid API base URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RouterError::Config(format!(
            "unsupported API base URL scheme '{}'",
            other
        ))),
    }
}

fn parse_u64<F>(lookup: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| {
            v.trim()
                .parse::<u64>()
                .map_err(|e| RouterError::Config(format!("{} must be an integer: {}", key, e)))
        })
        .transpose()
}

/// Leading slash, no trailing slash. An empty prefix mounts the API at the root.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
