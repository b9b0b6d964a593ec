use std::str::FromStr;
use std::time::Duration;

use careerverse_jobs::config::{DEFAULT_JOB_TIMEOUT, DEFAULT_POLL_INTERVAL};
use careerverse_jobs::PollerConfig;

/// Default roadmap API host for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default bound on a single HTTP call.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => anyhow::bail!("unknown log format '{other}', expected 'text' or 'json'"),
        }
    }
}

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Roadmap API host, e.g. `http://localhost:8000`.
    pub api_url: String,
    /// Poll cadence and overall deadline for each job.
    pub poller: PollerConfig,
    /// Bound on each individual HTTP request.
    pub request_timeout: Duration,
    pub log_format: LogFormat,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            poller: PollerConfig::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            log_format: LogFormat::Text,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                  |
    /// |------------------------|--------------------------|
    /// | `CAREERVERSE_API_URL`  | `http://localhost:8000`  |
    /// | `POLL_INTERVAL_MS`     | `300`                    |
    /// | `JOB_TIMEOUT_SECS`     | `300`                    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                     |
    /// | `LOG_FORMAT`           | `text`                   |
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading variables through
    /// `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let api_url = lookup("CAREERVERSE_API_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let poll_interval_ms: u64 = parse_or(
            &lookup,
            "POLL_INTERVAL_MS",
            u64::try_from(DEFAULT_POLL_INTERVAL.as_millis()).unwrap_or(u64::MAX),
        )?;
        let job_timeout_secs: u64 =
            parse_or(&lookup, "JOB_TIMEOUT_SECS", DEFAULT_JOB_TIMEOUT.as_secs())?;
        let request_timeout_secs: u64 =
            parse_or(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let log_format: LogFormat = parse_or(&lookup, "LOG_FORMAT", LogFormat::Text)?;

        let config = Self {
            api_url,
            poller: PollerConfig::default()
                .with_poll_interval(Duration::from_millis(poll_interval_ms))
                .with_timeout(Duration::from_secs(job_timeout_secs)),
            request_timeout: Duration::from_secs(request_timeout_secs),
            log_format,
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(
        mut self,
        api_url: Option<String>,
        poll_interval_ms: Option<u64>,
        timeout_secs: Option<u64>,
    ) -> anyhow::Result<Self> {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        if let Some(ms) = poll_interval_ms {
            self.poller = self.poller.with_poll_interval(Duration::from_millis(ms));
        }
        if let Some(secs) = timeout_secs {
            self.poller = self.poller.with_timeout(Duration::from_secs(secs));
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            anyhow::bail!(
                "CAREERVERSE_API_URL must be an http(s) URL, got '{}'",
                self.api_url
            );
        }
        self.poller.validate()?;
        if self.request_timeout.is_zero() {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }
        Ok(())
    }
}

/// Parse variable `name` if set, falling back to `default`.
fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| anyhow::anyhow!("{name} has an invalid value '{raw}': {e}")),
        None => Ok(default),
    }
}
