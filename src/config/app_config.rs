use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::domain::{DomainError, RateLimitRule};
use crate::infrastructure::observability::ObservabilityConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub scraper: ScraperConfig,
    pub browser: BrowserConfig,
    pub cache: CacheConfig,
    pub rate_limit: RateLimitSettings,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Key rate limits on the first `X-Forwarded-For` hop instead of the peer
    pub trust_forwarded_for: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Upstream site and plain HTTP fetching
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub base_url: String,
    pub user_agent: String,
    pub accept_language: String,
    pub timeout_secs: u64,
    /// Bodies of this many characters or fewer count as failed fetches
    pub min_document_len: usize,
    pub http_proxy: Option<String>,
}

/// Headless browser fetching
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub enabled: bool,
    pub headless: bool,
    /// DevTools HTTP endpoint of a running browser; a local one is launched when unset
    pub endpoint: Option<String>,
    pub executable: String,
    pub proxy: Option<String>,
    pub settle_ms: u64,
    pub load_fallback_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub max_capacity: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub enabled: bool,
    pub limit: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10000,
            trust_forwarded_for: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://mangatek.com".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120 Safari/537.36".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            timeout_secs: 20,
            min_document_len: 50,
            http_proxy: None,
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            headless: true,
            endpoint: None,
            executable: "chromium".to_string(),
            proxy: None,
            settle_ms: 300,
            load_fallback_timeout_ms: 5000,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            max_capacity: 1024,
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            limit: "15/minute".to_string(),
        }
    }
}

impl ScraperConfig {
    /// Base URL without a trailing slash
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Host that user-supplied URLs must belong to
    pub fn allowed_host(&self) -> Result<String, DomainError> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            DomainError::configuration(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;

        let host = url
            .host_str()
            .ok_or_else(|| DomainError::configuration("Base URL has no host"))?;

        Ok(host.trim_start_matches("www.").to_string())
    }
}

impl RateLimitSettings {
    /// The enforced rule. Of a `;`-separated list only the first is kept.
    pub fn rule(&self) -> Result<RateLimitRule, DomainError> {
        let mut limits = self.limit.split(';').map(str::trim).filter(|l| !l.is_empty());
        let rule: RateLimitRule = limits.next().unwrap_or_default().parse()?;

        let ignored: Vec<&str> = limits.collect();
        if !ignored.is_empty() {
            warn!("Only the first rate limit is enforced; ignoring {}", ignored.join("; "));
        }

        Ok(rule)
    }
}

/// Short environment variables used by the container deployment.
///
/// They map onto regular configuration keys and take precedence over
/// files and `APP__*` variables. The two browser flags follow the
/// deployment convention where only `"1"` means on.
pub fn operational_env_overrides<F>(lookup: F) -> Vec<(&'static str, String)>
where
    F: Fn(&str) -> Option<String>,
{
    const DIRECT: [(&str, &str); 7] = [
        ("PORT", "server.port"),
        ("MANGATEK_BASE", "scraper.base_url"),
        ("DEFAULT_UA", "scraper.user_agent"),
        ("HTTP_PROXIES", "scraper.http_proxy"),
        ("PLAYWRIGHT_PROXY", "browser.proxy"),
        ("CACHE_TTL", "cache.ttl_secs"),
        ("RATE_LIMIT", "rate_limit.limit"),
    ];
    const FLAGS: [(&str, &str); 2] = [
        ("USE_PLAYWRIGHT", "browser.enabled"),
        ("PLAYWRIGHT_HEADLESS", "browser.headless"),
    ];

    let mut overrides = Vec::new();

    for (var, key) in DIRECT {
        if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
            overrides.push((key, value.trim().to_string()));
        }
    }

    for (var, key) in FLAGS {
        if let Some(value) = lookup(var) {
            let flag = if value.trim() == "1" { "true" } else { "false" };
            overrides.push((key, flag.to_string()));
        }
    }

    overrides
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with(|name| std::env::var(name).ok())
    }

    pub fn load_with<F>(lookup: F) -> Result<Self, config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        for (key, value) in operational_env_overrides(lookup) {
            builder = builder.set_override(key, value)?;
        }

        builder.build()?.try_deserialize()
    }
}
