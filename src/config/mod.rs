//! Application configuration

mod app_config;

pub use app_config::{
    operational_env_overrides, AppConfig, BrowserConfig, CacheConfig, LogFormat, LoggingConfig,
    RateLimitSettings, ScraperConfig, ServerConfig,
};
