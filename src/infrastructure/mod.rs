//! Infrastructure layer - Fetchers, parsing, caching and observability

pub mod browser;
pub mod fetch;
pub mod observability;
pub mod parser;
pub mod rate_limit;
pub mod response_cache;
pub mod services;
