//! Rate limit domain - request budgets per client

mod rule;

pub use rule::RateLimitRule;
