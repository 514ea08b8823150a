//! Client request throttling

mod limiter;

pub use limiter::{RateLimitResult, RateLimiter};
