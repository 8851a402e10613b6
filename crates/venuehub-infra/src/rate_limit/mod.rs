//! HTTP rate limiting
//!
//! Fixed-window counters keyed by `limitType:ip`, held in process memory.

pub use limiter::{LimitType, RateLimitDecision, RateLimiter};

mod limiter;
