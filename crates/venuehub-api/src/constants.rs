//! API constants

/// Prefix of every JSON endpoint
pub const API_PREFIX: &str = "/api";

/// Request bodies are small JSON documents; 1 MiB is generous.
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Default for `HTTP_CONCURRENCY_LIMIT`
pub const DEFAULT_HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// How often expired rate-limit windows are dropped
pub const RATE_LIMIT_PURGE_INTERVAL_SECS: u64 = 300;
