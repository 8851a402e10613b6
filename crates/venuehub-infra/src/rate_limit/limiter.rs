use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use venuehub_core::{RateLimitRule, RateLimitSettings};

const DEFAULT_SHARD_COUNT: usize = 16;

/// Endpoint family a request is counted against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitType {
    Api,
    Auth,
    Booking,
    Review,
}

impl LimitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitType::Api => "api",
            LimitType::Auth => "auth",
            LimitType::Booking => "booking",
            LimitType::Review => "review",
        }
    }
}

impl std::fmt::Display for LimitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Outcome of counting one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { limit: u32, remaining: u32 },
    Rejected { limit: u32, retry_after_secs: u64 },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

/// Sharded fixed-window limiter.
///
/// A window opens on the first request for a key and lasts `window_secs`.
/// Within it the first `max_requests` requests pass and the rest are
/// rejected until the window closes.
#[derive(Clone)]
pub struct RateLimiter {
    shards: Arc<Vec<Mutex<HashMap<String, Window>>>>,
    settings: RateLimitSettings,
}

impl RateLimiter {
    pub fn new(settings: RateLimitSettings) -> Self {
        Self::with_shards(settings, DEFAULT_SHARD_COUNT)
    }

    pub fn with_shards(settings: RateLimitSettings, shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Mutex::new(HashMap::new()))
            .collect();
        Self {
            shards: Arc::new(shards),
            settings,
        }
    }

    pub fn rule(&self, limit_type: LimitType) -> RateLimitRule {
        match limit_type {
            LimitType::Api => self.settings.api,
            LimitType::Auth => self.settings.auth,
            LimitType::Booking => self.settings.booking,
            LimitType::Review => self.settings.review,
        }
    }

    fn shard_for(&self, key: &str) -> &Mutex<HashMap<String, Window>> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let index = (hasher.finish() as usize) % self.shards.len();
        &self.shards[index]
    }

    /// Count one request from `client` against `limit_type`.
    pub async fn check(&self, limit_type: LimitType, client: &str) -> RateLimitDecision {
        let rule = self.rule(limit_type);
        let key = format!("{}:{}", limit_type, client);
        let now = Instant::now();

        let mut windows = self.shard_for(&key).lock().await;
        let window = windows.entry(key).or_insert_with(|| Window {
            count: 0,
            reset_at: now + Duration::from_secs(rule.window_secs),
        });

        if now >= window.reset_at {
            window.count = 0;
            window.reset_at = now + Duration::from_secs(rule.window_secs);
        }

        if window.count < rule.max_requests {
            window.count += 1;
            RateLimitDecision::Allowed {
                limit: rule.max_requests,
                remaining: rule.max_requests - window.count,
            }
        } else {
            let remaining = window.reset_at.saturating_duration_since(now);
            let retry_after_secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
            tracing::debug!(
                limit_type = %limit_type,
                client = %client,
                retry_after_secs,
                "Rate limit exceeded"
            );
            RateLimitDecision::Rejected {
                limit: rule.max_requests,
                retry_after_secs: retry_after_secs.max(1),
            }
        }
    }

    /// Drop windows that have closed. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        for shard in self.shards.iter() {
            let mut windows = shard.lock().await;
            let before = windows.len();
            windows.retain(|_, window| window.reset_at > now);
            removed += before - windows.len();
        }
        if removed > 0 {
            tracing::debug!(windows_removed = removed, "Purged expired rate limit windows");
        }
        removed
    }

    /// Number of live windows across all shards
    pub async fn tracked_keys(&self) -> usize {
        let mut total = 0;
        for shard in self.shards.iter() {
            total += shard.lock().await.len();
        }
        total
    }

    /// Purge closed windows every `every` until the task is aborted.
    pub fn spawn_purge_task(&self, every: Duration) -> JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;
            loop {
                interval.tick().await;
                limiter.purge_expired().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: u32, window: u64) -> RateLimiter {
        let rule = RateLimitRule::new(max, window);
        RateLimiter::with_shards(
            RateLimitSettings {
                api: rule,
                auth: rule,
                booking: RateLimitRule::new(1, 60),
                review: rule,
            },
            4,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_request_past_limit() {
        let limiter = limiter(3, 60);
        for expected_remaining in [2, 1, 0] {
            assert_eq!(
                limiter.check(LimitType::Api, "10.0.0.1").await,
                RateLimitDecision::Allowed {
                    limit: 3,
                    remaining: expected_remaining
                }
            );
        }
        assert_eq!(
            limiter.check(LimitType::Api, "10.0.0.1").await,
            RateLimitDecision::Rejected {
                limit: 3,
                retry_after_secs: 60
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_tracks_remaining_window() {
        let limiter = limiter(1, 60);
        assert!(limiter.check(LimitType::Auth, "ip").await.is_allowed());

        tokio::time::advance(Duration::from_secs(45)).await;
        assert_eq!(
            limiter.check(LimitType::Auth, "ip").await,
            RateLimitDecision::Rejected {
                limit: 1,
                retry_after_secs: 15
            }
        );

        tokio::time::advance(Duration::from_millis(14_500)).await;
        assert_eq!(
            limiter.check(LimitType::Auth, "ip").await,
            RateLimitDecision::Rejected {
                limit: 1,
                retry_after_secs: 1
            }
        );

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(limiter.check(LimitType::Auth, "ip").await.is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn keys_are_independent_per_type_and_client() {
        let limiter = limiter(1, 60);
        assert!(limiter.check(LimitType::Api, "a").await.is_allowed());
        assert!(limiter.check(LimitType::Api, "b").await.is_allowed());
        assert!(limiter.check(LimitType::Review, "a").await.is_allowed());
        assert!(!limiter.check(LimitType::Api, "a").await.is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn each_type_uses_its_rule() {
        let limiter = limiter(5, 60);
        assert!(limiter.check(LimitType::Booking, "a").await.is_allowed());
        assert!(!limiter.check(LimitType::Booking, "a").await.is_allowed());
        assert!(limiter.check(LimitType::Api, "a").await.is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn purge_removes_closed_windows() {
        let limiter = limiter(2, 30);
        limiter.check(LimitType::Api, "a").await;
        limiter.check(LimitType::Auth, "b").await;
        assert_eq!(limiter.tracked_keys().await, 2);

        tokio::time::advance(Duration::from_secs(31)).await;
        limiter.check(LimitType::Api, "c").await;
        assert_eq!(limiter.purge_expired().await, 2);
        assert_eq!(limiter.tracked_keys().await, 1);
    }
}
