//! Token bucket rate limiter, one bucket per trade endpoint.
//!
//! [`RateLimiterPool::acquire`] sleeps until the endpoint's bucket has a
//! token, keeping the client under its own budget. Only a bucket that can
//! never refill fails with [`TradeError::RateLimited`].

use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio::time::{sleep, Duration, Instant};
use tracing::debug;

use super::TradeError;

/// Rate limit status for an endpoint.
#[derive(Debug, Clone)]
pub struct RateLimitStatus {
    pub requests_per_minute: u32,
    pub tokens_available: f32,
    pub next_available_in_ms: Option<u64>,
}

/// Token bucket for a single endpoint.
///
/// Tokens are added at a constant rate and consumed per request. The bucket
/// starts full.
pub struct TokenBucket {
    capacity: f32,
    tokens: f32,
    /// Tokens added per second.
    refill_rate: f32,
    last_refill: Instant,
}

impl TokenBucket {
    pub fn new(requests_per_minute: u32) -> Self {
        let capacity = requests_per_minute as f32;
        Self {
            capacity,
            tokens: capacity,
            refill_rate: capacity / 60.0,
            last_refill: Instant::now(),
        }
    }

    /// Take a token, or return how long until one is available.
    pub fn try_acquire(&mut self) -> Result<(), Duration> {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else if self.refill_rate <= 0.0 {
            Err(Duration::from_secs(60))
        } else {
            let tokens_needed = 1.0 - self.tokens;
            Err(Duration::from_secs_f32(tokens_needed / self.refill_rate))
        }
    }

    /// A zero-rpm bucket never grants a token.
    pub fn never_refills(&self) -> bool {
        self.refill_rate <= 0.0
    }

    pub fn status(&mut self) -> RateLimitStatus {
        self.refill();
        RateLimitStatus {
            requests_per_minute: self.capacity as u32,
            tokens_available: self.tokens,
            next_available_in_ms: if self.tokens >= 1.0 || self.refill_rate <= 0.0 {
                None
            } else {
                let tokens_needed = 1.0 - self.tokens;
                Some((tokens_needed / self.refill_rate * 1000.0) as u64)
            },
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f32();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }
}

/// Buckets keyed by endpoint name.
pub struct RateLimiterPool {
    limiters: RwLock<HashMap<String, TokenBucket>>,
}

impl RateLimiterPool {
    pub fn new(endpoints: &[(&str, u32)]) -> Self {
        let limiters = endpoints
            .iter()
            .map(|(name, rpm)| (name.to_string(), TokenBucket::new(*rpm)))
            .collect();
        Self {
            limiters: RwLock::new(limiters),
        }
    }

    /// Take a token for `endpoint`, sleeping until one is available.
    /// Endpoints without a bucket are unlimited.
    pub async fn acquire(&self, endpoint: &str) -> Result<(), TradeError> {
        loop {
            let wait = {
                let mut limiters = self.limiters.write().await;
                let Some(bucket) = limiters.get_mut(endpoint) else {
                    return Ok(());
                };
                if bucket.never_refills() {
                    return Err(TradeError::RateLimited {
                        endpoint: endpoint.to_string(),
                        retry_after_ms: 60_000,
                    });
                }
                match bucket.try_acquire() {
                    Ok(()) => return Ok(()),
                    Err(wait) => wait,
                }
            };
            debug!(endpoint, wait_ms = wait.as_millis() as u64, "Waiting for rate limit token");
            sleep(wait).await;
        }
    }

    /// Take a token for `endpoint` without waiting. Endpoints without a
    /// bucket are unlimited.
    pub async fn try_acquire(&self, endpoint: &str) -> Result<(), TradeError> {
        let mut limiters = self.limiters.write().await;
        match limiters.get_mut(endpoint) {
            Some(bucket) => bucket
                .try_acquire()
                .map_err(|wait| TradeError::RateLimited {
                    endpoint: endpoint.to_string(),
                    retry_after_ms: wait.as_millis() as u64,
                }),
            None => Ok(()),
        }
    }

    pub async fn get_status(&self, endpoint: &str) -> Option<RateLimitStatus> {
        let mut limiters = self.limiters.write().await;
        limiters.get_mut(endpoint).map(|bucket| bucket.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_bucket_acquire_until_empty() {
        let mut bucket = TokenBucket::new(6);
        for _ in 0..6 {
            assert!(bucket.try_acquire().is_ok());
        }
        let wait = bucket.try_acquire().unwrap_err();
        // 6 rpm refills one token every 10 seconds
        assert!(wait.as_secs() <= 10);
        assert!(wait.as_millis() > 0);
    }

    #[test]
    fn test_zero_rpm_never_grants() {
        let mut bucket = TokenBucket::new(0);
        assert_eq!(bucket.try_acquire().unwrap_err(), Duration::from_secs(60));
        assert!(bucket.status().next_available_in_ms.is_none());
    }

    #[test]
    fn test_token_bucket_status() {
        let mut bucket = TokenBucket::new(10);
        let status = bucket.status();
        assert_eq!(status.requests_per_minute, 10);
        assert!(status.next_available_in_ms.is_none());

        for _ in 0..10 {
            bucket.try_acquire().unwrap();
        }
        assert!(bucket.status().next_available_in_ms.is_some());
    }

    #[tokio::test]
    async fn test_token_bucket_refill() {
        let mut bucket = TokenBucket::new(60);
        for _ in 0..60 {
            bucket.try_acquire().unwrap();
        }
        sleep(Duration::from_millis(100)).await;
        bucket.refill();
        assert!(bucket.tokens > 0.05);
        assert!(bucket.tokens < 0.2);
    }

    #[tokio::test]
    async fn test_pool_fails_fast_per_endpoint() {
        let pool = RateLimiterPool::new(&[("search", 1), ("fetch", 2)]);

        assert!(pool.try_acquire("search").await.is_ok());
        match pool.try_acquire("search").await.unwrap_err() {
            TradeError::RateLimited { endpoint, .. } => assert_eq!(endpoint, "search"),
            other => panic!("Expected RateLimited, got {other:?}"),
        }

        // Other buckets are independent
        assert!(pool.try_acquire("fetch").await.is_ok());
        // Unknown endpoints are not limited
        assert!(pool.try_acquire("other").await.is_ok());

        let status = pool.get_status("fetch").await.unwrap();
        assert_eq!(status.requests_per_minute, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_waits_for_refill() {
        let pool = RateLimiterPool::new(&[("search", 6)]);
        for _ in 0..6 {
            pool.acquire("search").await.unwrap();
        }

        // 6 rpm refills one token every 10 seconds
        let start = Instant::now();
        pool.acquire("search").await.unwrap();
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(9), "waited {waited:?}");
        assert!(waited <= Duration::from_secs(11), "waited {waited:?}");
    }

    #[tokio::test]
    async fn test_acquire_zero_rpm_fails() {
        let pool = RateLimiterPool::new(&[("search", 0)]);
        let err = pool.acquire("search").await.unwrap_err();
        assert_eq!(
            err,
            TradeError::RateLimited {
                endpoint: "search".to_string(),
                retry_after_ms: 60_000
            }
        );
        assert!(pool.acquire("fetch").await.is_ok());
    }
}
