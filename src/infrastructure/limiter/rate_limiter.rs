use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::time::sleep;

use crate::errors::AppError;

/// A token bucket which allows fractional tokens for precise refill
#[derive(Debug)]
struct TokenBucket {
    capacity: f64,
    tokens: f64,
    refill_per_sec: f64,
    last_refill: Instant,
    last_seen: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, refill_per_sec: f64) -> Self {
        let now = Instant::now();
        Self {
            capacity,
            tokens: capacity,
            refill_per_sec,
            last_refill: now,
            last_seen: now,
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        if elapsed > 0.0 {
            self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
            self.last_refill = now;
        }
    }

    /// Takes one token, or returns the whole seconds until one is available.
    fn try_take(&mut self) -> Result<(), u64> {
        let now = Instant::now();
        self.last_seen = now;
        self.refill(now);

        // Small epsilon to avoid fp surprises
        if self.tokens + 1e-9 >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            let missing = 1.0 - self.tokens;
            Err(((missing / self.refill_per_sec).ceil() as u64).max(1))
        }
    }
}

/// Per-key token buckets, e.g. one per principal for a costly upstream call.
#[derive(Clone)]
pub struct RateLimiterStore {
    buckets: Arc<DashMap<String, Arc<Mutex<TokenBucket>>>>,
    capacity: f64,
    refill_per_sec: f64,
}

impl RateLimiterStore {
    pub fn new(capacity: u32, refill_per_sec: f64) -> Self {
        Self {
            buckets: Arc::new(DashMap::new()),
            capacity: capacity.max(1) as f64,
            refill_per_sec: refill_per_sec.max(f64::EPSILON),
        }
    }

    /// `requests` allowed in a burst, refilled evenly over a minute.
    pub fn per_minute(requests: u32) -> Self {
        Self::new(requests, requests.max(1) as f64 / 60.0)
    }

    fn bucket(&self, key: &str) -> Arc<Mutex<TokenBucket>> {
        if let Some(existing) = self.buckets.get(key) {
            return existing.clone();
        }
        self.buckets
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(TokenBucket::new(self.capacity, self.refill_per_sec))))
            .clone()
    }

    pub fn check(&self, key: &str) -> Result<(), AppError> {
        let bucket = self.bucket(key);
        let mut bucket = bucket.lock();
        bucket
            .try_take()
            .map_err(|retry_after_secs| AppError::TooManyRequests { retry_after_secs })
    }

    /// Drops buckets not touched within `ttl`. Returns how many were removed.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| now.duration_since(bucket.lock().last_seen) <= ttl);
        before - self.buckets.len()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn spawn_eviction(&self, every: Duration, ttl: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            loop {
                sleep(every).await;
                let evicted = store.evict_idle(ttl);
                if evicted > 0 {
                    tracing::debug!("Evicted {} idle rate limiter buckets", evicted);
                }
            }
        })
    }
}
