//! Fixed-window request counters keyed by (source, bucket).
//!
//! Counters are in-memory and per-process: each instance enforces its own
//! quota and everything resets on restart. Multi-instance deployments would
//! need a shared counter store, which is deliberately out of scope here.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::error::AppError;

/// Traffic class with its own window and cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// General API traffic.
    General,
    /// Registration and login attempts.
    Auth,
    /// Card creation.
    Creation,
}

#[derive(Debug, Clone, Copy)]
pub struct BucketConfig {
    pub window: Duration,
    pub max_requests: u32,
}

/// Per-bucket limits. Defaults match production settings:
/// general 100 req/15 min, auth 5 req/15 min, creation 10 req/hour.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub general: BucketConfig,
    pub auth: BucketConfig,
    pub creation: BucketConfig,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            general: BucketConfig {
                window: Duration::from_secs(15 * 60),
                max_requests: 100,
            },
            auth: BucketConfig {
                window: Duration::from_secs(15 * 60),
                max_requests: 5,
            },
            creation: BucketConfig {
                window: Duration::from_secs(60 * 60),
                max_requests: 10,
            },
        }
    }
}

impl RateLimitConfig {
    /// Read per-bucket overrides from the environment
    /// (`RATE_LIMIT_{GENERAL,AUTH,CREATION}_{MAX,WINDOW_SECS}`).
    pub fn from_env() -> Result<Self, AppError> {
        let mut config = Self::default();
        override_bucket(&mut config.general, "GENERAL")?;
        override_bucket(&mut config.auth, "AUTH")?;
        override_bucket(&mut config.creation, "CREATION")?;
        Ok(config)
    }

    pub fn bucket(&self, bucket: Bucket) -> BucketConfig {
        match bucket {
            Bucket::General => self.general,
            Bucket::Auth => self.auth,
            Bucket::Creation => self.creation,
        }
    }
}

fn override_bucket(target: &mut BucketConfig, name: &str) -> Result<(), AppError> {
    if let Ok(raw) = std::env::var(format!("RATE_LIMIT_{name}_MAX")) {
        target.max_requests = raw.parse().map_err(|_| {
            AppError::config(format!("RATE_LIMIT_{name}_MAX must be an integer"))
        })?;
    }
    if let Ok(raw) = std::env::var(format!("RATE_LIMIT_{name}_WINDOW_SECS")) {
        let secs: u64 = raw.parse().map_err(|_| {
            AppError::config(format!("RATE_LIMIT_{name}_WINDOW_SECS must be an integer"))
        })?;
        target.window = Duration::from_secs(secs);
    }
    Ok(())
}

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Concurrent fixed-window limiter. A window is created lazily on the first
/// request from a key, resets once its duration has elapsed, and the update
/// happens under the map's shard lock so concurrent increments never lose
/// counts.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: DashMap<(String, Bucket), Window>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
        }
    }

    /// Admit or reject one request from `key` against `bucket`.
    ///
    /// `RateLimited` is always recoverable: once the window elapses the
    /// counter resets and the key is admitted again.
    pub fn admit(&self, key: &str, bucket: Bucket) -> Result<(), AppError> {
        self.admit_at(key, bucket, Instant::now())
    }

    /// Same as [`admit`](Self::admit) with an explicit clock, so window
    /// arithmetic is testable without sleeping.
    pub fn admit_at(&self, key: &str, bucket: Bucket, now: Instant) -> Result<(), AppError> {
        let cfg = self.config.bucket(bucket);
        let mut entry = self
            .windows
            .entry((key.to_string(), bucket))
            .or_insert_with(|| Window {
                started: now,
                count: 0,
            });

        if now.duration_since(entry.started) >= cfg.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= cfg.max_requests {
            return Err(AppError::rate_limited());
        }

        entry.count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::{Bucket, BucketConfig, RateLimitConfig, RateLimiter};
    use crate::error::AppError;

    fn limiter(max: u32, window_secs: u64) -> RateLimiter {
        let bucket = BucketConfig {
            window: Duration::from_secs(window_secs),
            max_requests: max,
        };
        RateLimiter::new(RateLimitConfig {
            general: bucket,
            auth: bucket,
            creation: bucket,
        })
    }

    #[test]
    fn admits_exactly_max_then_rejects() {
        let limiter = limiter(3, 60);
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.admit_at("1.2.3.4", Bucket::Auth, now).is_ok());
        }
        assert!(matches!(
            limiter.admit_at("1.2.3.4", Bucket::Auth, now),
            Err(AppError::RateLimited)
        ));
    }

    #[test]
    fn window_resets_after_duration() {
        let limiter = limiter(2, 60);
        let t0 = Instant::now();

        assert!(limiter.admit_at("k", Bucket::General, t0).is_ok());
        assert!(limiter.admit_at("k", Bucket::General, t0).is_ok());
        assert!(limiter.admit_at("k", Bucket::General, t0).is_err());

        // Just before the window elapses: still rejected.
        let almost = t0 + Duration::from_secs(59);
        assert!(limiter.admit_at("k", Bucket::General, almost).is_err());

        // At the window boundary the counter resets.
        let later = t0 + Duration::from_secs(60);
        assert!(limiter.admit_at("k", Bucket::General, later).is_ok());
        assert!(limiter.admit_at("k", Bucket::General, later).is_ok());
        assert!(limiter.admit_at("k", Bucket::General, later).is_err());
    }

    #[test]
    fn keys_are_independent() {
        let limiter = limiter(1, 60);
        let now = Instant::now();

        assert!(limiter.admit_at("a", Bucket::Auth, now).is_ok());
        assert!(limiter.admit_at("a", Bucket::Auth, now).is_err());
        assert!(limiter.admit_at("b", Bucket::Auth, now).is_ok());
    }

    #[test]
    fn buckets_are_independent_for_one_key() {
        let limiter = limiter(1, 60);
        let now = Instant::now();

        assert!(limiter.admit_at("a", Bucket::Auth, now).is_ok());
        assert!(limiter.admit_at("a", Bucket::Auth, now).is_err());
        // Same source, different bucket: separate window.
        assert!(limiter.admit_at("a", Bucket::Creation, now).is_ok());
        assert!(limiter.admit_at("a", Bucket::General, now).is_ok());
    }

    #[test]
    fn concurrent_admits_never_exceed_cap() {
        use std::sync::Arc;

        let limiter = Arc::new(limiter(50, 60));
        let now = Instant::now();
        let mut handles = Vec::new();

        for _ in 0..8 {
            let limiter = Arc::clone(&limiter);
            handles.push(std::thread::spawn(move || {
                let mut admitted = 0u32;
                for _ in 0..25 {
                    if limiter.admit_at("shared", Bucket::General, now).is_ok() {
                        admitted += 1;
                    }
                }
                admitted
            }));
        }

        let total: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 50);
    }
}
