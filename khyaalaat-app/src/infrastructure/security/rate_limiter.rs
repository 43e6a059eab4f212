use dashmap::DashMap;
use khyaalaat_errors::AppError;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const MAX_REQUESTS_PER_MINUTE: u32 = 3;
const MAX_REQUESTS_PER_HOUR: u32 = 10;
const CLEANUP_INTERVAL_SECS: u64 = 300;

#[derive(Clone)]
struct RequestRecord {
    minute_count: u32,
    hour_count: u32,
    minute_start: Instant,
    hour_start: Instant,
}

impl RequestRecord {
    fn new(now: Instant) -> Self {
        Self {
            minute_count: 0,
            hour_count: 0,
            minute_start: now,
            hour_start: now,
        }
    }
}

/// Fixed-window limiter for poem request submissions, keyed by client address.
#[derive(Clone)]
pub struct RateLimiter {
    requests: Arc<DashMap<IpAddr, RequestRecord>>,
    last_cleanup: Arc<Mutex<Instant>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(DashMap::new()),
            last_cleanup: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn check_rate_limit(&self, ip: IpAddr) -> Result<(), RateLimitError> {
        self.check_at(ip, Instant::now())
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> Result<(), RateLimitError> {
        self.maybe_cleanup(now);

        let mut record = self
            .requests
            .entry(ip)
            .or_insert_with(|| RequestRecord::new(now));

        if now.duration_since(record.minute_start) >= Duration::from_secs(60) {
            record.minute_count = 0;
            record.minute_start = now;
        }

        if now.duration_since(record.hour_start) >= Duration::from_secs(3600) {
            record.hour_count = 0;
            record.hour_start = now;
        }

        if record.minute_count >= MAX_REQUESTS_PER_MINUTE {
            let wait_secs = 60 - now.duration_since(record.minute_start).as_secs();
            return Err(RateLimitError::TooManyRequestsPerMinute(wait_secs));
        }

        if record.hour_count >= MAX_REQUESTS_PER_HOUR {
            let wait_secs = 3600 - now.duration_since(record.hour_start).as_secs();
            return Err(RateLimitError::TooManyRequestsPerHour(wait_secs));
        }

        record.minute_count += 1;
        record.hour_count += 1;

        Ok(())
    }

    fn maybe_cleanup(&self, now: Instant) {
        let Ok(mut last_cleanup) = self.last_cleanup.lock() else {
            return;
        };
        if now.duration_since(*last_cleanup) > Duration::from_secs(CLEANUP_INTERVAL_SECS) {
            self.requests
                .retain(|_, v| now.duration_since(v.hour_start) < Duration::from_secs(3600));
            *last_cleanup = now;
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitError {
    TooManyRequestsPerMinute(u64),
    TooManyRequestsPerHour(u64),
}

impl RateLimitError {
    pub fn message(&self) -> String {
        match self {
            Self::TooManyRequestsPerMinute(secs) => {
                format!("Too many requests. Please wait {} seconds.", secs)
            }
            Self::TooManyRequestsPerHour(secs) => {
                format!(
                    "You have reached the hourly limit. Please wait {} minutes.",
                    secs.div_ceil(60)
                )
            }
        }
    }
}

impl From<RateLimitError> for AppError {
    fn from(e: RateLimitError) -> Self {
        AppError::RateLimited(e.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7));
    const OTHER: IpAddr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 8));

    #[test]
    fn fourth_request_in_a_minute_is_refused() {
        let limiter = RateLimiter::new();
        let start = Instant::now();
        for _ in 0..3 {
            assert!(limiter.check_at(CLIENT, start).is_ok());
        }
        assert!(matches!(
            limiter.check_at(CLIENT, start + Duration::from_secs(10)),
            Err(RateLimitError::TooManyRequestsPerMinute(50))
        ));
        assert!(limiter.check_at(OTHER, start).is_ok());
    }

    #[test]
    fn hourly_limit_applies_across_minutes() {
        let limiter = RateLimiter::new();
        let start = Instant::now();
        for i in 0..10u64 {
            let at = start + Duration::from_secs(61 * (i / 3) + i % 3);
            assert!(limiter.check_at(CLIENT, at).is_ok(), "request {i}");
        }
        let later = start + Duration::from_secs(61 * 5);
        assert!(matches!(
            limiter.check_at(CLIENT, later),
            Err(RateLimitError::TooManyRequestsPerHour(_))
        ));
    }

    #[test]
    fn refusal_becomes_rate_limited_error() {
        let error: AppError = RateLimitError::TooManyRequestsPerMinute(30).into();
        assert_eq!(
            error,
            AppError::RateLimited("Too many requests. Please wait 30 seconds.".into())
        );
    }
}
