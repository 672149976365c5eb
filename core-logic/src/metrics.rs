use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub words: WordMetrics,
    pub identities: IdentityMetrics,
    pub performance: PerformanceMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct WordMetrics {
    pub good: u64,
    pub bad: u64,
    pub duplicates: u64,
    pub skipped: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdentityMetrics {
    pub rate_limited: u64,
    pub minted: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceMetrics {
    pub uptime_ms: u64,
    pub attempts: u64,
    pub avg_attempt_ms: f64,
    pub min_attempt_ms: u64,
    pub max_attempt_ms: u64,
}

/// Run counters. Advisory only: nothing in the coordinator branches on them.
#[derive(Debug)]
pub struct RunMetrics {
    good: AtomicU64,
    bad: AtomicU64,
    duplicates: AtomicU64,
    skipped: AtomicU64,
    rate_limited: AtomicU64,
    minted: AtomicU64,
    attempts: AtomicU64,
    attempt_sum_ms: AtomicU64,
    attempt_min_ms: AtomicU64,
    attempt_max_ms: AtomicU64,
    start_time: Instant,
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self {
            good: AtomicU64::new(0),
            bad: AtomicU64::new(0),
            duplicates: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            rate_limited: AtomicU64::new(0),
            minted: AtomicU64::new(0),
            attempts: AtomicU64::new(0),
            attempt_sum_ms: AtomicU64::new(0),
            attempt_min_ms: AtomicU64::new(u64::MAX),
            attempt_max_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }
}

impl RunMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_good(&self) {
        self.good.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bad(&self) {
        self.bad.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_minted(&self) {
        self.minted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_attempt(&self, latency: Duration) {
        let latency_ms = latency.as_millis() as u64;
        self.attempts.fetch_add(1, Ordering::Relaxed);
        self.attempt_sum_ms.fetch_add(latency_ms, Ordering::Relaxed);
        self.attempt_min_ms.fetch_min(latency_ms, Ordering::Relaxed);
        self.attempt_max_ms.fetch_max(latency_ms, Ordering::Relaxed);
    }

    pub fn good(&self) -> u64 {
        self.good.load(Ordering::Relaxed)
    }

    pub fn bad(&self) -> u64 {
        self.bad.load(Ordering::Relaxed)
    }

    pub fn duplicates(&self) -> u64 {
        self.duplicates.load(Ordering::Relaxed)
    }

    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    pub fn rate_limited(&self) -> u64 {
        self.rate_limited.load(Ordering::Relaxed)
    }

    pub fn minted(&self) -> u64 {
        self.minted.load(Ordering::Relaxed)
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn status_line(&self) -> String {
        format!(
            "status: good {}, bad {} (dup {}, rate-limited {}, minted {})",
            self.good(),
            self.bad(),
            self.duplicates(),
            self.rate_limited(),
            self.minted()
        )
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let attempts = self.attempts();
        let sum = self.attempt_sum_ms.load(Ordering::Relaxed);
        let min = self.attempt_min_ms.load(Ordering::Relaxed);

        MetricsSnapshot {
            timestamp: Utc::now().to_rfc3339(),
            words: WordMetrics {
                good: self.good(),
                bad: self.bad(),
                duplicates: self.duplicates(),
                skipped: self.skipped(),
            },
            identities: IdentityMetrics {
                rate_limited: self.rate_limited(),
                minted: self.minted(),
            },
            performance: PerformanceMetrics {
                uptime_ms: self.start_time.elapsed().as_millis() as u64,
                attempts,
                avg_attempt_ms: if attempts > 0 {
                    sum as f64 / attempts as f64
                } else {
                    0.0
                },
                min_attempt_ms: if min == u64::MAX { 0 } else { min },
                max_attempt_ms: self.attempt_max_ms.load(Ordering::Relaxed),
            },
        }
    }

    pub async fn export_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write metrics to {}", path.display()))?;
        Ok(())
    }
}
