//! # Submission Coordinator
//!
//! Routes each word through the identity pool until it reaches a terminal
//! outcome. Rate limiting is absorbed here by rotating to the next identity;
//! after `rate_limit_threshold` consecutive rate-limited responses a fresh
//! identity is minted and gets exactly one more try. Transport errors and mint
//! failures are returned to the worker.

use crate::config::RunConfig;
use crate::error::{CoreError, MintError, NetworkError};
use crate::metrics::RunMetrics;
use crate::pool::IdentityPool;
use crate::traits::{Outcome, Session, SessionFactory};
use crate::utils::MatchLog;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Terminal result for one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Duplicate,
    Invalid,
    /// Already in the match log and skipped without a request.
    Skipped,
}

pub struct Coordinator<F: SessionFactory> {
    pool: Arc<IdentityPool<F>>,
    match_log: Arc<MatchLog>,
    metrics: Arc<RunMetrics>,
    rate_limit_threshold: u32,
    skip_known: bool,
}

impl<F: SessionFactory> Coordinator<F> {
    pub fn new(
        pool: Arc<IdentityPool<F>>,
        match_log: Arc<MatchLog>,
        metrics: Arc<RunMetrics>,
        config: &RunConfig,
    ) -> Self {
        Self {
            pool,
            match_log,
            metrics,
            rate_limit_threshold: config.rate_limit_threshold.max(1),
            skip_known: config.skip_known_matches,
        }
    }

    pub fn pool(&self) -> &Arc<IdentityPool<F>> {
        &self.pool
    }

    pub fn match_log(&self) -> &Arc<MatchLog> {
        &self.match_log
    }

    pub fn metrics(&self) -> &Arc<RunMetrics> {
        &self.metrics
    }

    pub async fn try_word(&self, word: &str) -> Result<Verdict, CoreError> {
        if self.skip_known && self.match_log.contains(word) {
            self.metrics.record_skipped();
            debug!("{}: already confirmed, skipping", word);
            return Ok(Verdict::Skipped);
        }

        let mut session = self.pool.next();
        let mut rate_limited: u32 = 0;
        let mut minted = false;

        loop {
            let started = Instant::now();
            let outcome = session.attempt(word).await?;
            self.metrics.record_attempt(started.elapsed());

            match outcome {
                Outcome::Accepted { .. } => {
                    self.metrics.record_good();
                    self.match_log.record(word)?;
                    return Ok(Verdict::Accepted);
                }
                Outcome::Duplicate => {
                    self.metrics.record_duplicate();
                    debug!("{}: already found by {}", word, session.profile().name);
                    return Ok(Verdict::Duplicate);
                }
                Outcome::Invalid => {
                    self.metrics.record_bad();
                    return Ok(Verdict::Invalid);
                }
                Outcome::RateLimited => {
                    self.metrics.record_rate_limited();
                    rate_limited += 1;

                    if minted {
                        return Err(MintError::StillRateLimited {
                            word: word.to_string(),
                            attempts: rate_limited,
                        }
                        .into());
                    }

                    if rate_limited < self.rate_limit_threshold {
                        debug!(
                            "{}: rate limited on '{}', rotating",
                            word,
                            session.profile().name
                        );
                        session = self.pool.next();
                        continue;
                    }

                    warn!(
                        "{}: {} rate-limited attempts, minting a new identity",
                        word, rate_limited
                    );
                    session = self.pool.mint().await?;
                    self.metrics.record_minted();
                    minted = true;
                }
                Outcome::TransportError(reason) => {
                    return Err(NetworkError::Transport {
                        word: word.to_string(),
                        reason,
                    }
                    .into());
                }
            }
        }
    }
}
