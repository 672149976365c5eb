use crate::coordinator::Coordinator;
use crate::error::CoreError;
use crate::metrics::{MetricsSnapshot, RunMetrics};
use crate::traits::{CandidateSource, SessionFactory};
use crate::utils::logger::{STATUS_TARGET, WORD_RESULT_TARGET};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::signal;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Instrument};

#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Candidates pulled from the cursor and handed to the coordinator.
    pub dispatched: usize,
    pub failed_workers: usize,
    pub elapsed: Duration,
    pub metrics: MetricsSnapshot,
}

pub struct WorkerRunner;

impl WorkerRunner {
    /// Fans `workers` tasks out over one shared cursor into `source` and waits for them.
    ///
    /// Workers check `token` before pulling each candidate, so an in-flight
    /// attempt always finishes and no candidate is left half-resolved.
    pub async fn run<F>(
        coordinator: Arc<Coordinator<F>>,
        source: Arc<dyn CandidateSource>,
        workers: usize,
        token: CancellationToken,
    ) -> RunSummary
    where
        F: SessionFactory + 'static,
    {
        let mut set = JoinSet::new();
        let cursor = Arc::new(AtomicUsize::new(0));
        let workers = workers.max(1);

        let start_time = Instant::now();
        info!(
            "Starting {} workers over {} candidates...",
            workers,
            source.len()
        );

        for i in 0..workers {
            let id = i + 1;
            let span = tracing::info_span!("worker", worker_id = format!("{:03}", id));
            let coordinator = Arc::clone(&coordinator);
            let source = Arc::clone(&source);
            let cursor = Arc::clone(&cursor);
            let child_token = token.clone();

            set.spawn(
                async move {
                    let mut dispatched = 0usize;
                    loop {
                        if child_token.is_cancelled() {
                            info!("Worker stopping (cancelled).");
                            break;
                        }

                        let index = cursor.fetch_add(1, Ordering::SeqCst);
                        let Some(word) = source.word(index) else {
                            break;
                        };
                        dispatched += 1;

                        if let Err(e) = coordinator.try_word(&word).await {
                            error!(
                                target: WORD_RESULT_TARGET,
                                "Worker {} FAILED on {}: {}", id, word, e
                            );
                            return (dispatched, Some(e));
                        }
                    }
                    (dispatched, None::<CoreError>)
                }
                .instrument(span),
            );
        }

        let mut dispatched = 0;
        let mut failed_workers = 0;

        while let Some(res) = set.join_next().await {
            match res {
                Ok((count, failure)) => {
                    dispatched += count;
                    if failure.is_some() {
                        // Already logged in the worker
                        failed_workers += 1;
                    }
                }
                Err(e) => {
                    error!("A worker task panicked or failed to join: {:?}", e);
                    failed_workers += 1;
                }
            }
        }

        let metrics = coordinator.metrics().snapshot();
        let elapsed = start_time.elapsed();

        info!(
            target: STATUS_TARGET,
            "Run complete in {:.1}s | dispatched {} | good {} | bad {} | dup {} | failed workers {}",
            elapsed.as_secs_f64(),
            dispatched,
            metrics.words.good,
            metrics.words.bad,
            metrics.words.duplicates,
            failed_workers
        );

        RunSummary {
            dispatched,
            failed_workers,
            elapsed,
            metrics,
        }
    }
}

/// Cancels `token` on Ctrl+C.
pub fn spawn_shutdown_listener(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!(target: STATUS_TARGET, "Got interrupted. Stopping after in-flight words...");
                token.cancel();
            }
            Err(err) => {
                error!("Unable to listen for shutdown signal: {}", err);
            }
        }
    })
}

/// Logs the status line every `every` until `token` is cancelled.
pub fn spawn_status_reporter(
    metrics: Arc<RunMetrics>,
    every: Duration,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.tick().await;
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => {
                    info!(target: STATUS_TARGET, "{}", metrics.status_line());
                }
            }
        }
    })
}
