use spelling_bee::{BeeConfig, BeeSessionFactory};

use anyhow::{Context, Result};
use clap::Parser;
use core_logic::{
    setup_logger, spawn_shutdown_listener, spawn_status_reporter, CandidateSource, Coordinator,
    IdentityPool, IdentityRoster, MatchList, MatchLog, ProxyManager, RunMetrics, Session,
    WorkerRunner,
};
use dotenv::dotenv;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "games/spelling-bee/config.toml")]
    config: String,
    /// Resubmit the words listed in this file instead of enumerating the word space.
    #[arg(short, long)]
    replay: Option<String>,
    #[arg(short, long)]
    export_metrics: Option<String>,
    #[arg(long, default_value = "30")]
    metrics_interval: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Keep guard alive for file logging
    let _log_guard = setup_logger();
    dotenv().ok();

    let args = Args::parse();
    info!("Loading config from: {}", args.config);

    let config = match BeeConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {}", e);
            return Ok(());
        }
    };
    info!(
        "Configuration loaded for {} (team {})",
        config.base_url, config.team_name
    );

    let roster = IdentityRoster::new(&config.roster_path);
    let profiles = roster
        .load()
        .with_context(|| format!("Failed to read roster {}", roster.path().display()))?;
    info!("Found {} identities in {}.", profiles.len(), config.roster_path);

    let proxies = match &config.proxies_file {
        Some(path) => ProxyManager::load_proxies(path)?,
        None => Vec::new(),
    };
    if !proxies.is_empty() {
        info!("Loaded {} proxies for rotation.", proxies.len());
    }

    let factory = BeeSessionFactory::new(&config, proxies)?;
    let pool = Arc::new(IdentityPool::new(factory, profiles, config.mint_naming())?);

    // A broken first identity means the site or our credentials are unusable.
    if let Some(first) = pool.get(0) {
        if let Err(e) = first.ensure_ready().await {
            error!("Failed to initialize '{}': {}", first.profile().name, e);
            return Err(e.into());
        }
    }

    let match_log = Arc::new(MatchLog::open(&config.matches_path)?);
    info!(
        "{} words already confirmed in {}.",
        match_log.known_count(),
        config.matches_path
    );

    let source: Arc<dyn CandidateSource> = match &args.replay {
        Some(path) => {
            let list = MatchList::load(path, config.min_replay_length)?;
            info!("Replaying {} words from {}", list.len(), path);
            Arc::new(list)
        }
        None => {
            let space = config.word_space()?;
            info!(
                "Enumerating {} words of length {} over digits 1-{}",
                space.len(),
                config.word_length,
                config.alphabet_size
            );
            Arc::new(space)
        }
    };

    let metrics = Arc::new(RunMetrics::new());
    let run_config = config.to_run_config();
    let coordinator = Arc::new(Coordinator::new(
        Arc::clone(&pool),
        Arc::clone(&match_log),
        Arc::clone(&metrics),
        &run_config,
    ));

    let token = CancellationToken::new();
    spawn_shutdown_listener(token.clone());

    let status_token = token.child_token();
    let status_task = spawn_status_reporter(
        Arc::clone(&metrics),
        run_config.status_interval(),
        status_token.clone(),
    );

    let metrics_task = if let Some(ref metrics_path) = args.export_metrics {
        let path = metrics_path.clone();
        let interval_secs = args.metrics_interval.max(1);
        let metrics = Arc::clone(&metrics);
        Some(tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(interval_secs));
            loop {
                interval.tick().await;
                if let Err(e) = metrics.export_to_file(&path).await {
                    error!("Metrics export failed: {}", e);
                } else {
                    info!("Metrics exported to {}", path);
                }
            }
        }))
    } else {
        None
    };

    let summary = WorkerRunner::run(coordinator, source, run_config.workers, token).await;

    status_token.cancel();
    if let Err(e) = status_task.await {
        warn!("Status reporter ended abnormally: {}", e);
    }
    if let Some(task) = metrics_task {
        task.abort();
    }

    // Both writes are attempted even if one fails.
    let roster_result = roster.save(&pool.profiles());
    let log_result = match_log.flush();

    if let Some(ref path) = args.export_metrics {
        if let Err(e) = metrics.export_to_file(path).await {
            error!("Final metrics export failed: {}", e);
        }
    }

    info!(
        "Saved {} identities to {}; {} new words this run.",
        pool.len(),
        config.roster_path,
        match_log.matches().len()
    );
    if summary.failed_workers > 0 {
        warn!("{} workers stopped on errors.", summary.failed_workers);
    }

    roster_result.context("Failed to save roster")?;
    log_result.context("Failed to flush match log")?;
    Ok(())
}
