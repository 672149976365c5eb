//! # Core Logic - Shared Engine for Word Submission Bots
//!
//! This crate provides the game-agnostic parts of a guessing bot: the
//! candidate enumerator, the rotating identity pool, the submission
//! coordinator and the worker fan-out, plus persistence and logging helpers.
//!
//! ## Modules
//!
//! - [`config`] - Run settings, identity profiles and proxy entries
//! - [`coordinator`] - Per-word retry / rotation / mint state machine
//! - [`error`] - Typed error handling with thiserror
//! - [`metrics`] - Atomic run counters and JSON snapshots
//! - [`pool`] - Round-robin, append-only identity pool
//! - [`traits`] - `Session`, `SessionFactory`, `CandidateSource`
//! - [`wordspace`] - Exhaustive digit-word space and replay lists
//! - `utils` - Logger, roster, match log, proxies, init guard, worker runner

// Module declarations - internal modules marked pub(crate)
pub mod config;
pub mod coordinator;
pub mod error;
pub mod metrics;
pub mod pool;
pub mod traits;
pub mod wordspace;
pub(crate) mod utils;

// Selective exports - only public API types
pub use config::{IdentityProfile, MintNaming, ProxyConfig, RunConfig};
pub use coordinator::{Coordinator, Verdict};
pub use error::{
    ConfigError, CoreError, MintError, NetworkError, PersistenceError, SessionError,
};
pub use metrics::{MetricsSnapshot, RunMetrics};
pub use pool::IdentityPool;
pub use traits::{CandidateSource, Outcome, Session, SessionFactory};
pub use wordspace::{Candidate, MatchList, WordSpace, WordSpaceIter};

// Utils are pub(crate) - only export specific public utilities
pub use utils::{
    setup_logger, spawn_shutdown_listener, spawn_status_reporter, IdentityRoster, InitGuard,
    InitState, MatchLog, ProxyManager, RunSummary, WorkerRunner, STATUS_TARGET,
    WORD_RESULT_TARGET,
};
