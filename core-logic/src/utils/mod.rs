//! # Utilities Module
//!
//! Internal utility modules for the core-logic crate.
//! These modules are marked as `pub(crate)` to enforce API boundaries.

// Internal modules - not part of public API
pub(crate) mod init_guard;
pub(crate) mod logger;
pub(crate) mod match_log;
pub(crate) mod proxy_manager;
pub(crate) mod roster;
pub(crate) mod runner;

// Selective exports - only public utilities
pub use init_guard::{InitGuard, InitState};
pub use logger::{setup_logger, STATUS_TARGET, WORD_RESULT_TARGET};
pub use match_log::MatchLog;
pub use proxy_manager::ProxyManager;
pub use roster::IdentityRoster;
pub use runner::{spawn_shutdown_listener, spawn_status_reporter, RunSummary, WorkerRunner};
