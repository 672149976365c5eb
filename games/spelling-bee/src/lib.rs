//! # Spelling Bee
//!
//! Concrete identity sessions and configuration for the numeric spelling-bee
//! game. The generic machinery (pool, coordinator, workers) lives in `core-logic`.

pub mod config;
pub mod session;

pub use config::BeeConfig;
pub use session::{BeeSession, BeeSessionFactory};
