//! # Core Error Types
//!
//! Centralized error definitions for the core-logic crate.
//! All errors implement `std::error::Error` and `std::fmt::Display`.
//!
//! Only conditions that stop a worker from making progress are errors here.
//! Wrong guesses and rate limiting are ordinary [`crate::Outcome`] values.

use thiserror::Error;

/// Unified error type for core-logic operations.
///
/// This enum wraps all specific error types and provides a unified
/// error interface for the application layer.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Config(ConfigError),

    #[error(transparent)]
    Session(SessionError),

    #[error(transparent)]
    Network(NetworkError),

    #[error(transparent)]
    Mint(MintError),

    #[error("Persistence error: {0}")]
    Persistence(PersistenceError),
}

impl From<ConfigError> for CoreError {
    fn from(e: ConfigError) -> Self {
        CoreError::Config(e)
    }
}

impl From<SessionError> for CoreError {
    fn from(e: SessionError) -> Self {
        CoreError::Session(e)
    }
}

impl From<NetworkError> for CoreError {
    fn from(e: NetworkError) -> Self {
        CoreError::Network(e)
    }
}

impl From<MintError> for CoreError {
    fn from(e: MintError) -> Self {
        CoreError::Mint(e)
    }
}

impl From<PersistenceError> for CoreError {
    fn from(e: PersistenceError) -> Self {
        CoreError::Persistence(e)
    }
}

/// Configuration-related errors
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Invalid base URL: '{url}'")]
    InvalidUrl { url: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("I/O error reading {path}: {msg}")]
    IoError { path: String, msg: String },
}

/// Identity initialization errors (cookie jar, anti-forgery token, login).
#[derive(Error, Debug, Clone)]
pub enum SessionError {
    #[error("No csrftoken cookie received from {endpoint}")]
    NoCsrfToken { endpoint: String },

    #[error("Registration for '{name}' failed: {reason}")]
    RegistrationFailed { name: String, reason: String },

    #[error("Login for '{email}' failed with HTTP {status}: {body}")]
    LoginFailed {
        email: String,
        status: u16,
        body: String,
    },

    #[error("Request to {endpoint} failed during initialization: {reason}")]
    Request { endpoint: String, reason: String },

    #[error("Could not build HTTP client: {reason}")]
    ClientBuild { reason: String },

    #[error("Initialization previously failed: {reason}")]
    InitFailed { reason: String },
}

/// Network errors that are fatal to the issuing worker
#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("Transport error submitting '{word}': {reason}")]
    Transport { word: String, reason: String },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}

/// Identity minting errors, fatal to the candidate being processed
#[derive(Error, Debug, Clone)]
pub enum MintError {
    #[error("Could not mint identity '{name}': {reason}")]
    Registration { name: String, reason: String },

    #[error("Word '{word}' still rate limited after {attempts} attempts and a fresh identity")]
    StillRateLimited { word: String, attempts: u32 },
}

/// Roster and match-log file errors
#[derive(Error, Debug, Clone)]
pub enum PersistenceError {
    #[error("failed to read {path}: {msg}")]
    Read { path: String, msg: String },

    #[error("failed to write {path}: {msg}")]
    Write { path: String, msg: String },

    #[error("failed to decode {path}: {msg}")]
    Decode { path: String, msg: String },
}
