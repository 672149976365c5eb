use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Game-agnostic settings for a submission run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub workers: usize,
    /// Consecutive rate-limited responses for one word before minting a new identity.
    pub rate_limit_threshold: u32,
    pub skip_known_matches: bool,
    pub status_interval_secs: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            rate_limit_threshold: 5,
            skip_known_matches: false,
            status_interval_secs: 1,
        }
    }
}

impl RunConfig {
    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_secs.max(1))
    }
}

/// Name and email of one player identity, as stored in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProfile {
    pub name: String,
    pub email: String,
}

impl IdentityProfile {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// How the pool names the seed identity and identities minted mid-run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintNaming {
    pub seed_name: String,
    pub seed_email: String,
    pub name_prefix: String,
    pub email_prefix: String,
    pub email_domain: String,
}

impl Default for MintNaming {
    fn default() -> Self {
        Self {
            seed_name: "Bot 1".to_string(),
            seed_email: "notreal@example.com".to_string(),
            name_prefix: "Bot".to_string(),
            email_prefix: "gashbot".to_string(),
            email_domain: "example.com".to_string(),
        }
    }
}

impl MintNaming {
    pub fn seed(&self) -> IdentityProfile {
        IdentityProfile::new(&self.seed_name, &self.seed_email)
    }

    /// Profile for the identity at 1-based position `ordinal` in the pool.
    pub fn derive(&self, ordinal: usize) -> IdentityProfile {
        IdentityProfile::new(
            format!("{} {}", self.name_prefix, ordinal),
            format!("{}{}@{}", self.email_prefix, ordinal, self.email_domain),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}
