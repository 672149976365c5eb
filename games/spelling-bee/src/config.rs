use anyhow::Result;
use config::{Config, Environment, File};
use core_logic::{ConfigError, MintNaming, RunConfig, WordSpace};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BeeConfig {
    pub base_url: String,
    pub team_name: String,
    pub word_length: usize,
    pub alphabet_size: u8,
    pub workers: usize,
    pub attempt_timeout_ms: u64,
    pub rate_limit_threshold: u32,
    pub skip_known_matches: bool,
    pub status_interval_secs: u64,
    pub roster_path: String,
    pub matches_path: String,
    pub proxies_file: Option<String>,
    pub seed_name: String,
    pub seed_email: String,
    pub mint_name_prefix: String,
    pub mint_email_prefix: String,
    pub mint_email_domain: String,
    pub min_replay_length: usize,
}

impl Default for BeeConfig {
    fn default() -> Self {
        let naming = MintNaming::default();
        let run = RunConfig::default();
        Self {
            base_url: "http://buzz.pythonanywhere.com/".to_string(),
            team_name: "GASH".to_string(),
            word_length: 6,
            alphabet_size: 7,
            workers: run.workers,
            attempt_timeout_ms: 1000,
            rate_limit_threshold: run.rate_limit_threshold,
            skip_known_matches: run.skip_known_matches,
            status_interval_secs: run.status_interval_secs,
            roster_path: "accounts.json".to_string(),
            matches_path: "good.txt".to_string(),
            proxies_file: None,
            seed_name: naming.seed_name,
            seed_email: naming.seed_email,
            mint_name_prefix: naming.name_prefix,
            mint_email_prefix: naming.email_prefix,
            mint_email_domain: naming.email_domain,
            min_replay_length: 4,
        }
    }
}

impl BeeConfig {
    /// Loads `path` if it exists, then applies `BEE_*` environment overrides.
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("BEE").try_parsing(true))
            .build()?;

        let config: Self = settings.try_deserialize().map_err(|e| anyhow::anyhow!(e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.base_url).map_err(|_| ConfigError::InvalidUrl {
            url: self.base_url.clone(),
        })?;
        self.word_space()?;

        let positive = [
            ("workers", self.workers as u64),
            ("rate_limit_threshold", self.rate_limit_threshold as u64),
            ("attempt_timeout_ms", self.attempt_timeout_ms),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn word_space(&self) -> Result<WordSpace, ConfigError> {
        WordSpace::new(self.word_length, self.alphabet_size)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    pub fn to_run_config(&self) -> RunConfig {
        RunConfig {
            workers: self.workers,
            rate_limit_threshold: self.rate_limit_threshold,
            skip_known_matches: self.skip_known_matches,
            status_interval_secs: self.status_interval_secs,
        }
    }

    pub fn mint_naming(&self) -> MintNaming {
        MintNaming {
            seed_name: self.seed_name.clone(),
            seed_email: self.seed_email.clone(),
            name_prefix: self.mint_name_prefix.clone(),
            email_prefix: self.mint_email_prefix.clone(),
            email_domain: self.mint_email_domain.clone(),
        }
    }
}
