use crate::config::IdentityProfile;
use crate::error::PersistenceError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// JSON file holding the ordered list of identities, `[{name, email}, ...]`.
#[derive(Debug, Clone)]
pub struct IdentityRoster {
    path: PathBuf,
}

impl IdentityRoster {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the roster. A missing file yields an empty list so the pool can seed itself.
    pub fn load(&self) -> Result<Vec<IdentityProfile>, PersistenceError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    "[Roster] {} not found. Starting with a seed identity.",
                    self.path.display()
                );
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(PersistenceError::Read {
                    path: self.path.display().to_string(),
                    msg: e.to_string(),
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let profiles: Vec<IdentityProfile> =
            serde_json::from_str(&content).map_err(|e| PersistenceError::Decode {
                path: self.path.display().to_string(),
                msg: e.to_string(),
            })?;

        info!(
            "[Roster] Loaded {} identities from {}",
            profiles.len(),
            self.path.display()
        );
        Ok(profiles)
    }

    /// Overwrites the roster with `profiles`.
    pub fn save(&self, profiles: &[IdentityProfile]) -> Result<(), PersistenceError> {
        let write_err = |msg: String| PersistenceError::Write {
            path: self.path.display().to_string(),
            msg,
        };

        let mut json = serde_json::to_string_pretty(profiles).map_err(|e| write_err(e.to_string()))?;
        json.push('\n');
        fs::write(&self.path, json).map_err(|e| write_err(e.to_string()))?;

        info!(
            "[Roster] Saved {} identities to {}",
            profiles.len(),
            self.path.display()
        );
        Ok(())
    }
}
