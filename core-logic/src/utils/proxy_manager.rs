use crate::config::ProxyConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub struct ProxyManager;

impl ProxyManager {
    /// Loads proxies from `path`.
    /// Format expected: independent lines of ip:port or ip:port:username:password
    pub fn load_proxies(path: impl AsRef<Path>) -> Result<Vec<ProxyConfig>> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("{} not found. Running without proxies.", path.display());
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let proxies = Self::parse(&content);

        info!("Loaded {} proxies from {}", proxies.len(), path.display());
        Ok(proxies)
    }

    pub fn parse(content: &str) -> Vec<ProxyConfig> {
        let mut proxies = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split(':').collect();
            if parts.len() != 2 && parts.len() != 4 {
                warn!("Skipping invalid proxy line: {}", line);
                continue;
            }

            let url = format!("http://{}:{}", parts[0], parts[1]);
            let (username, password) = if parts.len() == 4 {
                (Some(parts[2].to_string()), Some(parts[3].to_string()))
            } else {
                (None, None)
            };

            proxies.push(ProxyConfig {
                url,
                username,
                password,
            });
        }

        proxies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_authenticated_lines() {
        let proxies = ProxyManager::parse("# comment\n10.0.0.1:8080\n\n10.0.0.2:3128:user:pass\nbroken\n");

        assert_eq!(proxies.len(), 2);
        assert_eq!(proxies[0].url, "http://10.0.0.1:8080");
        assert!(proxies[0].username.is_none());
        assert_eq!(proxies[1].url, "http://10.0.0.2:3128");
        assert_eq!(proxies[1].username.as_deref(), Some("user"));
        assert_eq!(proxies[1].password.as_deref(), Some("pass"));
    }

    #[test]
    fn missing_file_means_no_proxies() {
        let proxies = ProxyManager::load_proxies("definitely-not-here/proxies.txt").unwrap();
        assert!(proxies.is_empty());
    }
}
