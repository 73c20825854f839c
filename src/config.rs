//! Engine configuration.
//!
//! Defaults cover normal use; a JSON file can override any field and the CLI
//! overrides the file. Validation runs once at startup and lists every problem.

use crate::errors::{LureError, LureResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Page fetch timeout in seconds (5-10)
    pub content_timeout_secs: u64,
    /// Certificate-validating request timeout in seconds (5-10)
    pub tls_timeout_secs: u64,
    /// WHOIS timeout in seconds (1-3)
    pub whois_timeout_secs: u64,
    /// Reverse-IP lookup timeout in seconds (1-3)
    pub reverse_ip_timeout_secs: u64,
    pub max_redirects: usize,
    /// Bytes of page body kept for inspection
    pub max_body_bytes: usize,
    pub user_agent: String,
    pub reverse_ip_endpoint: String,
    /// WHOIS server asked for the per-TLD referral
    pub whois_server: String,
    pub whois_port: u16,
    /// Skip every network probe
    pub offline: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            content_timeout_secs: 8,
            tls_timeout_secs: 8,
            whois_timeout_secs: 3,
            reverse_ip_timeout_secs: 3,
            max_redirects: 10,
            max_body_bytes: 2 * 1024 * 1024,
            user_agent: format!("lurescan/{}", env!("CARGO_PKG_VERSION")),
            reverse_ip_endpoint: "https://api.hackertarget.com/reverseiplookup/".to_string(),
            whois_server: "whois.iana.org".to_string(),
            whois_port: 43,
            offline: false,
        }
    }
}

impl EngineConfig {
    /// Load a JSON configuration file; missing fields keep their defaults.
    pub fn load(path: &Path) -> LureResult<Self> {
        log::debug!("Loading configuration from {:?}", path);
        let raw = std::fs::read_to_string(path).map_err(|e| LureError::io(e, path.to_path_buf()))?;
        let config: EngineConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Check every bound, failing with all violations at once.
    pub fn validate(&self) -> LureResult<()> {
        let mut problems = Vec::new();

        if !(5..=10).contains(&self.content_timeout_secs) {
            problems.push(format!(
                "content_timeout_secs must be 5-10, got {}",
                self.content_timeout_secs
            ));
        }
        if !(5..=10).contains(&self.tls_timeout_secs) {
            problems.push(format!("tls_timeout_secs must be 5-10, got {}", self.tls_timeout_secs));
        }
        if !(1..=3).contains(&self.whois_timeout_secs) {
            problems.push(format!(
                "whois_timeout_secs must be 1-3, got {}",
                self.whois_timeout_secs
            ));
        }
        if !(1..=3).contains(&self.reverse_ip_timeout_secs) {
            problems.push(format!(
                "reverse_ip_timeout_secs must be 1-3, got {}",
                self.reverse_ip_timeout_secs
            ));
        }
        if self.max_body_bytes == 0 {
            problems.push("max_body_bytes must be positive".to_string());
        }
        if url::Url::parse(&self.reverse_ip_endpoint).is_err() {
            problems.push(format!(
                "reverse_ip_endpoint is not a URL: {}",
                self.reverse_ip_endpoint
            ));
        }
        if self.whois_server.trim().is_empty() {
            problems.push("whois_server must not be empty".to_string());
        }
        if self.whois_port == 0 {
            problems.push("whois_port must not be 0".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(LureError::Config { problems })
        }
    }

    pub fn content_timeout(&self) -> Duration {
        Duration::from_secs(self.content_timeout_secs)
    }

    pub fn tls_timeout(&self) -> Duration {
        Duration::from_secs(self.tls_timeout_secs)
    }

    pub fn whois_timeout(&self) -> Duration {
        Duration::from_secs(self.whois_timeout_secs)
    }

    pub fn reverse_ip_timeout(&self) -> Duration {
        Duration::from_secs(self.reverse_ip_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_collects_all_problems() {
        let config = EngineConfig {
            content_timeout_secs: 30,
            whois_timeout_secs: 0,
            ..EngineConfig::default()
        };
        match config.validate() {
            Err(LureError::Config { problems }) => {
                assert_eq!(problems.len(), 2);
                assert!(problems[0].contains("content_timeout_secs"));
                assert!(problems[1].contains("whois_timeout_secs"));
            }
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_partial_file() -> LureResult<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, r#"{{ "content_timeout_secs": 6, "offline": true }}"#)?;

        let config = EngineConfig::load(file.path())?;
        assert_eq!(config.content_timeout_secs, 6);
        assert!(config.offline);
        assert_eq!(config.whois_port, 43);
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineConfig::load(Path::new("/nonexistent/lurescan.json")).unwrap_err();
        assert!(err.to_string().contains("lurescan.json"));
    }
}
