use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use tally_storage::RetryPolicy;

/// Settings from `tally.toml` in the data directory. Every field has a
/// default so a missing file is fine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage retry attempts for transient I/O failures.
    pub retry_attempts: u32,
    /// Base backoff between retries, in milliseconds.
    pub retry_backoff_ms: u64,
    /// Cluster gap descriptions on their first N tokens; unset clusters on
    /// the whole normalized description.
    pub gap_token_prefix: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            retry_attempts: 3,
            retry_backoff_ms: 50,
            gap_token_prefix: None,
        }
    }
}

impl Config {
    pub fn load(data_dir: &Path) -> anyhow::Result<Self> {
        let path = data_dir.join("tally.toml");
        if !path.exists() {
            return Ok(Config::default());
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry_attempts,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

/// Platform data dir (~/.local/share/tally on Linux), unless overridden.
pub fn data_dir(override_dir: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir);
    }
    let dirs = directories::ProjectDirs::from("com", "tally", "Tally")
        .context("could not determine a data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.gap_token_prefix, None);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tally.toml"), "gap_token_prefix = 2\n").unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.gap_token_prefix, Some(2));
        assert_eq!(config.retry_attempts, 3);
    }

    #[test]
    fn bad_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tally.toml"), "retry_attempts = \"three\"").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }
}
