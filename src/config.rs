//! Configuration loaded from `~/.config/webfetch/config.toml`.
//!
//! Every field is optional; a missing file or section means defaults.
//!
//! ```toml
//! [extract]
//! max_document_bytes = 104857600
//! max_workers = 32
//! parallelism = 8
//! line_break_threshold = 1.0
//! word_gap_ratio = 0.2
//! min_word_gap = 1.0
//!
//! [fetch]
//! timeout_secs = 30
//! user_agent = "webfetch/1.0"
//! max_content_len = 100000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::content::guard::MAX_DOCUMENT_BYTES;
use crate::content::reconstruct::Thresholds;
use crate::content::schedule::MAX_WORKERS;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extract: ExtractConfig,
    pub fetch: FetchConfig,
}

/// Settings for the PDF extraction engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Ingestion ceiling in bytes.
    pub max_document_bytes: u64,
    /// Upper bound on concurrent page-range workers (clamped to 32).
    pub max_workers: usize,
    /// Worker parallelism; defaults to the rayon pool size.
    pub parallelism: Option<usize>,
    pub line_break_threshold: f32,
    pub word_gap_ratio: f32,
    pub min_word_gap: f32,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        let thresholds = Thresholds::default();
        Self {
            max_document_bytes: MAX_DOCUMENT_BYTES,
            max_workers: MAX_WORKERS,
            parallelism: None,
            line_break_threshold: thresholds.line_break,
            word_gap_ratio: thresholds.word_gap_ratio,
            min_word_gap: thresholds.min_word_gap,
        }
    }
}

impl ExtractConfig {
    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            line_break: self.line_break_threshold,
            word_gap_ratio: self.word_gap_ratio,
            min_word_gap: self.min_word_gap,
        }
    }

    /// Worker ceiling, never above [`MAX_WORKERS`].
    #[must_use]
    pub fn worker_ceiling(&self) -> usize {
        self.max_workers.clamp(1, MAX_WORKERS)
    }
}

/// Settings for the HTTP fetcher.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Printed markdown is cut to this many bytes; 0 disables the cap.
    pub max_content_len: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "webfetch/1.0".to_string(),
            max_content_len: 100_000,
        }
    }
}

impl FetchConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load the user config, falling back to defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load from an explicit path; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("invalid TOML in {}", path.display()))
    }
}

/// Return the path to the config file.
fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("webfetch")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.extract.max_document_bytes, MAX_DOCUMENT_BYTES);
        assert_eq!(config.extract.max_workers, MAX_WORKERS);
        assert_eq!(config.extract.thresholds(), Thresholds::default());
        assert_eq!(config.fetch.timeout(), Duration::from_secs(30));
        assert_eq!(config.fetch.user_agent, "webfetch/1.0");
        assert_eq!(config.fetch.max_content_len, 100_000);
    }

    #[test]
    fn parse_partial_extract_section() {
        let toml_str = r"
[extract]
max_workers = 4
word_gap_ratio = 0.25
";
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.extract.max_workers, 4);
        assert!((config.extract.word_gap_ratio - 0.25).abs() < f32::EPSILON);
        assert!((config.extract.line_break_threshold - 1.0).abs() < f32::EPSILON);
        assert!(config.extract.parallelism.is_none());
    }

    #[test]
    fn parse_fetch_section() {
        let toml_str = r#"
[fetch]
timeout_secs = 5
user_agent = "custom/2.0"
max_content_len = 0
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.fetch.timeout(), Duration::from_secs(5));
        assert_eq!(config.fetch.user_agent, "custom/2.0");
        assert_eq!(config.fetch.max_content_len, 0);
    }

    #[test]
    fn worker_ceiling_is_clamped() {
        let mut extract = ExtractConfig {
            max_workers: 500,
            ..ExtractConfig::default()
        };
        assert_eq!(extract.worker_ceiling(), MAX_WORKERS);
        extract.max_workers = 0;
        assert_eq!(extract.worker_ceiling(), 1);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load_from(Path::new("/nonexistent/webfetch/config.toml")).unwrap();
        assert_eq!(config.extract.max_workers, MAX_WORKERS);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = std::env::temp_dir().join(format!("webfetch-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[extract\nmax_workers = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("invalid TOML"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
