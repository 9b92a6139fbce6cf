use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::ingest::{DateRange, LinkStyle, ParseOptions, SegmentMode};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub notegraph: NotegraphConfig,
    #[serde(default)]
    pub dates: DatesConfig,
    #[serde(default)]
    pub parse: ParseConfig,
}

/// Corpus and store locations
#[derive(Debug, Clone, Deserialize)]
pub struct NotegraphConfig {
    /// Root directory of the Markdown notes. Scanned recursively.
    pub notes_root: PathBuf,
    pub db_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Calendar bounds for the dates table.
///
/// `min_date` is inclusive, `max_date` exclusive. An unset `max_date`
/// means "today".
#[derive(Debug, Clone, Deserialize)]
pub struct DatesConfig {
    #[serde(default = "default_min_date")]
    pub min_date: String,
    #[serde(default)]
    pub max_date: Option<String>,
}

impl Default for DatesConfig {
    fn default() -> Self {
        Self {
            min_date: default_min_date(),
            max_date: None,
        }
    }
}

/// Parsing knobs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParseConfig {
    #[serde(default)]
    pub link_style: LinkStyle,
    /// Ignore `#` lines inside fenced code blocks when splitting entries.
    #[serde(default)]
    pub fence_aware_headings: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_min_date() -> String {
    "2014-01-01".to_string()
}

pub(crate) fn parse_day(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", value))
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in NOTEGRAPH_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// NOTEGRAPH_CONFIG if set (after reading .env), else ./config.toml
    pub fn default_path() -> PathBuf {
        let _ = dotenv::dotenv();

        std::env::var("NOTEGRAPH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"))
    }

    /// Load and validate a specific config file
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config = Self::read_from(config_path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file without validating it, so callers can apply
    /// overrides first.
    pub fn read_from(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        Self::from_toml_str(&config_str)
    }

    /// Parse without validation. Validation touches the filesystem.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        toml::from_str(config_str).context("Failed to parse config.toml")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.notegraph.notes_root.exists() {
            anyhow::bail!(
                "notes_root path does not exist: {}. Set notes_root in config.toml to your notes directory.",
                self.notegraph.notes_root.display()
            );
        }

        if !self.notegraph.notes_root.is_dir() {
            anyhow::bail!(
                "notes_root must be a directory, not a file: {}",
                self.notegraph.notes_root.display()
            );
        }

        let range = self.date_range()?;
        if range.min > range.max {
            anyhow::bail!(
                "dates.min_date ({}) must not be after dates.max_date ({})",
                range.min,
                range.max
            );
        }

        Ok(())
    }

    /// Resolve the configured calendar bounds. Missing max means today.
    pub fn date_range(&self) -> Result<DateRange> {
        let min = parse_day(&self.dates.min_date)?;
        let max = match &self.dates.max_date {
            Some(value) => parse_day(value)?,
            None => Local::now().date_naive(),
        };
        Ok(DateRange { min, max })
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            link_style: self.parse.link_style,
            segment_mode: if self.parse.fence_aware_headings {
                SegmentMode::FenceAware
            } else {
                SegmentMode::Lines
            },
        }
    }

    /// Get database path
    pub fn db_path(&self) -> &Path {
        &self.notegraph.db_path
    }

    /// Get the notes root path
    pub fn notes_root(&self) -> &Path {
        &self.notegraph.notes_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn create_test_config(temp_dir: &TempDir, extra: &str) -> String {
        let notes_root = temp_dir.path().canonicalize().unwrap();
        let notes_root_str = notes_root.to_str().unwrap().replace('\\', "\\\\");
        format!(
            r#"
[notegraph]
notes_root = "{}"
db_path = "./test.db"
log_level = "debug"
{}
"#,
            notes_root_str, extra
        )
    }

    #[test]
    fn test_config_load_success() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let content = create_test_config(
            &temp_dir,
            "[dates]\nmin_date = \"2020-01-01\"\nmax_date = \"2020-02-01\"\n\n[parse]\nlink_style = \"wiki\"\nfence_aware_headings = true\n",
        );
        fs::write(&config_path, content).unwrap();

        let config = Config::load_from(&config_path);
        assert!(config.is_ok(), "Config::load_from() failed: {:?}", config.err());
        let config = config.unwrap();
        assert_eq!(config.notegraph.log_level, "debug");
        assert_eq!(config.parse.link_style, LinkStyle::Wiki);

        let range = config.date_range().unwrap();
        assert_eq!(range.min, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(range.max, NaiveDate::from_ymd_opt(2020, 2, 1).unwrap());
        assert_eq!(config.parse_options().segment_mode, SegmentMode::FenceAware);
    }

    #[test]
    fn test_config_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::from_toml_str(&create_test_config(&temp_dir, "")).unwrap();
        assert_eq!(config.dates.min_date, "2014-01-01");
        assert!(config.dates.max_date.is_none());
        assert_eq!(config.parse.link_style, LinkStyle::Both);
        assert!(!config.parse.fence_aware_headings);

        let range = config.date_range().unwrap();
        assert_eq!(range.max, Local::now().date_naive());
        assert_eq!(config.parse_options().segment_mode, SegmentMode::Lines);
    }

    #[test]
    fn test_config_rejects_inverted_range() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::from_toml_str(&create_test_config(
            &temp_dir,
            "[dates]\nmin_date = \"2021-01-01\"\nmax_date = \"2020-01-01\"\n",
        ))
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must not be after"));
    }

    #[test]
    fn test_config_rejects_bad_date() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::from_toml_str(&create_test_config(
            &temp_dir,
            "[dates]\nmin_date = \"01/01/2020\"\n",
        ))
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_missing_root() {
        let config = Config::from_toml_str(
            "[notegraph]\nnotes_root = \"/definitely/not/here\"\ndb_path = \"x.db\"\n",
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_read_from_does_not_require_notes_root() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            "[notegraph]\nnotes_root = \"/definitely/not/here\"\ndb_path = \"notes.db\"\n",
        )
        .unwrap();

        let config = Config::read_from(&config_path).unwrap();
        assert_eq!(config.db_path(), Path::new("notes.db"));
        assert!(Config::load_from(&config_path).is_err());
    }

    #[test]
    fn test_config_from_env_var() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("custom.toml");
        fs::write(&config_path, create_test_config(&temp_dir, "")).unwrap();

        let original = std::env::var("NOTEGRAPH_CONFIG").ok();
        std::env::set_var("NOTEGRAPH_CONFIG", config_path.to_str().unwrap());
        let config = Config::load();
        std::env::remove_var("NOTEGRAPH_CONFIG");
        if let Some(v) = original {
            std::env::set_var("NOTEGRAPH_CONFIG", v);
        }

        assert!(config.is_ok(), "Config::load() failed: {:?}", config.err());
    }

    #[test]
    fn test_config_invalid_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let original = std::env::var("NOTEGRAPH_CONFIG").ok();
        std::env::set_var("NOTEGRAPH_CONFIG", "nonexistent.toml");
        let config = Config::load();
        assert!(config.is_err());
        std::env::remove_var("NOTEGRAPH_CONFIG");
        if let Some(v) = original {
            std::env::set_var("NOTEGRAPH_CONFIG", v);
        }
    }
}
