//! User settings stored in `<config dir>/ocmscope/config.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ocmscope_logs::{DEFAULT_MIN_SEARCH_CHARS, RetryPolicy};
use ocmscope_table::DEFAULT_PAGE_SIZE;

const APP_DIR: &str = "ocmscope";
const CONFIG_FILE: &str = "config.toml";
const TABLE_STATE_FILE: &str = "table-state.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logs: LogSettings,
    pub table: TableSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Lines requested from the end of a container log
    pub tail_lines: i64,
    pub fetch_attempts: u32,
    pub retry_delay_ms: u64,
    /// Shortest input that triggers a log search
    pub min_search_chars: usize,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            tail_lines: 1000,
            fetch_attempts: 3,
            retry_delay_ms: 500,
            min_search_chars: DEFAULT_MIN_SEARCH_CHARS,
        }
    }
}

impl LogSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.fetch_attempts.max(1),
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    /// Tail limit for requests; zero or less means the whole log
    pub fn tail_limit(&self) -> Option<i64> {
        (self.tail_lines > 0).then_some(self.tail_lines)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    /// Page size used when none was saved for a table
    pub default_page_size: usize,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the default location
    ///
    /// A missing file at the default location yields the defaults; an
    /// explicitly given file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// `<config dir>/ocmscope`
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR))
}

pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(CONFIG_FILE))
}

/// Where table page sizes are persisted
pub fn table_state_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(TABLE_STATE_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.logs.tail_lines, 1000);
        assert_eq!(settings.logs.retry_policy(), RetryPolicy::default());
        assert_eq!(settings.table.default_page_size, 10);
    }

    #[test]
    fn test_partial_sections() {
        let settings = Settings::from_toml(
            r#"
            [logs]
            min_search_chars = 3
            tail_lines = 0
            "#,
        )
        .unwrap();
        assert_eq!(settings.logs.min_search_chars, 3);
        assert_eq!(settings.logs.fetch_attempts, 3);
        assert_eq!(settings.logs.tail_limit(), None);
        assert_eq!(settings.table, TableSettings::default());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[table]\ndefault_page_size = 50\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.table.default_page_size, 50);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[logs]\ntail_lines = \"lots\"\n").unwrap();

        let err = Settings::from_file(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }
}
