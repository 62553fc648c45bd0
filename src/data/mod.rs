//! Dataset location, configuration and loading.

use std::fmt;
use std::path::PathBuf;

pub mod loader;

pub use loader::{LoadHandle, LoadOutcome, load_records, parse_records, spawn_load};

/// Dataset used when neither `--data` nor `DISTRICT_DATA` is set.
pub const DEFAULT_DATA_SOURCE: &str = "district_data.csv";
/// Header column holding the district name.
pub const DEFAULT_NAME_COLUMN: &str = "clean_name";

const ENV_DATA_SOURCE: &str = "DISTRICT_DATA";
const ENV_NAME_COLUMN: &str = "DISTRICT_NAME_COLUMN";

/// Where the dataset is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Path(PathBuf),
    Url(String),
}

impl DataSource {
    /// `http://` / `https://` locators are fetched; anything else is a path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::Path(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Resolved loader settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetConfig {
    pub source: DataSource,
    pub name_column: String,
}

impl DatasetConfig {
    /// Resolve settings with precedence: flag, then environment (`.env`
    /// included), then built-in default.
    pub fn resolve(data: Option<&str>, name_column: Option<&str>) -> Self {
        dotenvy::dotenv().ok();
        let env_data = std::env::var(ENV_DATA_SOURCE).ok();
        let env_name = std::env::var(ENV_NAME_COLUMN).ok();
        Self::from_parts(data, name_column, env_data.as_deref(), env_name.as_deref())
    }

    fn from_parts(
        data: Option<&str>,
        name_column: Option<&str>,
        env_data: Option<&str>,
        env_name: Option<&str>,
    ) -> Self {
        let source = data
            .or(env_data)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_DATA_SOURCE);
        let name_column = name_column
            .or(env_name)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_NAME_COLUMN);

        Self {
            source: DataSource::parse(source),
            name_column: name_column.to_string(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self::from_parts(None, None, None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_and_paths_are_distinguished() {
        assert_eq!(
            DataSource::parse("https://example.org/district_data.csv"),
            DataSource::Url("https://example.org/district_data.csv".to_string())
        );
        assert_eq!(
            DataSource::parse("data/district_data.csv"),
            DataSource::Path(PathBuf::from("data/district_data.csv"))
        );
    }

    #[test]
    fn flags_win_over_environment() {
        let config = DatasetConfig::from_parts(Some("a.csv"), None, Some("b.csv"), Some("district"));
        assert_eq!(config.source, DataSource::Path(PathBuf::from("a.csv")));
        assert_eq!(config.name_column, "district");
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = DatasetConfig::default();
        assert_eq!(config.source, DataSource::Path(PathBuf::from(DEFAULT_DATA_SOURCE)));
        assert_eq!(config.name_column, DEFAULT_NAME_COLUMN);
    }
}
