//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and from `LADGER_`-prefixed environment variables
//! (`LADGER_APP__LEVEL=debug`, `LADGER_ARCHIVE__DIR=/srv/archive`).
//!
//! ```toml
//! [app]
//! level = "info"
//!
//! [database]
//! sqlite = "ladger.db"
//!
//! [archive]
//! dir = "/home/alice/Vault/Finance/Transactions"
//! ```
use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite("ladger.db".to_string())
    }
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Archive {
    /// Defaults to `<home>/Vault/Finance/Transactions`.
    pub dir: Option<PathBuf>,
}

impl Archive {
    pub fn dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(engine::archive::default_location)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub archive: Archive,
}

impl Settings {
    pub fn new(path: Option<&str>) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path.unwrap_or(DEFAULT_CONFIG_PATH)).required(false))
            .add_source(
                Environment::with_prefix("LADGER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = Settings::new(Some("does-not-exist/settings")).unwrap();
        assert_eq!(settings.database, Database::Sqlite("ladger.db".to_string()));
        assert!(settings.archive.dir().ends_with("Vault/Finance/Transactions"));
    }

    #[test]
    fn file_values_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            "[app]\nlevel = \"debug\"\n\n[database]\nsqlite = \"/tmp/books.db\"\n\n[archive]\ndir = \"/tmp/archive\"\n",
        )
        .unwrap();

        let settings = Settings::new(path.to_str()).unwrap();
        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.database.url(), "sqlite:/tmp/books.db?mode=rwc");
        assert_eq!(settings.archive.dir(), PathBuf::from("/tmp/archive"));
    }

    #[test]
    fn memory_database_url() {
        assert_eq!(Database::Memory.url(), "sqlite::memory:");
    }
}
