//! Application settings.
//!
//! Read from an optional `settings.toml` in the working directory, then
//! overridden by `FINANCE__SECTION__KEY` environment variables
//! (e.g. `FINANCE__SERVER__PORT=8081`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    /// `tracing` level for the workspace crates.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("FINANCE").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(raw: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn sqlite_database() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            port = 3000
            database = { sqlite = "finance.db" }
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.server.database.url(), "sqlite:finance.db?mode=rwc");
        assert!(settings.server.bind.is_none());
    }

    #[test]
    fn memory_database_and_default_level() {
        let settings = parse(
            r#"
            [server]
            bind = "0.0.0.0"
            port = 8080
            database = "memory"
            "#,
        );
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.database.url(), "sqlite::memory:");
    }
}
