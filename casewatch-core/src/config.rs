//! Configuration for casewatch
//!
//! Layered, lowest precedence first:
//! 1. Built-in defaults
//! 2. `~/.casewatch/config.toml` (or the file named by `CASEWATCH_CONFIG`)
//! 3. Environment variables (`DATABASE_URL`, `CASEWATCH_BIND`,
//!    `CASEWATCH_QUERY_TIMEOUT_MS`, `CASEWATCH_FALLBACK_FIXTURE`)
//!
//! CLI flags are applied on top by the binary.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::fallback::FallbackDataset;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CasewatchConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub fallback: FallbackSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: SocketAddr,
    /// Allow any CORS origin instead of localhost only
    pub cors_permissive: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3030)),
            cors_permissive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// PostgreSQL URL; unset means fallback-only
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_ms: u64,
    /// Upper bound on any single live query before falling back
    pub query_timeout_ms: u64,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
            acquire_timeout_ms: 2000,
            query_timeout_ms: 1500,
        }
    }
}

impl DatabaseSection {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    /// A zero query timeout would time out every live query.
    pub fn validate(&self) -> Result<()> {
        if self.query_timeout_ms == 0 {
            return Err(CoreError::config("query_timeout_ms must be > 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackSection {
    /// JSON fixture replacing the built-in demo cases
    pub fixture: Option<PathBuf>,
}

impl CasewatchConfig {
    /// Config file location: `$CASEWATCH_CONFIG` or `~/.casewatch/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("CASEWATCH_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".casewatch")
            .join("config.toml")
    }

    /// Load from the default path (if present) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        let config: Self = toml::from_str(&content).map_err(|source| CoreError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.database.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            self.database.url = Some(url);
        }
        if let Some(bind) = lookup("CASEWATCH_BIND") {
            self.server.bind = bind.parse().map_err(|_| {
                CoreError::config(format!("CASEWATCH_BIND is not a socket address: '{}'", bind))
            })?;
        }
        if let Some(ms) = lookup("CASEWATCH_QUERY_TIMEOUT_MS") {
            self.database.query_timeout_ms = ms.parse().map_err(|_| {
                CoreError::config(format!("CASEWATCH_QUERY_TIMEOUT_MS is not a number: '{}'", ms))
            })?;
        }
        if let Some(path) = lookup("CASEWATCH_FALLBACK_FIXTURE").filter(|v| !v.trim().is_empty()) {
            self.fallback.fixture = Some(PathBuf::from(path));
        }
        self.database.validate()
    }

    /// Fixture-backed dataset, or the demo cases when none is configured.
    pub fn fallback_dataset(&self) -> Result<FallbackDataset> {
        match &self.fallback.fixture {
            Some(path) => FallbackDataset::from_json_path(path),
            None => Ok(FallbackDataset::demo()),
        }
    }

    pub fn to_toml_pretty(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CoreError::config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = CasewatchConfig::default();
        assert_eq!(config.server.bind.port(), 3030);
        assert!(!config.server.cors_permissive);
        assert!(config.database.url.is_none());
        assert_eq!(config.database.query_timeout(), Duration::from_millis(1500));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: CasewatchConfig = toml::from_str(
            r#"
            [database]
            url = "postgres://localhost/casewatch"
            query_timeout_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.database.url.as_deref(), Some("postgres://localhost/casewatch"));
        assert_eq!(config.database.query_timeout_ms, 250);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.server.bind.port(), 3030);
    }

    #[test]
    fn env_overrides_file() {
        let mut config = CasewatchConfig::default();
        config
            .apply_env(env(&[
                ("DATABASE_URL", "postgres://db/cases"),
                ("CASEWATCH_BIND", "0.0.0.0:8080"),
                ("CASEWATCH_QUERY_TIMEOUT_MS", "100"),
            ]))
            .unwrap();
        assert_eq!(config.database.url.as_deref(), Some("postgres://db/cases"));
        assert_eq!(config.server.bind.port(), 8080);
        assert_eq!(config.database.query_timeout_ms, 100);
    }

    #[test]
    fn env_rejects_bad_values() {
        let mut config = CasewatchConfig::default();
        let err = config
            .apply_env(env(&[("CASEWATCH_QUERY_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("CASEWATCH_QUERY_TIMEOUT_MS"));
    }

    #[test]
    fn env_rejects_zero_query_timeout() {
        let mut config = CasewatchConfig::default();
        let err = config
            .apply_env(env(&[("CASEWATCH_QUERY_TIMEOUT_MS", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("query_timeout_ms must be > 0"));
    }

    #[test]
    fn file_rejects_zero_query_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[database]\nurl = \"postgres://db/cases\"\nquery_timeout_ms = 0\n",
        )
        .unwrap();
        let err = CasewatchConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("query_timeout_ms must be > 0"));
    }

    #[test]
    fn load_from_file_and_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = CasewatchConfig::default();
        config.server.cors_permissive = true;
        std::fs::write(&path, config.to_toml_pretty().unwrap()).unwrap();

        let loaded = CasewatchConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn invalid_toml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nbind = 42\n").unwrap();
        assert!(matches!(
            CasewatchConfig::load_from(&path),
            Err(CoreError::Toml { .. })
        ));
    }

    #[test]
    fn demo_dataset_without_fixture() {
        let dataset = CasewatchConfig::default().fallback_dataset().unwrap();
        assert_eq!(dataset.len(), 3);
    }
}
