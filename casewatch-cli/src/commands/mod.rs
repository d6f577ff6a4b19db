//! Subcommand implementations

pub mod cases;
pub mod serve;

pub use cases::run_cases;
pub use serve::run_serve;

use anyhow::{Context, Result};
use casewatch_core::CasewatchConfig;
use std::path::PathBuf;

/// Overrides shared by every command that opens the repository.
#[derive(clap::Args, Debug, Default)]
pub struct SourceArgs {
    /// Database URL (overrides config file)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// JSON fixture used when the database is unreachable
    #[arg(long, env = "CASEWATCH_FALLBACK_FIXTURE")]
    pub fallback_fixture: Option<PathBuf>,

    /// Per-query timeout before falling back, in milliseconds
    #[arg(
        long,
        env = "CASEWATCH_QUERY_TIMEOUT_MS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub query_timeout_ms: Option<u64>,
}

impl SourceArgs {
    fn apply(&self, config: &mut CasewatchConfig) {
        if let Some(url) = self.database_url.as_deref().filter(|u| !u.trim().is_empty()) {
            config.database.url = Some(url.to_owned());
        }
        if let Some(path) = &self.fallback_fixture {
            config.fallback.fixture = Some(path.clone());
        }
        if let Some(ms) = self.query_timeout_ms {
            config.database.query_timeout_ms = ms;
        }
    }
}

/// Config file + environment, then command-line overrides.
pub fn load_config(source: &SourceArgs) -> Result<CasewatchConfig> {
    let mut config = CasewatchConfig::load().context("Failed to load configuration")?;
    source.apply(&mut config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let mut config = CasewatchConfig::default();
        let args = SourceArgs {
            database_url: Some("postgres://flag/db".into()),
            fallback_fixture: Some(PathBuf::from("/tmp/cases.json")),
            query_timeout_ms: Some(42),
        };
        args.apply(&mut config);
        assert_eq!(config.database.url.as_deref(), Some("postgres://flag/db"));
        assert_eq!(config.database.query_timeout_ms, 42);
        assert!(config.fallback.fixture.is_some());
    }

    #[test]
    fn blank_url_is_ignored() {
        let mut config = CasewatchConfig::default();
        let args = SourceArgs {
            database_url: Some("  ".into()),
            ..Default::default()
        };
        args.apply(&mut config);
        assert!(config.database.url.is_none());
    }
}
