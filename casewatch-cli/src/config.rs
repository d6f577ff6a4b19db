use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use casewatch_core::CasewatchConfig;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a config file with default values
    Init(InitArgs),
    /// Print the effective config (file + environment) as TOML
    Show,
    /// Check that the config and fallback fixture load
    Validate,
    /// Print the active fallback dataset as a JSON fixture
    Fixture(FixtureArgs),
    /// Show config file path
    Path,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Parser, Debug)]
pub struct FixtureArgs {
    /// Write to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Init(args) => run_init(args),
        ConfigCommands::Show => run_show(),
        ConfigCommands::Validate => run_validate(),
        ConfigCommands::Fixture(args) => run_fixture(args),
        ConfigCommands::Path => run_path(),
    }
}

fn run_init(args: InitArgs) -> Result<()> {
    let config_path = CasewatchConfig::config_path();

    if config_path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Config already exists at {:?}\n\nUse --force to overwrite",
            config_path
        ));
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create {}", parent.display()))?;
    }

    let content = CasewatchConfig::default().to_toml_pretty()?;
    std::fs::write(&config_path, content)
        .context(format!("Failed to write config file: {:?}", config_path))?;

    println!("Created config at: {}", config_path.display());
    println!("Set [database] url (or DATABASE_URL) to serve live data.");

    Ok(())
}

fn run_show() -> Result<()> {
    let config = CasewatchConfig::load()?;
    println!("{}", redacted(&config).to_toml_pretty()?);
    Ok(())
}

/// Copy of `config` that is safe to print.
fn redacted(config: &CasewatchConfig) -> CasewatchConfig {
    let mut shown = config.clone();
    shown.database.url = shown.database.url.as_deref().map(redact_url);
    shown
}

fn run_validate() -> Result<()> {
    let config = CasewatchConfig::load()?;
    println!("config:   ok ({})", CasewatchConfig::config_path().display());

    let dataset = config
        .fallback_dataset()
        .context("Fallback fixture failed to load")?;
    let origin = match &config.fallback.fixture {
        Some(path) => path.display().to_string(),
        None => "built-in demo".to_string(),
    };
    println!("fallback: {} cases ({})", dataset.len(), origin);

    match &config.database.url {
        Some(url) => println!("database: {}", redact_url(url)),
        None => println!("database: not configured, fallback only"),
    }
    Ok(())
}

fn run_fixture(args: FixtureArgs) -> Result<()> {
    let config = CasewatchConfig::load()?;
    let json = config.fallback_dataset()?.to_json_pretty()?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, json)
                .context(format!("Failed to write fixture: {}", path.display()))?;
            println!("Wrote fixture to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_path() -> Result<()> {
    println!("{}", CasewatchConfig::config_path().display());
    Ok(())
}

/// Hide the password component of a connection URL.
fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((userinfo, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match userinfo.split_once(':') {
        Some((user, _)) => format!("{}://{}:***@{}", scheme, user, host),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_password() {
        assert_eq!(
            redact_url("postgres://app:s3cret@db:5432/cases"),
            "postgres://app:***@db:5432/cases"
        );
        assert_eq!(redact_url("postgres://app@db/cases"), "postgres://app@db/cases");
        assert_eq!(redact_url("not a url"), "not a url");
    }

    #[test]
    fn show_never_prints_escaped_password() {
        let mut config = CasewatchConfig::default();
        config.database.url = Some(r#"postgres://app:p"w\d@db/cases"#.into());

        let toml_str = redacted(&config).to_toml_pretty().unwrap();
        assert!(toml_str.contains("postgres://app:***@db/cases"));
        assert!(!toml_str.contains("p\\\"w"));
        assert!(!toml_str.contains("p\"w"));
        assert_eq!(config.database.url.as_deref(), Some(r#"postgres://app:p"w\d@db/cases"#));
    }
}
