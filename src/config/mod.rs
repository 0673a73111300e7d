//! Configuration management for `itrack`.
//!
//! Configuration is layered, highest precedence first:
//! - CLI flags (`--bind`, `--db`, `--log-format`)
//! - Environment variables (`PORT`, `ISSUETRACK_BIND`, `ISSUETRACK_DB`/`DB`,
//!   `ISSUETRACK_LOG_FORMAT`)
//! - YAML config file (`--config` or `ISSUETRACK_CONFIG`)
//! - Built-in defaults

use std::fmt;
use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, Result};

pub const DEFAULT_HOST: Ipv4Addr = Ipv4Addr::UNSPECIFIED;
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE_URL: &str = "memory:";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(AppError::config(format!(
                "unknown log format '{other}' (expected text or json)"
            ))),
        }
    }
}

/// Fully resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub database_url: String,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((DEFAULT_HOST, DEFAULT_PORT)),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            log_format: LogFormat::Text,
        }
    }
}

/// Values set on the command line; `None` leaves the lower layers in charge.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub bind: Option<SocketAddr>,
    pub database_url: Option<String>,
    pub log_format: Option<LogFormat>,
}

/// On-disk YAML shape. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    bind: Option<String>,
    database_url: Option<String>,
    log_format: Option<LogFormat>,
}

/// Resolve configuration from the process environment.
///
/// # Errors
///
/// Returns `Config` for unreadable files or invalid values.
pub fn load(overrides: &CliOverrides) -> Result<ServerConfig> {
    load_with_env(overrides, |key| std::env::var(key).ok())
}

/// Resolve configuration with an explicit environment lookup.
///
/// # Errors
///
/// Returns `Config` naming the layer that carried an invalid value.
pub fn load_with_env<F>(overrides: &CliOverrides, env: F) -> Result<ServerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ServerConfig::default();

    if let Some(path) = overrides.config.as_deref() {
        apply_file(&mut config, path)?;
    }

    apply_env(&mut config, &env)?;

    if let Some(bind) = overrides.bind {
        config.bind = bind;
    }
    if let Some(ref url) = overrides.database_url {
        config.database_url.clone_from(url);
    }
    if let Some(format) = overrides.log_format {
        config.log_format = format;
    }

    debug!(
        bind = %config.bind,
        database_url = %config.database_url,
        log_format = %config.log_format,
        "resolved configuration"
    );
    Ok(config)
}

fn apply_file(config: &mut ServerConfig, path: &Path) -> Result<()> {
    let contents = fs::read_to_string(path).map_err(|e| {
        AppError::config(format!("cannot read config file {}: {e}", path.display()))
    })?;
    if contents.trim().is_empty() {
        return Ok(());
    }

    let file: FileConfig = serde_yaml::from_str(&contents)
        .map_err(|e| AppError::config(format!("{}: {e}", path.display())))?;

    if let Some(bind) = file.bind {
        config.bind = parse_bind(&bind, &path.display().to_string())?;
    }
    if let Some(url) = file.database_url {
        config.database_url = url;
    }
    if let Some(format) = file.log_format {
        config.log_format = format;
    }
    Ok(())
}

fn apply_env<F>(config: &mut ServerConfig, env: &F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    if let Some(port) = var("PORT") {
        let port: u16 = port
            .trim()
            .parse()
            .map_err(|_| AppError::config(format!("PORT: invalid port '{port}'")))?;
        config.bind.set_port(port);
    }
    if let Some(bind) = var("ISSUETRACK_BIND") {
        config.bind = parse_bind(&bind, "ISSUETRACK_BIND")?;
    }
    if let Some(url) = var("ISSUETRACK_DB").or_else(|| var("DB")) {
        config.database_url = url;
    }
    if let Some(format) = var("ISSUETRACK_LOG_FORMAT") {
        config.log_format = format
            .parse()
            .map_err(|e| AppError::config(format!("ISSUETRACK_LOG_FORMAT: {e}")))?;
    }
    Ok(())
}

fn parse_bind(raw: &str, source: &str) -> Result<SocketAddr> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::config(format!("{source}: invalid bind address '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = load_with_env(&CliOverrides::default(), env_from(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind.to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_port_keeps_host() {
        let config = load_with_env(&CliOverrides::default(), env_from(&[("PORT", "8080")])).unwrap();
        assert_eq!(config.bind.to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let err = load_with_env(&CliOverrides::default(), env_from(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, AppError::Config(ref msg) if msg.contains("PORT")));
    }

    #[test]
    fn test_issuetrack_db_wins_over_db() {
        let config = load_with_env(
            &CliOverrides::default(),
            env_from(&[("DB", "jsonl:a.jsonl"), ("ISSUETRACK_DB", "sqlite::memory:")]),
        )
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
    }

    #[test]
    fn test_cli_beats_env_beats_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("itrack.yaml");
        fs::write(
            &path,
            "bind: 127.0.0.1:4000\ndatabase_url: \"jsonl:file.jsonl\"\nlog_format: json\n",
        )
        .unwrap();

        let overrides = CliOverrides {
            config: Some(path.clone()),
            ..Default::default()
        };
        let from_file = load_with_env(&overrides, env_from(&[])).unwrap();
        assert_eq!(from_file.bind.to_string(), "127.0.0.1:4000");
        assert_eq!(from_file.database_url, "jsonl:file.jsonl");
        assert_eq!(from_file.log_format, LogFormat::Json);

        let from_env =
            load_with_env(&overrides, env_from(&[("ISSUETRACK_DB", "memory:")])).unwrap();
        assert_eq!(from_env.database_url, "memory:");
        assert_eq!(from_env.bind.to_string(), "127.0.0.1:4000");

        let overrides = CliOverrides {
            config: Some(path),
            bind: Some("127.0.0.1:5000".parse().unwrap()),
            database_url: Some("sqlite::memory:".to_string()),
            log_format: Some(LogFormat::Text),
        };
        let from_cli = load_with_env(&overrides, env_from(&[("ISSUETRACK_DB", "memory:")])).unwrap();
        assert_eq!(from_cli.bind.to_string(), "127.0.0.1:5000");
        assert_eq!(from_cli.database_url, "sqlite::memory:");
        assert_eq!(from_cli.log_format, LogFormat::Text);
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let overrides = CliOverrides {
            config: Some(PathBuf::from("/nonexistent/itrack.yaml")),
            ..Default::default()
        };
        assert!(matches!(
            load_with_env(&overrides, env_from(&[])),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_unknown_file_key_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("itrack.yaml");
        fs::write(&path, "listen: 1.2.3.4:1\n").unwrap();
        let overrides = CliOverrides {
            config: Some(path),
            ..Default::default()
        };
        assert!(load_with_env(&overrides, env_from(&[])).is_err());
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
