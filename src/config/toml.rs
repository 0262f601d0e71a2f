//! TOML configuration file parsing

use super::*;
use crate::config::cli::{Cli, ExecutionMode};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<FileConfig> {
    let config: FileConfig = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Merge CLI arguments with file configuration (CLI takes precedence)
///
/// In coordinator mode the worker count is always the number of worker
/// addresses plus the coordinator itself.
pub fn merge_cli_with_config(cli: &Cli, mut config: FileConfig) -> Result<FileConfig> {
    if cli.size.is_some() {
        config.size = cli.size;
    }
    if cli.workers.is_some() {
        config.workers = cli.workers;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if cli.display_limit.is_some() {
        config.display_limit = cli.display_limit;
    }
    if cli.verify {
        config.verify = Some(true);
    }
    if cli.json_output.is_some() {
        config.json_output = cli.json_output.clone();
    }

    if cli.mode == ExecutionMode::Coordinator {
        let nodes = cli.node_addresses();
        if nodes.is_empty() {
            return Err(UsageError::NoHosts.into());
        }
        if let Some(requested) = config.workers {
            if requested != nodes.len() + 1 {
                tracing::warn!(
                    requested,
                    actual = nodes.len() + 1,
                    "worker count follows --host-list in coordinator mode"
                );
            }
        }
        config.workers = Some(nodes.len() + 1);
    }

    Ok(config)
}

impl SortConfig {
    /// Build the run configuration from the command line and optional file
    ///
    /// Usage errors come back as [`UsageError`] inside the `anyhow::Error`.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let file = match cli.config {
            Some(ref path) => parse_toml_file(path)?,
            None => FileConfig::default(),
        };

        let merged = merge_cli_with_config(cli, file)?;
        Ok(validator::validate_config(merged)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_parse_toml_string() {
        let config = parse_toml_string("size = 500\nworkers = 4\nseed = 7\nverify = true\n").unwrap();
        assert_eq!(config.size, Some(500));
        assert_eq!(config.workers, Some(4));
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.verify, Some(true));
        assert_eq!(config.display_limit, None);
    }

    #[test]
    fn test_parse_toml_unknown_key() {
        assert!(parse_toml_string("size = 5\nbuckets = 3\n").is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "size = 500\nworkers = 4\ndisplay_limit = 10").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let cli = Cli::try_parse_from(["bucketsort", "--config", &path, "-p", "2", "64"]).unwrap();
        let config = SortConfig::from_cli(&cli).unwrap();

        assert_eq!(config.size, 64);
        assert_eq!(config.workers.get(), 2);
        assert_eq!(config.display_limit, 10);
    }

    #[test]
    fn test_size_from_file_only() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "size = 32").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let cli = Cli::try_parse_from(["bucketsort", "--config", &path, "-p", "1"]).unwrap();
        assert_eq!(SortConfig::from_cli(&cli).unwrap().size, 32);
    }

    #[test]
    fn test_zero_size_is_usage_error() {
        let cli = Cli::try_parse_from(["bucketsort", "0"]).unwrap();
        let err = SortConfig::from_cli(&cli).unwrap_err();
        assert_eq!(
            err.downcast_ref::<UsageError>(),
            Some(&UsageError::NonPositiveSize(0))
        );
    }

    #[test]
    fn test_missing_size_is_usage_error() {
        let cli = Cli::try_parse_from(["bucketsort"]).unwrap();
        let err = SortConfig::from_cli(&cli).unwrap_err();
        assert_eq!(err.downcast_ref::<UsageError>(), Some(&UsageError::MissingSize));
    }

    #[test]
    fn test_coordinator_workers_follow_host_list() {
        let cli = Cli::try_parse_from([
            "bucketsort",
            "--mode",
            "coordinator",
            "--host-list",
            "a:1,b:2,c:3",
            "-p",
            "9",
            "100",
        ])
        .unwrap();
        assert_eq!(SortConfig::from_cli(&cli).unwrap().workers.get(), 4);
    }

    #[test]
    fn test_coordinator_without_hosts() {
        let cli = Cli::try_parse_from(["bucketsort", "--mode", "coordinator", "100"]).unwrap();
        let err = SortConfig::from_cli(&cli).unwrap_err();
        assert_eq!(err.downcast_ref::<UsageError>(), Some(&UsageError::NoHosts));
    }
}
