use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::model::TomlConfig;
use super::{CliArgs, Config, ConfigSource, LogFormat};

/// Directory holding the config file, relative to a project directory.
const CONFIG_DIR: &str = ".procward";
const CONFIG_FILE: &str = "config.toml";

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// Uses the current working directory for config file discovery when no
    /// explicit path is given in `cli_args`.
    pub fn discover(cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let start_dir = std::env::current_dir().map_err(|e| ConfigError::DiscoveryFailed {
            reason: format!("failed to get current directory: {e}"),
        })?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory
    ///
    /// Path-driven variant of [`discover`](Self::discover) that does not touch
    /// process-global state.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let config_path = match &cli_args.config_path {
            Some(explicit) => {
                if !explicit.is_file() {
                    return Err(ConfigError::NotFound {
                        path: explicit.display().to_string(),
                    });
                }
                Some(explicit.clone())
            }
            None => Self::discover_config_file_from(start_dir),
        };

        if let Some(path) = &config_path {
            let file_config = load_config_file(path)
                .map_err(|e| ConfigError::InvalidFile(format!("{e:#}")))?;
            config.apply_file(file_config, path)?;
            config.config_path = Some(path.clone());
        }

        config.apply_cli(cli_args)?;
        config.validate()?;
        Ok(config)
    }

    /// Search upward from `start_dir` for `.procward/config.toml`
    ///
    /// The search stops at the filesystem root or at the first repository root
    /// (`.git`, `.hg`, `.svn`), whichever comes first.
    #[must_use]
    pub fn discover_config_file_from(start_dir: &Path) -> Option<PathBuf> {
        for dir in start_dir.ancestors() {
            let candidate = dir.join(CONFIG_DIR).join(CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            if [".git", ".hg", ".svn"]
                .iter()
                .any(|marker| dir.join(marker).exists())
            {
                break;
            }
        }
        None
    }

    fn apply_file(&mut self, file: TomlConfig, path: &Path) -> Result<(), ConfigError> {
        let source = ConfigSource::ConfigFile(path.to_path_buf());

        if let Some(runner) = file.runner {
            if let Some(timeout) = runner.default_timeout_ms {
                self.runner.default_timeout_ms = timeout;
                self.set_source("runner.default_timeout_ms", source.clone());
            }
            if let Some(raise) = runner.raise_priority {
                self.runner.raise_priority = raise;
                self.set_source("runner.raise_priority", source.clone());
            }
        }

        if let Some(logging) = file.logging {
            if let Some(verbose) = logging.verbose {
                self.logging.verbose = verbose;
                self.set_source("logging.verbose", source.clone());
            }
            if let Some(format) = logging.format {
                self.logging.format = format.parse::<LogFormat>()?;
                self.set_source("logging.format", source);
            }
        }
        Ok(())
    }

    fn apply_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(timeout) = cli.timeout_ms {
            self.runner.default_timeout_ms = timeout;
            self.set_source("runner.default_timeout_ms", ConfigSource::Cli);
        }
        if let Some(raise) = cli.raise_priority {
            self.runner.raise_priority = raise;
            self.set_source("runner.raise_priority", ConfigSource::Cli);
        }
        // A bare `false` from an absent flag must not mask the file's value.
        if cli.verbose == Some(true) {
            self.logging.verbose = true;
            self.set_source("logging.verbose", ConfigSource::Cli);
        }
        if let Some(format) = &cli.log_format {
            self.logging.format = format.parse::<LogFormat>()?;
            self.set_source("logging.format", ConfigSource::Cli);
        }
        Ok(())
    }
}

fn load_config_file(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: TomlConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let config_dir = dir.join(CONFIG_DIR);
        fs::create_dir_all(&config_dir).unwrap();
        let path = config_dir.join(CONFIG_FILE);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();

        let config = Config::discover_from(temp.path(), &CliArgs::default()).unwrap();
        assert_eq!(config.runner.default_timeout_ms, 10_000);
        assert!(!config.runner.raise_priority);
        assert!(!config.logging.verbose);
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(config.config_path.is_none());
        assert_eq!(
            config.source_of("runner.default_timeout_ms"),
            Some(&ConfigSource::Default)
        );
    }

    #[test]
    fn test_file_found_in_ancestor() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        let path = write_config(
            temp.path(),
            "[runner]\ndefault_timeout_ms = 2500\n\n[logging]\nformat = \"json\"\n",
        );
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let config = Config::discover_from(&nested, &CliArgs::default()).unwrap();
        assert_eq!(config.runner.default_timeout_ms, 2500);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
        assert_eq!(
            config.source_of("logging.format"),
            Some(&ConfigSource::ConfigFile(path))
        );
        assert_eq!(config.source_of("logging.verbose"), Some(&ConfigSource::Default));
    }

    #[test]
    fn test_discovery_stops_at_repository_root() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "[runner]\ndefault_timeout_ms = 1\n");
        let repo = temp.path().join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();

        assert!(Config::discover_config_file_from(&repo).is_none());
    }

    #[test]
    fn test_cli_overrides_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        write_config(
            temp.path(),
            "[runner]\ndefault_timeout_ms = 2500\nraise_priority = true\n\n[logging]\nverbose = true\n",
        );
        let cli = CliArgs {
            timeout_ms: Some(750),
            verbose: Some(false),
            log_format: Some("json".to_string()),
            ..CliArgs::default()
        };

        let config = Config::discover_from(temp.path(), &cli).unwrap();
        assert_eq!(config.runner.default_timeout_ms, 750);
        assert_eq!(config.source_of("runner.default_timeout_ms"), Some(&ConfigSource::Cli));
        assert!(config.runner.raise_priority);
        assert!(config.logging.verbose);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_explicit_missing_path_is_not_found() {
        let temp = TempDir::new().unwrap();
        let cli = CliArgs {
            config_path: Some(temp.path().join("missing.toml")),
            ..CliArgs::default()
        };
        assert!(matches!(
            Config::discover_from(temp.path(), &cli),
            Err(ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_toml_is_invalid_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        write_config(temp.path(), "[runner\ndefault_timeout_ms = ");

        match Config::discover_from(temp.path(), &CliArgs::default()) {
            Err(ConfigError::InvalidFile(message)) => {
                assert!(message.contains("Failed to parse TOML config file"));
            }
            other => panic!("Expected InvalidFile, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_field_is_invalid_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        write_config(temp.path(), "[runner]\ntimeout = 5\n");

        assert!(matches!(
            Config::discover_from(temp.path(), &CliArgs::default()),
            Err(ConfigError::InvalidFile(_))
        ));
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        write_config(temp.path(), "[logging]\nformat = \"xml\"\n");

        match Config::discover_from(temp.path(), &CliArgs::default()) {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "logging.format"),
            other => panic!("Expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_timeout_from_cli_rejected() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        let cli = CliArgs {
            timeout_ms: Some(0),
            ..CliArgs::default()
        };
        assert!(matches!(
            Config::discover_from(temp.path(), &cli),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        write_config(temp.path(), "# nothing configured yet\n");

        let config = Config::discover_from(temp.path(), &CliArgs::default()).unwrap();
        assert_eq!(config.runner.default_timeout_ms, crate::DEFAULT_TIMEOUT_MS);
        assert!(config.config_path.is_some());
    }
}
