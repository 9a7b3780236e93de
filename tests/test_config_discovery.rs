//! Config discovery from the process working directory
//!
//! These tests change the CWD and therefore run serially.

use procward::{CliArgs, Config, ConfigSource, LogFormat};
use serial_test::serial;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Restores the working directory when dropped.
struct CwdGuard(std::path::PathBuf);

impl CwdGuard {
    fn enter(dir: &Path) -> Result<Self> {
        let previous = std::env::current_dir()?;
        std::env::set_current_dir(dir)?;
        Ok(Self(previous))
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.0);
    }
}

#[test]
#[serial]
fn test_discover_uses_current_directory() -> Result<()> {
    let temp = TempDir::new()?;
    fs::create_dir(temp.path().join(".git"))?;
    fs::create_dir(temp.path().join(".procward"))?;
    fs::write(
        temp.path().join(".procward").join("config.toml"),
        "[runner]\nraise_priority = true\n\n[logging]\nverbose = true\nformat = \"json\"\n",
    )?;
    let nested = temp.path().join("src").join("deep");
    fs::create_dir_all(&nested)?;

    let _guard = CwdGuard::enter(&nested)?;
    let config = Config::discover(&CliArgs::default())?;

    assert!(config.runner.raise_priority);
    assert!(config.logging.verbose);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert!(matches!(
        config.source_of("logging.verbose"),
        Some(ConfigSource::ConfigFile(_))
    ));
    Ok(())
}

#[test]
#[serial]
fn test_explicit_config_path_skips_discovery() -> Result<()> {
    let temp = TempDir::new()?;
    fs::create_dir(temp.path().join(".git"))?;
    let explicit = temp.path().join("custom.toml");
    fs::write(&explicit, "[runner]\ndefault_timeout_ms = 42\n")?;

    let _guard = CwdGuard::enter(temp.path())?;
    let cli = CliArgs {
        config_path: Some(explicit.clone()),
        ..CliArgs::default()
    };
    let config = Config::discover(&cli)?;

    assert_eq!(config.runner.default_timeout_ms, 42);
    assert_eq!(config.config_path.as_deref(), Some(explicit.as_path()));
    Ok(())
}
