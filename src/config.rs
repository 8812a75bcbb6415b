// Configuration file handling
//
// The rc file is a plain `key=value` list. Unknown keys are ignored and
// blank lines or lines starting with '#' are skipped.

use std::path::{Path, PathBuf};
use anyhow::{Context, Result};

const CONFIG_DIR: &str = ".senko";
const CONFIG_FILE: &str = "rc";
const DB_FILE: &str = "config.db";

/// Settings read from `~/.senko/rc`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    /// `data.location`: database file
    pub data_location: Option<PathBuf>,
    /// `export.dir`: where `senko export` writes files
    pub export_dir: Option<PathBuf>,
    /// `log.level`: default log filter when RUST_LOG is unset
    pub log_level: Option<String>,
}

impl Config {
    /// Home directory, honouring `HOME` first so tests can redirect it
    pub fn home_dir() -> Result<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            if !home.is_empty() {
                return Ok(PathBuf::from(home));
            }
        }
        dirs::home_dir().context("Could not determine home directory")
    }

    /// Directory holding the rc file and the default database
    pub fn config_dir() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join(CONFIG_DIR))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load the rc file, or defaults if it does not exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(Self::parse(&content, base))
    }

    /// Parse rc content; relative paths resolve against `base`
    pub fn parse(content: &str, base: &Path) -> Self {
        let mut config = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.trim() {
                "data.location" => config.data_location = Some(resolve(base, value)),
                "export.dir" => config.export_dir = Some(resolve(base, value)),
                "log.level" => config.log_level = Some(value.to_string()),
                other => log::debug!("Ignoring unknown config key '{}'", other),
            }
        }
        config
    }

    /// Database path: `data.location` or `~/.senko/config.db`
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.data_location {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join(DB_FILE)),
        }
    }

    /// Export directory: `export.dir` or the current directory
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn log_filter(&self) -> &str {
        self.log_level.as_deref().unwrap_or("warn")
    }
}

fn resolve(base: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_relative() {
        base.join(path)
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_keys() {
        let base = Path::new("/home/hr/.senko");
        let config = Config::parse(
            "# comment\ndata.location=./custom.db\nexport.dir=/tmp/exports\nlog.level=debug\n",
            base,
        );
        assert_eq!(config.data_location, Some(PathBuf::from("/home/hr/.senko/./custom.db")));
        assert_eq!(config.export_dir, Some(PathBuf::from("/tmp/exports")));
        assert_eq!(config.log_filter(), "debug");
    }

    #[test]
    fn test_parse_ignores_junk() {
        let config = Config::parse("nonsense\nfoo=bar\ndata.location=\n", Path::new("/"));
        assert_eq!(config, Config::default());
        assert_eq!(config.log_filter(), "warn");
        assert_eq!(config.export_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_database_path_uses_data_location() {
        let config = Config {
            data_location: Some(PathBuf::from("/data/senko.db")),
            ..Default::default()
        };
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/data/senko.db"));
    }
}
