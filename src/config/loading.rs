//! Configuration loading from TOML files
//!
//! A configuration file is optional. Without one every setting takes its
//! default value; with one, missing keys still fall back to defaults.

use anyhow::Result;
use std::path::Path;

use super::types::Config;

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from the named file
    File(String),
    /// No file given, built-in defaults
    Defaults,
}

impl ConfigSource {
    /// Human-readable description for startup logging
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::File(path) => format!("config file '{}'", path),
            Self::Defaults => "built-in defaults".to_string(),
        }
    }
}

/// Load configuration from a TOML file and validate it
pub fn load_config(config_path: impl AsRef<Path>) -> Result<Config> {
    let config_path = config_path.as_ref();
    let config_content = std::fs::read_to_string(config_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to read config file '{}': {}",
            config_path.display(),
            e
        )
    })?;

    let config: Config = toml::from_str(&config_content).map_err(|e| {
        anyhow::anyhow!(
            "Failed to parse config file '{}': {}",
            config_path.display(),
            e
        )
    })?;

    config.validate()?;

    Ok(config)
}

/// Load configuration from `config_path` when given, defaults otherwise
pub fn load_config_with_fallback(config_path: Option<&Path>) -> Result<(Config, ConfigSource)> {
    match config_path {
        Some(path) => {
            let config = load_config(path)?;
            Ok((config, ConfigSource::File(path.display().to_string())))
        }
        None => Ok((Config::default(), ConfigSource::Defaults)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[articles]\nmessage_id_domain = \"example\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.articles.message_id_domain, "example");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = load_config("/nonexistent/newsgate.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[spool\nbroken").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_load_runs_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[spool]\nmax_age_days = 0").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_fallback_to_defaults() {
        let (config, source) = load_config_with_fallback(None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(source, ConfigSource::Defaults);
        assert_eq!(source.description(), "built-in defaults");
    }

    #[test]
    fn test_fallback_with_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let (_, source) = load_config_with_fallback(Some(file.path())).unwrap();
        assert!(matches!(source, ConfigSource::File(_)));
    }
}
