//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! The configuration layer plays the role of the "config reader" that
//! reflog appends consult for a default identity. It has two scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. Environment variables (identity only, see [`Actor::from_config`])
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$REFLOG_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/reflog/config.toml`
//! 3. `~/.reflog/config.toml`
//!
//! # Repo Config Location
//!
//! `<common_dir>/reflog/config.toml`
//!
//! [`Actor::from_config`]: crate::core::actor::Actor::from_config
//!
//! # Example
//!
//! ```no_run
//! use reflog::core::config::{Config, ConfigReader};
//!
//! let config = Config::load(None).unwrap();
//! if let Some(name) = config.get_value("user", "name") {
//!     println!("appending as {name}");
//! }
//! ```

pub mod schema;

pub use schema::{ConfigFile, ReadConfig, UserConfig};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::core::paths::RepoPaths;

/// Initial backward window when none is configured.
pub const DEFAULT_READ_WINDOW: usize = 4096;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("no identity configured: set {0} or pass an explicit actor")]
    MissingIdentity(&'static str),
}

/// Source of `section.key` configuration values.
///
/// Identity resolution only needs `user.name` and `user.email`, so any
/// key/value store can stand in for a full configuration layer.
pub trait ConfigReader {
    /// Look up a single value, returning `None` when it is not set.
    fn get_value(&self, section: &str, key: &str) -> Option<String>;
}

impl ConfigReader for HashMap<String, String> {
    fn get_value(&self, section: &str, key: &str) -> Option<String> {
        self.get(&format!("{section}.{key}")).cloned()
    }
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence rules automatically: repo config overrides
/// global config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: ConfigFile,
    /// Repository configuration (if in a repo)
    pub repo: Option<ConfigFile>,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
    /// Path to the repo config file (if loaded)
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `paths` is provided, also loads the repo-specific config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed.
    /// Missing config files are not an error (defaults are used).
    pub fn load(paths: Option<&RepoPaths>) -> Result<Config, ConfigError> {
        let global_path = Self::find_global();
        let repo_path = paths.map(|p| p.repo_config_path());
        Self::load_from(global_path.as_deref(), repo_path.as_deref())
    }

    /// Load configuration from explicit file locations.
    ///
    /// Paths that do not exist are skipped.
    pub fn load_from(global: Option<&Path>, repo: Option<&Path>) -> Result<Config, ConfigError> {
        let (global, global_path) = match global.filter(|p| p.exists()) {
            Some(path) => (Self::read_config(path)?, Some(path.to_path_buf())),
            None => (ConfigFile::default(), None),
        };
        let (repo, repo_path) = match repo.filter(|p| p.exists()) {
            Some(path) => (Some(Self::read_config(path)?), Some(path.to_path_buf())),
            None => (None, None),
        };

        global.validate()?;
        if let Some(ref r) = repo {
            r.validate()?;
        }

        debug!(
            global = ?global_path,
            repo = ?repo_path,
            "loaded configuration"
        );

        Ok(Config {
            global,
            repo,
            global_path,
            repo_path,
        })
    }

    /// Locate the global config file, if any exists.
    fn find_global() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("REFLOG_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("reflog/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".reflog/config.toml"))
            .filter(|path| path.exists())
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Get the configured user name.
    pub fn user_name(&self) -> Option<&str> {
        self.pick(|c| c.user.as_ref().and_then(|u| u.name.as_deref()))
    }

    /// Get the configured user email.
    pub fn user_email(&self) -> Option<&str> {
        self.pick(|c| c.user.as_ref().and_then(|u| u.email.as_deref()))
    }

    /// Initial backward window for tail lookups.
    ///
    /// Defaults to [`DEFAULT_READ_WINDOW`] if not configured.
    pub fn read_window(&self) -> usize {
        self.pick(|c| c.read.as_ref().and_then(|r| r.window))
            .unwrap_or(DEFAULT_READ_WINDOW)
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }

    /// Repo value if set, else global value.
    fn pick<'a, T>(&'a self, get: impl Fn(&'a ConfigFile) -> Option<T>) -> Option<T> {
        self.repo.as_ref().and_then(&get).or_else(|| get(&self.global))
    }
}

impl ConfigReader for Config {
    fn get_value(&self, section: &str, key: &str) -> Option<String> {
        match (section, key) {
            ("user", "name") => self.user_name().map(str::to_string),
            ("user", "email") => self.user_email().map(str::to_string),
            ("read", "window") => Some(self.read_window().to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_paths(temp: &TempDir) -> RepoPaths {
        let git_dir = temp.path().join(".git");
        RepoPaths::new(git_dir.clone(), git_dir)
    }

    #[test]
    fn load_missing_files_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(
            Some(temp.path().join("nope.toml").as_path()),
            Some(temp.path().join("also-nope.toml").as_path()),
        )
        .unwrap();

        assert!(config.user_name().is_none());
        assert_eq!(config.read_window(), DEFAULT_READ_WINDOW);
        assert!(config.global_config_loaded_from().is_none());
        assert!(config.repo_config_loaded_from().is_none());
    }

    #[test]
    fn load_global_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [user]
            name = "Global User"
            email = "global@example.com"
            "#,
        )
        .unwrap();

        let config = Config::load_from(Some(path.as_path()), None).unwrap();
        assert_eq!(config.user_name(), Some("Global User"));
        assert_eq!(
            config.get_value("user", "email").as_deref(),
            Some("global@example.com")
        );
        assert_eq!(config.global_config_loaded_from(), Some(path.as_path()));
    }

    #[test]
    fn repo_overrides_global() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("global.toml");
        let repo = temp.path().join("repo.toml");
        fs::write(
            &global,
            "[user]\nname = \"Global\"\nemail = \"g@example.com\"\n",
        )
        .unwrap();
        fs::write(&repo, "[user]\nname = \"Repo\"\n\n[read]\nwindow = 64\n").unwrap();

        let config = Config::load_from(Some(global.as_path()), Some(repo.as_path())).unwrap();
        assert_eq!(config.user_name(), Some("Repo"));
        assert_eq!(config.user_email(), Some("g@example.com"));
        assert_eq!(config.read_window(), 64);
    }

    #[test]
    fn invalid_identity_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[user]\nname = \"a <b>\"\n").unwrap();

        assert!(matches!(
            Config::load_from(Some(path.as_path()), None),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn parse_error_names_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[user\n").unwrap();

        let err = Config::load_from(Some(path.as_path()), None).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn load_reads_repo_config_under_common_dir() {
        let temp = TempDir::new().unwrap();
        let paths = test_paths(&temp);
        let path = paths.repo_config_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[user]\nname = \"Repo\"\n\n[read]\nwindow = 128\n").unwrap();

        let config = Config::load(Some(&paths)).unwrap();
        assert_eq!(config.user_name(), Some("Repo"));
        assert_eq!(config.read_window(), 128);
        assert_eq!(config.repo_config_loaded_from(), Some(path.as_path()));
    }

    #[test]
    fn hashmap_reader() {
        let map = HashMap::from([("user.name".to_string(), "Map".to_string())]);
        assert_eq!(map.get_value("user", "name").as_deref(), Some("Map"));
        assert_eq!(map.get_value("user", "email"), None);
    }
}
