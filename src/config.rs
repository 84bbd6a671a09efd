//! Configuration for cinedeck
//!
//! Startup configuration is resolved once (defaults, then the optional config
//! file, then environment variables) and passed explicitly to constructors.
//! Config is read from ~/.config/cinedeck/config.toml unless a path is given.
//! It is never written back.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::api::tmdb::TMDB_BASE_URL;

const DEFAULT_DISPLAY_NAME: &str = "Movie Database";
const DEFAULT_SUBTITLE_URL: &str = "http://localhost:3001";
const DEFAULT_PLAYER_URL: &str = "https://vidlink.pro";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("TMDB API key missing (set TMDB_API_KEY or tmdb_api_key in {0})")]
    MissingApiKey(String),

    #[error("Could not read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Optional settings as they appear in the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Site name shown in headers
    pub display_name: Option<String>,
    /// TMDB API key
    pub tmdb_api_key: Option<String>,
    /// TMDB API base URL
    pub tmdb_base_url: Option<String>,
    /// Subtitle service base URL
    pub subtitle_service_url: Option<String>,
    /// Embedded player base URL
    pub player_base_url: Option<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Default config file path (~/.config/cinedeck/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cinedeck").join("config.toml"))
    }

    /// Load a config file. A missing default file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        let contents = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

/// Resolved, immutable application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub display_name: String,
    #[serde(skip_serializing)]
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub subtitle_service_url: String,
    pub player_base_url: String,
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load config from file and process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = ConfigFile::load(path)?;
        let origin = path
            .map(|p| p.display().to_string())
            .or_else(|| ConfigFile::default_path().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "config.toml".to_string());
        Self::resolve(file, |key| std::env::var(key).ok(), &origin)
    }

    /// Merge file settings with environment lookups; environment wins.
    ///
    /// Environment keys:
    /// - `TMDB_API_KEY`
    /// - `CINEDECK_SITE_NAME`
    /// - `CINEDECK_SUBTITLE_URL`
    /// - `CINEDECK_PLAYER_URL`
    pub fn resolve<F>(file: ConfigFile, env: F, origin: &str) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let tmdb_api_key = env("TMDB_API_KEY")
            .or(file.tmdb_api_key)
            .ok_or_else(|| ConfigError::MissingApiKey(origin.to_string()))?;

        Ok(Self {
            display_name: env("CINEDECK_SITE_NAME")
                .or(file.display_name)
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
            tmdb_api_key,
            tmdb_base_url: file
                .tmdb_base_url
                .unwrap_or_else(|| TMDB_BASE_URL.to_string()),
            subtitle_service_url: env("CINEDECK_SUBTITLE_URL")
                .or(file.subtitle_service_url)
                .unwrap_or_else(|| DEFAULT_SUBTITLE_URL.to_string()),
            player_base_url: env("CINEDECK_PLAYER_URL")
                .or(file.player_base_url)
                .unwrap_or_else(|| DEFAULT_PLAYER_URL.to_string()),
            request_timeout_secs: file
                .request_timeout_secs
                .filter(|s| *s > 0)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_env_key() {
        let config =
            Config::resolve(ConfigFile::default(), env_of(&[("TMDB_API_KEY", "abc")]), "t")
                .unwrap();
        assert_eq!(config.tmdb_api_key, "abc");
        assert_eq!(config.display_name, "Movie Database");
        assert_eq!(config.tmdb_base_url, TMDB_BASE_URL);
        assert_eq!(config.player_base_url, "https://vidlink.pro");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_missing_api_key() {
        let err = Config::resolve(ConfigFile::default(), env_of(&[]), "cfg.toml").unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey(_)));
        assert!(err.to_string().contains("cfg.toml"));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = ConfigFile::parse(
            r#"
            display_name = "Filmxana"
            tmdb_api_key = "from-file"
            subtitle_service_url = "http://subs.local"
            request_timeout_secs = 10
            "#,
        )
        .unwrap();

        let config = Config::resolve(
            file,
            env_of(&[
                ("CINEDECK_SITE_NAME", "Override"),
                ("CINEDECK_SUBTITLE_URL", ""),
            ]),
            "t",
        )
        .unwrap();

        assert_eq!(config.display_name, "Override");
        assert_eq!(config.tmdb_api_key, "from-file");
        // Blank env values fall through to the file
        assert_eq!(config.subtitle_service_url, "http://subs.local");
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn test_explicit_missing_file_errors() {
        let err = ConfigFile::load(Some(Path::new("/nonexistent/cinedeck.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
