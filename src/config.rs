//! Configuration management for Letterboxd Stats.
//!
//! Settings are read from a `config.toml` in the config folder, either the
//! platform default or the folder passed with `-c`. The configuration
//! follows a hierarchical approach:
//! 1. Environment variables (highest priority), optionally loaded from a
//!    `.env` file in the config folder
//! 2. Values from `config.toml`
//! 3. Application defaults
//!
//! The resulting [`Config`] is loaded once per run and never mutated.

use std::{
    env, fmt,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use crate::utils;

/// Directory name used below the platform config and data directories.
pub const APP_DIR: &str = "letterboxd_stats";

/// File name of the configuration document inside the config folder.
pub const CONFIG_FILE: &str = "config.toml";

/// Sub folder of the root folder holding the extracted export.
pub const EXPORTS_DIR: &str = "static";

pub const DEFAULT_POSTER_COLUMNS: u32 = 80;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "No config file found at {}. Add a config.toml in that folder or specify another folder with -c.",
        .0.display()
    )]
    NotFound(PathBuf),

    #[error("Cannot read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Missing required configuration key `{0}`")]
    MissingKey(&'static str),

    #[error("Invalid value `{value}` for environment variable {var}")]
    InvalidOverride { var: &'static str, value: String },

    #[error("Cannot determine the default {0} directory")]
    NoDirectory(&'static str),
}

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub root_folder: PathBuf,
    pub tmdb: TmdbConfig,
    pub letterboxd: LetterboxdConfig,
    pub cli: CliConfig,
}

#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub api_key: String,
    pub get_list_runtimes: bool,
}

#[derive(Clone, Default)]
pub struct LetterboxdConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

// Keeps the password out of debug logs.
impl fmt::Debug for LetterboxdConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LetterboxdConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub poster_columns: u32,
    pub ascending: bool,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    root_folder: Option<String>,
    #[serde(rename = "TMDB", default)]
    tmdb: RawTmdb,
    #[serde(rename = "Letterboxd", default)]
    letterboxd: RawLetterboxd,
    #[serde(rename = "CLI", default)]
    cli: RawCli,
}

#[derive(Debug, Default, Deserialize)]
struct RawTmdb {
    api_key: Option<String>,
    get_list_runtimes: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLetterboxd {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCli {
    poster_columns: Option<u32>,
    ascending: Option<bool>,
}

/// Raw values of the `LBSTATS_*` environment variables.
///
/// Kept separate from the process environment so parsing stays a pure
/// function of its inputs.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    pub root_folder: Option<String>,
    pub tmdb_api_key: Option<String>,
    pub get_list_runtimes: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub poster_columns: Option<String>,
    pub ascending: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            root_folder: env::var("LBSTATS_ROOT_FOLDER").ok(),
            tmdb_api_key: env::var("LBSTATS_TMDB_API_KEY").ok(),
            get_list_runtimes: env::var("LBSTATS_TMDB_GET_LIST_RUNTIMES").ok(),
            username: env::var("LBSTATS_USERNAME").ok(),
            password: env::var("LBSTATS_PASSWORD").ok(),
            poster_columns: env::var("LBSTATS_CLI_POSTER_COLUMNS").ok(),
            ascending: env::var("LBSTATS_CLI_ASCENDING").ok(),
        }
    }
}

/// Returns the platform config folder of the application.
///
/// - Linux: `~/.config/letterboxd_stats`
/// - macOS: `~/Library/Application Support/letterboxd_stats`
/// - Windows: `%APPDATA%/letterboxd_stats`
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or(ConfigError::NoDirectory("config"))
}

/// Root folder used when the config does not name one.
pub fn default_root_folder() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Loads environment variables from a `.env` file in the config folder.
///
/// A missing file is fine; a malformed one is logged and ignored so the
/// regular config file still decides.
pub fn load_env(folder: &Path) {
    let path = folder.join(".env");
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "no .env file");
        return;
    }

    match dotenv::from_path(&path) {
        Ok(()) => tracing::info!(path = %path.display(), "loaded .env file"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "cannot load .env file"),
    }
}

impl Config {
    /// Reads `config.toml` from `folder` and applies the process environment.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NotFound`] if the file does not exist
    /// - [`ConfigError::Io`] / [`ConfigError::Parse`] if it cannot be read or parsed
    /// - [`ConfigError::MissingKey`] if `TMDB.api_key` is absent
    pub async fn load(folder: &Path) -> Result<Self, ConfigError> {
        let path = folder.join(CONFIG_FILE);
        if !path.is_file() {
            return Err(ConfigError::NotFound(path));
        }

        tracing::info!(path = %path.display(), "loading configuration");
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;

        Self::from_toml(&content, &path, &EnvOverrides::from_env())
    }

    /// Builds the configuration from TOML text plus environment overrides.
    ///
    /// `source` is only used in error messages.
    pub fn from_toml(
        content: &str,
        source: &Path,
        overrides: &EnvOverrides,
    ) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: source.to_path_buf(),
            source: e,
        })?;

        let root_folder = overrides
            .root_folder
            .clone()
            .or(raw.root_folder)
            .filter(|s| !s.trim().is_empty())
            .map(|s| utils::expand_tilde(&s))
            .unwrap_or_else(default_root_folder);

        let api_key = overrides
            .tmdb_api_key
            .clone()
            .or(raw.tmdb.api_key)
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingKey("TMDB.api_key"))?;

        let get_list_runtimes = match &overrides.get_list_runtimes {
            Some(value) => parse_bool("LBSTATS_TMDB_GET_LIST_RUNTIMES", value)?,
            None => raw.tmdb.get_list_runtimes.unwrap_or(false),
        };

        let poster_columns = match &overrides.poster_columns {
            Some(value) => {
                value
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| ConfigError::InvalidOverride {
                        var: "LBSTATS_CLI_POSTER_COLUMNS",
                        value: value.clone(),
                    })?
            }
            None => raw.cli.poster_columns.unwrap_or(DEFAULT_POSTER_COLUMNS),
        };

        let ascending = match &overrides.ascending {
            Some(value) => parse_bool("LBSTATS_CLI_ASCENDING", value)?,
            None => raw.cli.ascending.unwrap_or(false),
        };

        let config = Config {
            root_folder,
            tmdb: TmdbConfig {
                api_key,
                get_list_runtimes,
            },
            letterboxd: LetterboxdConfig {
                username: overrides.username.clone().or(raw.letterboxd.username),
                password: overrides.password.clone().or(raw.letterboxd.password),
            },
            cli: CliConfig {
                poster_columns,
                ascending,
            },
        };

        tracing::debug!(?config, "configuration resolved");
        Ok(config)
    }

    /// Folder holding the extracted Letterboxd export.
    pub fn exports_folder(&self) -> PathBuf {
        self.root_folder.join(EXPORTS_DIR)
    }

    /// Letterboxd username and password, required for downloading the export.
    pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        let username = self
            .letterboxd
            .username
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or(ConfigError::MissingKey("Letterboxd.username"))?;
        let password = self
            .letterboxd
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::MissingKey("Letterboxd.password"))?;
        Ok((username, password))
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidOverride {
            var,
            value: value.to_string(),
        }),
    }
}
