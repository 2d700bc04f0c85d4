use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::scan::RebuildMode;

pub const BOOKS_DIR_ENV: &str = "TUNEDB_BOOKS_DIR";
pub const DB_PATH_ENV: &str = "TUNEDB_DB";
pub const LOG_LEVEL_ENV: &str = "TUNEDB_LOG";

/// Contents of the optional TOML config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub books_dir: Option<String>,
    pub db_path: Option<String>,
    pub log_level: Option<String>,
    pub atomic_rebuild: Option<bool>,
}

/// Values given on the command line, all optional.
#[derive(Debug, Default)]
pub struct Overrides<'a> {
    pub config_file: Option<&'a str>,
    pub books_dir: Option<&'a str>,
    pub db_path: Option<&'a str>,
    pub log_level: Option<&'a str>,
    pub atomic_rebuild: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub books_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_level: LevelFilter,
    pub rebuild_mode: RebuildMode,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<ConfigFile> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        toml::from_str(&text).map_err(|e| {
            Error::Config(format!("invalid config file '{}': {}", path.display(), e))
        })
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

fn parse_log_level(value: &str) -> Result<LevelFilter> {
    value
        .parse::<LevelFilter>()
        .map_err(|_| Error::Config(format!("invalid log level '{}'", value)))
}

impl Config {
    /// Resolves every setting: command line first, then environment, then
    /// config file, then the built-in default.
    pub fn resolve(overrides: &Overrides) -> Result<Config> {
        let file = match overrides.config_file {
            Some(path) => ConfigFile::load(&expand_path(path))?,
            None => ConfigFile::default(),
        };

        Self::resolve_with(overrides, file, |key| env::var(key).ok())
    }

    fn resolve_with<F>(overrides: &Overrides, file: ConfigFile, env_var: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |cli: Option<&str>, env_key: &str, file_value: Option<String>, default: &str| {
            cli.map(String::from)
                .or_else(|| env_var(env_key))
                .or(file_value)
                .unwrap_or_else(|| default.to_string())
        };

        let books_dir = pick(overrides.books_dir, BOOKS_DIR_ENV, file.books_dir, "abc_books");
        let db_path = pick(overrides.db_path, DB_PATH_ENV, file.db_path, "tunes.db");
        let log_level = pick(overrides.log_level, LOG_LEVEL_ENV, file.log_level, "info");

        let atomic = overrides.atomic_rebuild || file.atomic_rebuild.unwrap_or(false);

        Ok(Config {
            books_dir: expand_path(&books_dir),
            db_path: expand_path(&db_path),
            log_level: parse_log_level(&log_level)?,
            rebuild_mode: if atomic {
                RebuildMode::Atomic
            } else {
                RebuildMode::PerFile
            },
        })
    }
}
