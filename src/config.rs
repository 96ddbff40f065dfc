// Client configuration. Values are layered: built-in defaults, then the
// TOML file in the user's config directory, then environment variables,
// then whatever the command line overrides.

use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_URL: &str = "http://localhost:7667/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const ENV_URL: &str = "CORIOLIS_URL";
pub const ENV_TOKEN: &str = "OS_AUTH_TOKEN";
pub const ENV_INSECURE: &str = "CORIOLIS_INSECURE";
pub const ENV_TIMEOUT: &str = "CORIOLIS_TIMEOUT";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the API, including the version and project segments.
    pub url: String,
    pub token: Option<String>,
    pub insecure: bool,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            url: DEFAULT_URL.to_owned(),
            token: None,
            insecure: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// On-disk shape of `config.toml`; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    url: Option<String>,
    token: Option<String>,
    insecure: Option<bool>,
    timeout: Option<u64>,
}

impl Config {
    /// Resolve the configuration from the default config file and the
    /// process environment.
    pub fn load() -> Result<Self> {
        let mut config = Config::default();
        let path = config_file_path();
        if path.exists() {
            config.merge_file(&path)?;
        }
        config.merge_env(|k| std::env::var(k).ok())?;
        if config.token.is_none() {
            config.token = load_token().ok();
        }
        Ok(config)
    }

    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        debug!("loading configuration from {}", path.display());
        let data = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;
        self.merge_toml(&data)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    fn merge_toml(&mut self, data: &str) -> Result<()> {
        let file: FileConfig = toml::from_str(data).map_err(|e| Error::Config(e.to_string()))?;
        if let Some(url) = file.url {
            self.url = url;
        }
        if file.token.is_some() {
            self.token = file.token;
        }
        if let Some(insecure) = file.insecure {
            self.insecure = insecure;
        }
        if let Some(timeout) = file.timeout {
            self.timeout_secs = timeout;
        }
        Ok(())
    }

    /// Apply environment overrides, reading variables through `lookup` so
    /// callers can substitute the environment.
    pub fn merge_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_URL).filter(|s| !s.is_empty()) {
            self.url = url;
        }
        if let Some(token) = lookup(ENV_TOKEN).filter(|s| !s.is_empty()) {
            self.token = Some(token);
        }
        if let Some(v) = lookup(ENV_INSECURE) {
            self.insecure = parse_bool(&v)
                .ok_or_else(|| Error::Config(format!("{ENV_INSECURE}: invalid value {v}")))?;
        }
        if let Some(v) = lookup(ENV_TIMEOUT) {
            self.timeout_secs = v
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("{ENV_TIMEOUT}: invalid value {v}")))?;
        }
        Ok(())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("coriolis")
}

pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

fn token_path() -> PathBuf {
    config_dir().join("token")
}

/// Persist a token into the user's config directory.
pub fn persist_token(token: &str) -> Result<PathBuf> {
    let path = token_path();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| Error::Io {
            path: dir.to_owned(),
            source,
        })?;
    }
    std::fs::write(&path, token).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Load a previously persisted token.
pub fn load_token() -> Result<String> {
    let path = token_path();
    let data = std::fs::read_to_string(&path).map_err(|source| Error::Io { path, source })?;
    let token = data.trim();
    if token.is_empty() {
        return Err(Error::Config("persisted token is empty".into()));
    }
    Ok(token.to_owned())
}
