use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LogVaultError, Result};
use crate::query::DEFAULT_QUERY_LIMIT;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub http_addr: String,
    pub batch_size: usize,
    pub ingest_parallelism: usize,
    pub batch_timeout: Duration,
    pub query_default_limit: usize,
    pub ai_endpoint: Option<String>,
    pub ai_api_key: Option<String>,
    pub ai_model: String,
}

impl Default for Config {
    fn default() -> Self {
        let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let data_root = env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(home).join(".local/share"));

        Self {
            db_path: data_root.join("logvault/logvault.duckdb"),
            http_addr: "127.0.0.1:8686".to_string(),
            batch_size: 5000,
            ingest_parallelism: 4,
            batch_timeout: Duration::from_secs(30),
            query_default_limit: DEFAULT_QUERY_LIMIT,
            ai_endpoint: None,
            ai_api_key: None,
            ai_model: "gpt-4o-mini".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();
        let config_path = config_file_path();
        if let Some(file_overrides) = load_file_overrides(&config_path)? {
            apply_overrides(&mut cfg, file_overrides, "config file")?;
        }
        let env_overrides = load_env_overrides()?;
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        Ok(cfg)
    }

    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        let env_overrides = load_env_overrides()?;
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        Ok(cfg)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigOverrides {
    db_path: Option<PathBuf>,
    http_addr: Option<String>,
    batch_size: Option<usize>,
    ingest_parallelism: Option<usize>,
    batch_timeout: Option<String>,
    query_default_limit: Option<usize>,
    ai_endpoint: Option<String>,
    ai_api_key: Option<String>,
    ai_model: Option<String>,
}

fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var("LOGVAULT_CONFIG") {
        return PathBuf::from(path);
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home).join(".config"));
    config_home.join("logvault/config.toml")
}

fn load_file_overrides(path: &PathBuf) -> Result<Option<ConfigOverrides>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| LogVaultError::Config(format!("failed reading {}: {e}", path.display())))?;
    let parsed: ConfigOverrides = toml::from_str(&raw)
        .map_err(|e| LogVaultError::Config(format!("failed parsing {}: {e}", path.display())))?;
    Ok(Some(parsed))
}

fn load_env_overrides() -> Result<ConfigOverrides> {
    Ok(ConfigOverrides {
        db_path: env::var("LOGVAULT_DB_PATH").ok().map(PathBuf::from),
        http_addr: env::var("LOGVAULT_HTTP_ADDR").ok(),
        batch_size: parse_env_usize("LOGVAULT_BATCH_SIZE")?,
        ingest_parallelism: parse_env_usize("LOGVAULT_INGEST_PARALLELISM")?,
        batch_timeout: env::var("LOGVAULT_BATCH_TIMEOUT").ok(),
        query_default_limit: parse_env_usize("LOGVAULT_QUERY_DEFAULT_LIMIT")?,
        ai_endpoint: env::var("LOGVAULT_AI_ENDPOINT").ok(),
        ai_api_key: env::var("LOGVAULT_AI_API_KEY").ok(),
        ai_model: env::var("LOGVAULT_AI_MODEL").ok(),
    })
}

fn parse_env_usize(name: &str) -> Result<Option<usize>> {
    match env::var(name) {
        Ok(v) => v
            .parse::<usize>()
            .map(Some)
            .map_err(|e| LogVaultError::Config(format!("bad {name} in environment: {e}"))),
        Err(_) => Ok(None),
    }
}

fn apply_overrides(cfg: &mut Config, overrides: ConfigOverrides, source: &str) -> Result<()> {
    if let Some(v) = overrides.db_path {
        cfg.db_path = v;
    }
    if let Some(v) = overrides.http_addr {
        cfg.http_addr = v;
    }
    if let Some(v) = overrides.batch_size {
        if v == 0 {
            return Err(LogVaultError::Config(format!(
                "batch_size in {source} must be positive"
            )));
        }
        cfg.batch_size = v;
    }
    if let Some(v) = overrides.ingest_parallelism {
        if v == 0 {
            return Err(LogVaultError::Config(format!(
                "ingest_parallelism in {source} must be positive"
            )));
        }
        cfg.ingest_parallelism = v;
    }
    if let Some(v) = overrides.batch_timeout {
        cfg.batch_timeout = humantime::parse_duration(&v).map_err(|e| {
            LogVaultError::Config(format!("bad batch_timeout in {source}: {e} (value={v})"))
        })?;
    }
    if let Some(v) = overrides.query_default_limit {
        cfg.query_default_limit = v;
    }
    if let Some(v) = overrides.ai_endpoint {
        cfg.ai_endpoint = Some(v);
    }
    if let Some(v) = overrides.ai_api_key {
        cfg.ai_api_key = Some(v);
    }
    if let Some(v) = overrides.ai_model {
        cfg.ai_model = v;
    }
    Ok(())
}
