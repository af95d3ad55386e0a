use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dispatch::CommandTemplate;
use crate::error::ConfigError;
use crate::retry::RetryPolicy;

/// Worker command used when the config file does not name one.
pub const DEFAULT_COMMAND: &str = "cat \"$BUFFER\" | subd -t \"$TEMPLATE\" -i \"Read stdin chunk report and output only: (1) one concise summary sentence, (2) one comma-separated list of unique glossary keywords. $INSTRUCTIONS\"";

/// Per-run defaults (`[defaults]` in config.toml). CLI flags override these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Lines per chunk.
    pub chunk_lines: usize,
    /// Maximum number of chunks in flight.
    pub concurrency: usize,
    /// Template/profile name passed to the worker as `$TEMPLATE`.
    pub template: String,
    /// Free-text instructions passed to the worker as `$INSTRUCTIONS`.
    pub instructions: String,
    /// Retries after the first attempt (0 = single attempt).
    pub max_retries: u32,
    /// Base backoff delay in milliseconds; doubles on every retry.
    pub backoff_ms: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            chunk_lines: 100,
            concurrency: 10,
            template: "chunker".to_string(),
            instructions: String::new(),
            max_retries: 3,
            backoff_ms: 500,
        }
    }
}

/// Filesystem locations (`[paths]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// Root for per-run chunk and output directories. Defaults to the XDG cache dir.
    pub work_dir: Option<PathBuf>,
}

/// Worker invocation (`[subagent]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Subagent {
    /// Shell command template with `$BUFFER`, `$TEMPLATE` and `$INSTRUCTIONS` placeholders.
    pub command: String,
}

impl Default for Subagent {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/pllm/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PllmConfig {
    pub defaults: Defaults,
    pub paths: Paths,
    pub subagent: Subagent,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pllm")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Default root for run directories: `~/.cache/pllm/work`.
pub fn default_work_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pllm")?;
    Ok(xdg_dirs.get_cache_home().join("work"))
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PllmConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PllmConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    Ok(load_from_path(&path)?)
}

/// Load configuration from an explicit path. The file must exist.
pub fn load_from_path(path: &Path) -> Result<PllmConfig, ConfigError> {
    let data = fs::read_to_string(path)
        .map_err(|_| ConfigError::MissingConfigFile(path.to_path_buf()))?;
    toml::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Values given on the command line; `None` falls back to the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub chunk_lines: Option<usize>,
    pub concurrency: Option<usize>,
    pub template: Option<String>,
    pub instructions: Option<String>,
    pub max_retries: Option<u32>,
    pub backoff_ms: Option<u64>,
    pub command: Option<String>,
    pub work_dir: Option<PathBuf>,
}

/// Fully resolved and validated parameters for one run.
#[derive(Debug, Clone)]
pub struct RunParams {
    pub chunk_lines: usize,
    pub concurrency: usize,
    pub template: String,
    pub instructions: String,
    pub retry: RetryPolicy,
    pub command: CommandTemplate,
    pub work_dir: PathBuf,
}

impl RunParams {
    /// Merge overrides onto the config and validate. `default_work_dir` is
    /// used only when neither the overrides nor the config name a work dir.
    pub fn resolve(
        cfg: &PllmConfig,
        overrides: RunOverrides,
        default_work_dir: PathBuf,
    ) -> Result<Self, ConfigError> {
        let d = &cfg.defaults;
        let chunk_lines = overrides.chunk_lines.unwrap_or(d.chunk_lines);
        if chunk_lines == 0 {
            return Err(ConfigError::InvalidChunkLines(chunk_lines));
        }
        let concurrency = overrides.concurrency.unwrap_or(d.concurrency);
        if concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(concurrency));
        }
        let backoff_ms = overrides.backoff_ms.unwrap_or(d.backoff_ms);
        if backoff_ms == 0 {
            return Err(ConfigError::InvalidBackoff(backoff_ms));
        }
        let command = overrides
            .command
            .unwrap_or_else(|| cfg.subagent.command.clone());
        if command.trim().is_empty() {
            return Err(ConfigError::EmptyCommand);
        }
        let work_dir = overrides
            .work_dir
            .or_else(|| cfg.paths.work_dir.clone())
            .unwrap_or(default_work_dir);

        Ok(Self {
            chunk_lines,
            concurrency,
            template: overrides.template.unwrap_or_else(|| d.template.clone()),
            instructions: overrides
                .instructions
                .unwrap_or_else(|| d.instructions.clone()),
            retry: RetryPolicy {
                max_retries: overrides.max_retries.unwrap_or(d.max_retries),
                base_delay: Duration::from_millis(backoff_ms),
            },
            command: CommandTemplate::new(command),
            work_dir,
        })
    }
}
