//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.chatdeck/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;

use crate::core::model::InputMode;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ChatdeckConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub latency: LatencyConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub input_mode: Option<InputMode>,
    pub seed_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LatencyConfig {
    pub query_ms: Option<u64>,
    pub reply_ms: Option<u64>,
    pub transcription_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub toast_secs: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_QUERY_MS: u64 = 500;
pub const DEFAULT_REPLY_MS: u64 = 1000;
pub const DEFAULT_TRANSCRIPTION_MS: u64 = 3000;
pub const DEFAULT_TOAST_SECS: u64 = 4;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub input_mode: InputMode,
    pub seed_file: Option<PathBuf>,
    pub query_delay: Duration,
    pub reply_delay: Duration,
    pub transcription_delay: Duration,
    pub toast_duration: Duration,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve_with(&ChatdeckConfig::default(), None, None, |_| None)
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.chatdeck/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".chatdeck").join("config.toml"))
}

/// Load config from `~/.chatdeck/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `ChatdeckConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<ChatdeckConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(ChatdeckConfig::default());
        }
    };
    load_config_from(&path)
}

fn load_config_from(path: &Path) -> Result<ChatdeckConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(ChatdeckConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ChatdeckConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# chatdeck configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# input_mode = "text"                # "text" or "audio"
# seed_file = "seed.json"            # JSON dataset replacing the built-in one

# [latency]
# query_ms = 500                     # Until the query shows up
# reply_ms = 1000                    # Until the simulated reply follows
# transcription_ms = 3000            # Length of a simulated recording

# [ui]
# toast_secs = 4                     # How long notifications stay visible
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_mode` and `cli_seed` are from CLI flags (None = not specified).
pub fn resolve(
    config: &ChatdeckConfig,
    cli_mode: Option<InputMode>,
    cli_seed: Option<&Path>,
) -> ResolvedConfig {
    resolve_with(config, cli_mode, cli_seed, |key| std::env::var(key).ok())
}

/// [`resolve`] with an injectable environment lookup.
fn resolve_with(
    config: &ChatdeckConfig,
    cli_mode: Option<InputMode>,
    cli_seed: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Input mode: CLI → env → config → default
    let input_mode = cli_mode
        .or_else(|| {
            env("CHATDECK_INPUT_MODE").and_then(|raw| match InputMode::from_str(&raw, true) {
                Ok(mode) => Some(mode),
                Err(_) => {
                    warn!("Ignoring CHATDECK_INPUT_MODE={raw:?}: expected text or audio");
                    None
                }
            })
        })
        .or(config.general.input_mode)
        .unwrap_or_default();

    // Seed file: CLI → env → config → built-in dataset
    let seed_file = cli_seed
        .map(Path::to_path_buf)
        .or_else(|| env("CHATDECK_SEED_FILE").map(PathBuf::from))
        .or_else(|| config.general.seed_file.as_ref().map(PathBuf::from));

    let millis = |key: &str, configured: Option<u64>, default: u64| {
        let ms = env(key)
            .and_then(|raw| match raw.trim().parse::<u64>() {
                Ok(ms) => Some(ms),
                Err(_) => {
                    warn!("Ignoring {key}={raw:?}: not a number of milliseconds");
                    None
                }
            })
            .or(configured)
            .unwrap_or(default);
        Duration::from_millis(ms)
    };

    ResolvedConfig {
        input_mode,
        seed_file,
        query_delay: millis("CHATDECK_QUERY_MS", config.latency.query_ms, DEFAULT_QUERY_MS),
        reply_delay: millis("CHATDECK_REPLY_MS", config.latency.reply_ms, DEFAULT_REPLY_MS),
        transcription_delay: millis(
            "CHATDECK_TRANSCRIPTION_MS",
            config.latency.transcription_ms,
            DEFAULT_TRANSCRIPTION_MS,
        ),
        toast_duration: Duration::from_secs(config.ui.toast_secs.unwrap_or(DEFAULT_TOAST_SECS)),
    }
}
