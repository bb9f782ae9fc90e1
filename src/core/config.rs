//! # Configuration
//!
//! Override hierarchy: defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.parley/config.toml`. If missing on first run, a
//! default is generated with every setting commented out except a single
//! "General" conversation, so a fresh start has something to select.

use chrono::{DateTime, Local};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::conversation::{ConversationId, ConversationSummary};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub conversations: Vec<ConversationEntry>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub greeting: Option<String>,
    pub log_file: Option<String>,
    pub download_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConversationEntry {
    pub id: Option<u64>,
    pub name: String,
    pub last_message: Option<String>,
    /// RFC 3339 string, e.g. `"2025-09-27T20:30:00-04:00"`.
    pub timestamp: Option<String>,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default)]
    pub online: bool,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/api/ai-response";
pub const DEFAULT_GREETING: &str = "Hello! I'm your AI assistant. How can I help you today?";
pub const DEFAULT_LOG_FILE: &str = "parley.log";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub endpoint: String,
    pub greeting: String,
    pub log_file: PathBuf,
    pub download_dir: PathBuf,
    pub conversations: Vec<ConversationSummary>,
}

/// Values supplied on the command line. `None` means "not given".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub endpoint: Option<String>,
    pub download_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
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

/// Returns the path to `~/.parley/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".parley").join("config.toml"))
}

/// Load config from `~/.parley/config.toml`.
///
/// Missing file: writes `DEFAULT_CONFIG` and returns its parsed contents.
/// Malformed file: `ConfigError::Parse`.
pub fn load_config() -> Result<ParleyConfig, ConfigError> {
    let Some(path) = config_path() else {
        warn!("Could not determine home directory, using default config");
        return Ok(ParleyConfig::default());
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return toml::from_str(DEFAULT_CONFIG).map_err(ConfigError::Parse);
    }

    load_config_from(&path)
}

/// Parse a config file at an explicit path.
pub fn load_config_from(path: &Path) -> Result<ParleyConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ParleyConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Contents written on first run.
pub const DEFAULT_CONFIG: &str = r#"# Parley Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# greeting = "Hello! I'm your AI assistant. How can I help you today?"
# log_file = "parley.log"
# download_dir = "~/Downloads"       # Or set PARLEY_DOWNLOAD_DIR

# [backend]
# endpoint = "http://127.0.0.1:5000/api/ai-response"   # Or set PARLEY_ENDPOINT

# The first conversation listed is selected at startup.
[[conversations]]
id = 1
name = "General"
last_message = "Awesome message search!"
timestamp = "2025-09-27T20:30:00-04:00"
unread_count = 2
online = true
"#;

fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Collapse defaults → config file → env vars → CLI into concrete values.
pub fn resolve(config: &ParleyConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Endpoint: CLI → env → config → default
    let endpoint = cli
        .endpoint
        .clone()
        .or_else(|| std::env::var("PARLEY_ENDPOINT").ok())
        .or_else(|| config.backend.endpoint.clone())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    // Download dir: CLI → env → config → platform download dir → cwd
    let download_dir = cli
        .download_dir
        .clone()
        .or_else(|| std::env::var("PARLEY_DOWNLOAD_DIR").ok().map(PathBuf::from))
        .or_else(|| config.general.download_dir.as_deref().map(expand_home))
        .or_else(dirs::download_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    let log_file = cli
        .log_file
        .clone()
        .or_else(|| config.general.log_file.as_deref().map(expand_home))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    let greeting = config
        .general
        .greeting
        .clone()
        .unwrap_or_else(|| DEFAULT_GREETING.to_string());

    ResolvedConfig {
        endpoint,
        greeting,
        log_file,
        download_dir,
        conversations: resolve_conversations(&config.conversations, Local::now()),
    }
}

/// Turn config entries into summaries. Missing ids take the next free
/// number; entries reusing an id are dropped.
pub fn resolve_conversations(
    entries: &[ConversationEntry],
    now: DateTime<Local>,
) -> Vec<ConversationSummary> {
    let mut seen = HashSet::new();
    let mut next_free = entries.iter().filter_map(|e| e.id).max().unwrap_or(0);
    let mut out = Vec::with_capacity(entries.len());

    for entry in entries {
        let id = match entry.id {
            Some(id) => id,
            None => {
                next_free += 1;
                next_free
            }
        };
        if !seen.insert(id) {
            warn!("Duplicate conversation id {} ({}), skipping", id, entry.name);
            continue;
        }

        let timestamp = match entry.timestamp.as_deref() {
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(ts) => ts.with_timezone(&Local),
                Err(e) => {
                    warn!("Bad timestamp {:?} for {}: {}", raw, entry.name, e);
                    now
                }
            },
            None => now,
        };

        out.push(ConversationSummary {
            id: ConversationId(id),
            name: entry.name.clone(),
            last_message: entry.last_message.clone(),
            timestamp,
            unread_count: entry.unread_count,
            online: entry.online,
        });
    }
    out
}

/// Expands a leading `~/` to the home directory.
fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|h| h.join(rest))
            .unwrap_or_else(|| PathBuf::from(raw)),
        None => PathBuf::from(raw),
    }
}
