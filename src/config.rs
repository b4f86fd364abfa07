//! Configuration module for steamworks-lua.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, SteamworksError};

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/steamworks-lua.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Lua binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SteamworksConfig {
    /// Name of the global table the entry points are registered under.
    #[serde(default = "default_module_name")]
    pub module_name: String,
}

fn default_module_name() -> String {
    "steamworks".to_string()
}

impl Default for SteamworksConfig {
    fn default() -> Self {
        Self {
            module_name: default_module_name(),
        }
    }
}

/// Script host resource limits.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptConfig {
    /// Maximum number of instructions per host call (0 = unlimited).
    #[serde(default = "default_max_instructions")]
    pub max_instructions: u64,
    /// Maximum Lua memory in megabytes (0 = unlimited).
    #[serde(default = "default_max_memory_mb")]
    pub max_memory_mb: usize,
}

fn default_max_instructions() -> u64 {
    1_000_000
}

fn default_max_memory_mb() -> usize {
    16
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            max_instructions: default_max_instructions(),
            max_memory_mb: default_max_memory_mb(),
        }
    }
}

/// Frame loop configuration for the script harness.
#[derive(Debug, Clone, Deserialize)]
pub struct HarnessConfig {
    /// Number of frames to run.
    #[serde(default = "default_frames")]
    pub frames: u32,
    /// Simulated frame duration in milliseconds, passed to `update` as `dt`.
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,
}

fn default_frames() -> u32 {
    60
}

fn default_frame_interval() -> u64 {
    16
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            frames: default_frames(),
            frame_interval_ms: default_frame_interval(),
        }
    }
}

/// An achievement known to the simulated backend.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulatedAchievement {
    /// Achievement API name.
    pub name: String,
    #[serde(default)]
    pub unlocked: bool,
    /// Unix timestamp of the unlock; ignored while locked.
    #[serde(default)]
    pub unlock_time: u32,
}

/// A friend known to the simulated local user.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulatedFriend {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub steam_level: i32,
}

/// Simulated Steam profile.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Whether the Steam client counts as running.
    #[serde(default = "default_steam_running")]
    pub steam_running: bool,
    /// Steam ID of the local user.
    #[serde(default = "default_user_id")]
    pub user_id: u64,
    /// Persona name of the local user.
    #[serde(default = "default_persona_name")]
    pub persona_name: String,
    /// Steam level of the local user.
    #[serde(default = "default_steam_level")]
    pub steam_level: i32,
    #[serde(default)]
    pub achievements: Vec<SimulatedAchievement>,
    #[serde(default)]
    pub friends: Vec<SimulatedFriend>,
}

fn default_steam_running() -> bool {
    true
}

fn default_user_id() -> u64 {
    76561197960287930
}

fn default_persona_name() -> String {
    "Player".to_string()
}

fn default_steam_level() -> i32 {
    1
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steam_running: default_steam_running(),
            user_id: default_user_id(),
            persona_name: default_persona_name(),
            steam_level: default_steam_level(),
            achievements: Vec::new(),
            friends: Vec::new(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Lua binding configuration.
    #[serde(default)]
    pub steamworks: SteamworksConfig,
    /// Script host limits.
    #[serde(default)]
    pub script: ScriptConfig,
    /// Frame loop configuration.
    #[serde(default)]
    pub harness: HarnessConfig,
    /// Simulated backend profile.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(SteamworksError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| SteamworksError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `STEAMWORKS_LUA_LOG_LEVEL`: Override the log level
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("STEAMWORKS_LUA_LOG_LEVEL") {
            if !level.is_empty() {
                self.logging.level = level;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the module name is not a valid Lua identifier
    /// - the simulated user ID is zero
    pub fn validate(&self) -> Result<()> {
        if !is_lua_identifier(&self.steamworks.module_name) {
            return Err(SteamworksError::Config(format!(
                "module_name {:?} is not a valid Lua identifier",
                self.steamworks.module_name
            )));
        }
        if self.script.max_memory_mb > MAX_MEMORY_MB {
            return Err(SteamworksError::Config(format!(
                "script.max_memory_mb must be at most {}",
                MAX_MEMORY_MB
            )));
        }
        if self.simulation.user_id == 0 {
            return Err(SteamworksError::Config(
                "simulation.user_id must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Upper bound for `script.max_memory_mb` (1 TiB).
const MAX_MEMORY_MB: usize = 1024 * 1024;

fn is_lua_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
