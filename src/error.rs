//! Error types for steamworks-lua.

use thiserror::Error;

/// Common error type for the Steamworks binding.
#[derive(Error, Debug)]
pub enum SteamworksError {
    /// The Steam client is not running, so the SDK could not be activated.
    #[error("Steam is not running")]
    NotRunning,

    /// A subsystem interface needed by a query has not been acquired.
    ///
    /// This happens before `init()` succeeds and again after `final()`.
    #[error("{0} is nil")]
    MissingInterface(&'static str),

    /// An identifier that is not a decimal 64-bit Steam ID.
    #[error("invalid steam id: {0:?}")]
    InvalidSteamId(String),

    /// An entry-point argument of the wrong Lua type.
    #[error("{0}")]
    InvalidArgument(&'static str),

    /// The SDK has no achievement with the given API name.
    #[error("unknown achievement: {0}")]
    UnknownAchievement(String),

    /// An entry point that has no backing SDK call.
    #[error("{0} is not supported")]
    Unsupported(&'static str),

    /// Script host error.
    #[error("script error: {0}")]
    Script(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SteamworksError> for mlua::Error {
    fn from(e: SteamworksError) -> Self {
        mlua::Error::RuntimeError(e.to_string())
    }
}

/// Result type alias for steamworks-lua operations.
pub type Result<T> = std::result::Result<T, SteamworksError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_running_display() {
        assert_eq!(SteamworksError::NotRunning.to_string(), "Steam is not running");
    }

    #[test]
    fn test_missing_interface_display() {
        let err = SteamworksError::MissingInterface("steamUserStats");
        assert_eq!(err.to_string(), "steamUserStats is nil");
    }

    #[test]
    fn test_invalid_steam_id_display() {
        let err = SteamworksError::InvalidSteamId("abc".to_string());
        assert_eq!(err.to_string(), "invalid steam id: \"abc\"");
    }

    #[test]
    fn test_invalid_argument_display() {
        let err = SteamworksError::InvalidArgument("achievement id must be a string");
        assert_eq!(err.to_string(), "achievement id must be a string");
    }

    #[test]
    fn test_unsupported_display() {
        let err = SteamworksError::Unsupported("get_stat_value");
        assert_eq!(err.to_string(), "get_stat_value is not supported");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SteamworksError = io_err.into();
        assert!(matches!(err, SteamworksError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_into_lua_error() {
        let err: mlua::Error = SteamworksError::NotRunning.into();
        match err {
            mlua::Error::RuntimeError(msg) => assert_eq!(msg, "Steam is not running"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
