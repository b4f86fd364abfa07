//! Steamworks SDK surface used by the Lua binding.
//!
//! The SDK is reached only through the [`SteamBackend`] trait, so the binding
//! runs unchanged against the real client library or the in-process
//! [`SimulatedSteam`].

pub mod backend;
pub mod event;
pub mod id;
pub mod simulated;

pub use backend::{AchievementStatus, SteamBackend, SteamFriends, SteamUser, SteamUserStats};
pub use event::SteamEvent;
pub use id::SteamId;
pub use simulated::{SimulatedSteam, SimulatedSteamHandle};
