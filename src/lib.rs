//! steamworks-lua - Steamworks bindings for embedded Lua.
//!
//! Exposes achievements, stats and identity queries to scripts as a
//! `steamworks` table, and forwards SDK notifications to a script listener
//! each time the host pumps `steamworks.update()`.

pub mod binding;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod steam;

pub use binding::{
    AchievementInfo, DispatchOutcome, ListenerSlot, SteamAdapter, SteamworksExtension,
    SteamworksModule, UserInfo,
};
pub use config::Config;
pub use error::{Result, SteamworksError};
pub use host::{Extension, FrameRunner, ScriptHost, ScriptInstance};
pub use steam::{SimulatedSteam, SimulatedSteamHandle, SteamBackend, SteamEvent, SteamId};
