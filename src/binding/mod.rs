//! Lua binding for the Steamworks SDK.
//!
//! [`SteamworksModule`] registers the `steamworks` table. Calls flow into a
//! [`SteamAdapter`], which owns the SDK session; SDK notifications drained by
//! `steamworks.update()` flow out through the [`ListenerSlot`].

pub mod adapter;
pub mod extension;
pub mod listener;
pub mod module;

pub use adapter::{AchievementInfo, Identity, SteamAdapter, SubsystemHandles, UserInfo};
pub use extension::SteamworksExtension;
pub use listener::{notify_listener, DispatchOutcome, ListenerSlot};
pub use module::{SteamworksModule, MODULE_NAME};
