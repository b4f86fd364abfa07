//! Capability traits for the Steamworks SDK.
//!
//! The adapter never talks to the SDK directly. A backend hands out the three
//! subsystem interfaces it uses and drains the SDK's callback queue on demand.

use std::rc::Rc;

use super::event::SteamEvent;
use super::id::SteamId;

/// Achievement state as reported by the SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementStatus {
    /// Whether the achievement is unlocked.
    pub achieved: bool,
    /// Unlock time as a Unix timestamp (0 when locked).
    pub unlock_time: u32,
}

/// Identity interface (`ISteamUser`).
pub trait SteamUser {
    /// Steam ID of the logged-in user.
    fn steam_id(&self) -> SteamId;

    /// Steam level of the logged-in user.
    fn player_steam_level(&self) -> i32;
}

/// Social interface (`ISteamFriends`).
pub trait SteamFriends {
    /// Persona name of the logged-in user.
    fn persona_name(&self) -> String;

    /// Persona name of another user. Empty when the user is not known locally.
    fn friend_persona_name(&self, id: SteamId) -> String;

    /// Steam level of another user. Zero when not known locally.
    fn friend_steam_level(&self, id: SteamId) -> i32;
}

/// Stats interface (`ISteamUserStats`).
pub trait SteamUserStats {
    /// Ask the backend for the current user's stats and achievements.
    ///
    /// Completion is reported through [`SteamEvent::UserStatsReceived`].
    fn request_current_stats(&self) -> bool;

    /// Look up an achievement by API name.
    fn achievement_and_unlock_time(&self, name: &str) -> Option<AchievementStatus>;
}

/// The SDK runtime.
pub trait SteamBackend {
    /// Activate the SDK. Returns false when activation failed.
    fn init(&mut self) -> bool;

    /// Whether the Steam client process is running.
    fn is_steam_running(&self) -> bool;

    /// Drain pending callbacks, handing each one to `sink` in arrival order.
    fn run_callbacks(&mut self, sink: &mut dyn FnMut(SteamEvent));

    /// Deactivate the SDK.
    fn shutdown(&mut self);

    fn user(&self) -> Option<Rc<dyn SteamUser>>;

    fn friends(&self) -> Option<Rc<dyn SteamFriends>>;

    fn user_stats(&self) -> Option<Rc<dyn SteamUserStats>>;
}
