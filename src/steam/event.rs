//! Asynchronous SDK notifications forwarded to scripts.

use std::fmt;

/// A notification delivered by the SDK while its callback queue is drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SteamEvent {
    /// Current stats and achievements arrived from the backend.
    UserStatsReceived,
    /// A stats upload finished.
    UserStatsStored,
    /// An achievement unlock was stored.
    AchievementStored,
    /// Trophy files were installed (PS3 builds of the SDK only).
    Ps3TrophiesInstalled,
}

impl SteamEvent {
    /// All notification kinds, in declaration order.
    pub const ALL: [SteamEvent; 4] = [
        SteamEvent::UserStatsReceived,
        SteamEvent::UserStatsStored,
        SteamEvent::AchievementStored,
        SteamEvent::Ps3TrophiesInstalled,
    ];

    /// The event name passed to the script listener.
    pub fn name(self) -> &'static str {
        match self {
            SteamEvent::UserStatsReceived => "OnUserStatsReceived",
            SteamEvent::UserStatsStored => "OnUserStatsStored",
            SteamEvent::AchievementStored => "OnAchievementStored",
            SteamEvent::Ps3TrophiesInstalled => "OnPS3TrophiesInstalled",
        }
    }
}

impl fmt::Display for SteamEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(SteamEvent::UserStatsReceived.name(), "OnUserStatsReceived");
        assert_eq!(SteamEvent::UserStatsStored.name(), "OnUserStatsStored");
        assert_eq!(SteamEvent::AchievementStored.name(), "OnAchievementStored");
        assert_eq!(SteamEvent::Ps3TrophiesInstalled.name(), "OnPS3TrophiesInstalled");
    }

    #[test]
    fn test_display_matches_name() {
        for event in SteamEvent::ALL {
            assert_eq!(event.to_string(), event.name());
        }
    }
}
