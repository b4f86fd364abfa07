//! Test helpers for the Lua binding tests.
//!
//! Provides a Lua state with the `steamworks` module registered against a
//! simulated Steam client, plus a profile with known friends and achievements.

#![allow(dead_code)]

use mlua::{Lua, Table};

use steamworks_lua::config::{SimulatedAchievement, SimulatedFriend, SimulationConfig};
use steamworks_lua::{SimulatedSteam, SimulatedSteamHandle, SteamworksModule};

pub const LOCAL_ID: u64 = 76561197960287930;
pub const FRIEND_ID: u64 = 76561197960265729;

/// A Lua state with the module registered.
pub struct TestScript {
    pub lua: Lua,
    pub steam: SimulatedSteamHandle,
    pub module: SteamworksModule,
}

impl TestScript {
    /// Register the module against the default test profile.
    pub fn new() -> Self {
        Self::with_profile(test_profile())
    }

    pub fn with_profile(profile: SimulationConfig) -> Self {
        let lua = Lua::new();
        let backend = SimulatedSteam::new(&profile);
        let steam = backend.handle();
        let module = SteamworksModule::new(backend);
        module.register(&lua).unwrap();
        Self { lua, steam, module }
    }

    /// Run a chunk of Lua, panicking on error.
    pub fn exec(&self, source: &str) {
        self.lua.load(source).exec().unwrap();
    }

    /// Evaluate a Lua expression.
    pub fn eval<T: mlua::FromLuaMulti>(&self, source: &str) -> T {
        self.lua.load(source).eval().unwrap()
    }

    /// Call `steamworks.init()` and drain the stats-received notification it
    /// triggers, so tests start from an empty queue.
    pub fn init_and_settle(&self) {
        self.exec("steamworks.init() steamworks.update()");
        assert_eq!(self.steam.pending_events(), 0);
    }

    /// Install a listener that records `event` strings into the global
    /// `events` table.
    pub fn record_events(&self) {
        self.exec(
            r#"
            events = {}
            steamworks.set_listener(function(self, event)
                table.insert(events, event)
            end)
        "#,
        );
    }

    /// Events recorded by [`TestScript::record_events`].
    pub fn recorded_events(&self) -> Vec<String> {
        let events: Table = self.lua.globals().get("events").unwrap();
        events.sequence_values::<String>().map(|e| e.unwrap()).collect()
    }
}

/// A local user with one friend and two achievements.
pub fn test_profile() -> SimulationConfig {
    SimulationConfig {
        steam_running: true,
        user_id: LOCAL_ID,
        persona_name: "LocalPlayer".to_string(),
        steam_level: 15,
        achievements: vec![
            SimulatedAchievement {
                name: "ACH_WIN_ONE_GAME".to_string(),
                unlocked: true,
                unlock_time: 1_500_000_000,
            },
            SimulatedAchievement {
                name: "ACH_TRAVEL_FAR_ACCUM".to_string(),
                unlocked: false,
                unlock_time: 0,
            },
        ],
        friends: vec![SimulatedFriend {
            id: FRIEND_ID,
            name: "FriendPlayer".to_string(),
            steam_level: 42,
        }],
    }
}
