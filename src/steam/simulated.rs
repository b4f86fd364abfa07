//! In-process stand-in for the Steamworks SDK.
//!
//! Serves the script harness and the test suite. The profile comes from
//! [`SimulationConfig`]; a [`SimulatedSteamHandle`] drives the backend from the
//! outside (queueing notifications, unlocking achievements, toggling whether
//! the client is running).

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use tracing::debug;

use super::backend::{AchievementStatus, SteamBackend, SteamFriends, SteamUser, SteamUserStats};
use super::event::SteamEvent;
use super::id::SteamId;
use crate::config::SimulationConfig;

#[derive(Debug, Clone)]
struct Profile {
    name: String,
    steam_level: i32,
}

#[derive(Debug)]
struct State {
    running: bool,
    active: bool,
    local_id: SteamId,
    local: Profile,
    friends: HashMap<SteamId, Profile>,
    achievements: HashMap<String, AchievementStatus>,
    pending: VecDeque<SteamEvent>,
    stats_requests: u32,
}

/// Simulated SDK runtime.
pub struct SimulatedSteam {
    state: Rc<RefCell<State>>,
}

/// Control handle for a [`SimulatedSteam`].
#[derive(Clone)]
pub struct SimulatedSteamHandle {
    state: Rc<RefCell<State>>,
}

/// Implements all three subsystem interfaces over the shared state.
struct SimulatedInterfaces {
    state: Rc<RefCell<State>>,
}

impl SimulatedSteam {
    /// Create a simulated backend from configuration.
    pub fn new(config: &SimulationConfig) -> Self {
        let friends = config
            .friends
            .iter()
            .map(|f| {
                (
                    SteamId::new(f.id),
                    Profile {
                        name: f.name.clone(),
                        steam_level: f.steam_level,
                    },
                )
            })
            .collect();
        let achievements = config
            .achievements
            .iter()
            .map(|a| {
                (
                    a.name.clone(),
                    AchievementStatus {
                        achieved: a.unlocked,
                        unlock_time: if a.unlocked { a.unlock_time } else { 0 },
                    },
                )
            })
            .collect();

        let state = State {
            running: config.steam_running,
            active: false,
            local_id: SteamId::new(config.user_id),
            local: Profile {
                name: config.persona_name.clone(),
                steam_level: config.steam_level,
            },
            friends,
            achievements,
            pending: VecDeque::new(),
            stats_requests: 0,
        };

        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Get a control handle sharing this backend's state.
    pub fn handle(&self) -> SimulatedSteamHandle {
        SimulatedSteamHandle {
            state: Rc::clone(&self.state),
        }
    }

    fn interfaces(&self) -> Option<Rc<SimulatedInterfaces>> {
        if !self.state.borrow().active {
            return None;
        }
        Some(Rc::new(SimulatedInterfaces {
            state: Rc::clone(&self.state),
        }))
    }
}

impl Default for SimulatedSteam {
    fn default() -> Self {
        Self::new(&SimulationConfig::default())
    }
}

impl SteamBackend for SimulatedSteam {
    fn init(&mut self) -> bool {
        let mut state = self.state.borrow_mut();
        let running = state.running;
        state.active = running;
        running
    }

    fn is_steam_running(&self) -> bool {
        self.state.borrow().running
    }

    fn run_callbacks(&mut self, sink: &mut dyn FnMut(SteamEvent)) {
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                if !state.active {
                    return;
                }
                state.pending.pop_front()
            };
            match next {
                Some(event) => sink(event),
                None => return,
            }
        }
    }

    fn shutdown(&mut self) {
        let mut state = self.state.borrow_mut();
        state.active = false;
        state.pending.clear();
    }

    fn user(&self) -> Option<Rc<dyn SteamUser>> {
        self.interfaces().map(|i| i as Rc<dyn SteamUser>)
    }

    fn friends(&self) -> Option<Rc<dyn SteamFriends>> {
        self.interfaces().map(|i| i as Rc<dyn SteamFriends>)
    }

    fn user_stats(&self) -> Option<Rc<dyn SteamUserStats>> {
        self.interfaces().map(|i| i as Rc<dyn SteamUserStats>)
    }
}

impl SteamUser for SimulatedInterfaces {
    fn steam_id(&self) -> SteamId {
        self.state.borrow().local_id
    }

    fn player_steam_level(&self) -> i32 {
        self.state.borrow().local.steam_level
    }
}

impl SteamFriends for SimulatedInterfaces {
    fn persona_name(&self) -> String {
        self.state.borrow().local.name.clone()
    }

    fn friend_persona_name(&self, id: SteamId) -> String {
        self.state
            .borrow()
            .friends
            .get(&id)
            .map(|p| p.name.clone())
            .unwrap_or_default()
    }

    fn friend_steam_level(&self, id: SteamId) -> i32 {
        self.state
            .borrow()
            .friends
            .get(&id)
            .map(|p| p.steam_level)
            .unwrap_or(0)
    }
}

impl SteamUserStats for SimulatedInterfaces {
    fn request_current_stats(&self) -> bool {
        let mut state = self.state.borrow_mut();
        state.stats_requests += 1;
        state.pending.push_back(SteamEvent::UserStatsReceived);
        true
    }

    fn achievement_and_unlock_time(&self, name: &str) -> Option<AchievementStatus> {
        self.state.borrow().achievements.get(name).copied()
    }
}

impl SimulatedSteamHandle {
    /// Queue a notification for the next callback drain.
    pub fn queue_event(&self, event: SteamEvent) {
        debug!(event = event.name(), "queueing simulated notification");
        self.state.borrow_mut().pending.push_back(event);
    }

    /// Number of notifications waiting to be drained.
    pub fn pending_events(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Toggle whether the Steam client counts as running.
    pub fn set_running(&self, running: bool) {
        self.state.borrow_mut().running = running;
    }

    /// Whether the SDK is currently activated.
    pub fn is_active(&self) -> bool {
        self.state.borrow().active
    }

    /// How many times current stats were requested.
    pub fn stats_requests(&self) -> u32 {
        self.state.borrow().stats_requests
    }

    /// Add or replace a friend known to the local user.
    pub fn add_friend(&self, id: SteamId, name: &str, steam_level: i32) {
        self.state.borrow_mut().friends.insert(
            id,
            Profile {
                name: name.to_string(),
                steam_level,
            },
        );
    }

    /// Unlock an achievement and queue the notifications the SDK sends for it.
    ///
    /// Returns false if the achievement does not exist or is already unlocked.
    pub fn unlock_achievement(&self, name: &str, unlock_time: u32) -> bool {
        let mut state = self.state.borrow_mut();
        match state.achievements.get_mut(name) {
            Some(status) if !status.achieved => {
                status.achieved = true;
                status.unlock_time = unlock_time;
            }
            _ => return false,
        }
        state.pending.push_back(SteamEvent::AchievementStored);
        state.pending.push_back(SteamEvent::UserStatsStored);
        true
    }
}
