//! SDK state shared by the Lua entry points.

use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::steam::{SteamBackend, SteamEvent, SteamFriends, SteamId, SteamUser, SteamUserStats};
use crate::{Result, SteamworksError};

/// Subsystem interfaces cached by a successful `init`.
///
/// Any of them may be missing if the SDK declined to provide it.
pub struct SubsystemHandles {
    pub user: Option<Rc<dyn SteamUser>>,
    pub friends: Option<Rc<dyn SteamFriends>>,
    pub user_stats: Option<Rc<dyn SteamUserStats>>,
}

/// Achievement state returned to scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementInfo {
    pub unlocked: bool,
    pub unlock_time: u32,
}

/// Profile returned to scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub id: SteamId,
    pub name: String,
    pub steam_level: i32,
}

/// Which user a `get_user_info` call refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Local,
    Remote(SteamId),
}

impl Identity {
    /// Resolve an optional identifier string against the local user's ID.
    pub fn resolve(arg: Option<&str>, local: SteamId) -> Result<Self> {
        let Some(arg) = arg else {
            return Ok(Identity::Local);
        };
        let id: SteamId = arg.parse()?;
        if id == local {
            Ok(Identity::Local)
        } else {
            Ok(Identity::Remote(id))
        }
    }
}

/// Owns the SDK runtime and the interfaces acquired from it.
pub struct SteamAdapter {
    backend: Box<dyn SteamBackend>,
    handles: Option<SubsystemHandles>,
}

impl SteamAdapter {
    pub fn new(backend: impl SteamBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            handles: None,
        }
    }

    /// Whether `init` succeeded and `shutdown` has not run since.
    pub fn is_initialized(&self) -> bool {
        self.handles.is_some()
    }

    pub fn handles(&self) -> Option<&SubsystemHandles> {
        self.handles.as_ref()
    }

    /// Activate the SDK, cache its interfaces and request current stats.
    pub fn init(&mut self) -> Result<()> {
        if self.handles.is_some() {
            debug!("Steamworks already initialized");
            return Ok(());
        }

        let activated = self.backend.init();
        if !self.backend.is_steam_running() {
            warn!("Steam is not running");
            if activated {
                self.backend.shutdown();
            }
            return Err(SteamworksError::NotRunning);
        }
        if !activated {
            warn!("SDK activation failed; interfaces may be unavailable");
        }

        let handles = SubsystemHandles {
            user: self.backend.user(),
            friends: self.backend.friends(),
            user_stats: self.backend.user_stats(),
        };

        match &handles.user_stats {
            Some(stats) => {
                if !stats.request_current_stats() {
                    warn!("request for current stats was rejected");
                }
            }
            None => warn!("stats interface unavailable"),
        }

        match &handles.user {
            Some(user) => info!(steam_id = %user.steam_id(), "Steamworks initialized"),
            None => info!("Steamworks initialized without a user interface"),
        }
        self.handles = Some(handles);
        Ok(())
    }

    /// Drain the SDK callback queue.
    ///
    /// Returns the notifications in the order the SDK delivered them. Nothing
    /// is drained while uninitialized.
    pub fn update(&mut self) -> Vec<SteamEvent> {
        let mut events = Vec::new();
        if self.handles.is_some() {
            self.backend.run_callbacks(&mut |event| events.push(event));
        }
        events
    }

    /// Deactivate the SDK and drop every cached interface.
    pub fn shutdown(&mut self) {
        if self.handles.take().is_some() {
            info!("Steamworks shut down");
        }
        self.backend.shutdown();
    }

    /// Fails unless the stats interface has been acquired.
    pub fn require_user_stats(&self) -> Result<()> {
        self.user_stats().map(|_| ())
    }

    /// Fails unless both the user and friends interfaces have been acquired.
    pub fn require_user_and_friends(&self) -> Result<()> {
        self.user_and_friends().map(|_| ())
    }

    fn user_stats(&self) -> Result<&Rc<dyn SteamUserStats>> {
        self.handles
            .as_ref()
            .and_then(|h| h.user_stats.as_ref())
            .ok_or(SteamworksError::MissingInterface("steamUserStats"))
    }

    fn user_and_friends(&self) -> Result<(&Rc<dyn SteamUser>, &Rc<dyn SteamFriends>)> {
        match self.handles.as_ref() {
            Some(SubsystemHandles {
                user: Some(user),
                friends: Some(friends),
                ..
            }) => Ok((user, friends)),
            _ => Err(SteamworksError::MissingInterface("steamFriends or steamUser")),
        }
    }

    /// Look up an achievement by API name.
    pub fn achievement_info(&self, name: &str) -> Result<AchievementInfo> {
        let status = self
            .user_stats()?
            .achievement_and_unlock_time(name)
            .ok_or_else(|| SteamworksError::UnknownAchievement(name.to_string()))?;

        Ok(AchievementInfo {
            unlocked: status.achieved,
            unlock_time: status.unlock_time,
        })
    }

    /// Profile of the local user, or of `id` when it names someone else.
    pub fn user_info(&self, id: Option<&str>) -> Result<UserInfo> {
        let (user, friends) = self.user_and_friends()?;

        let local = user.steam_id();
        match Identity::resolve(id, local)? {
            Identity::Local => Ok(UserInfo {
                id: local,
                name: friends.persona_name(),
                steam_level: user.player_steam_level(),
            }),
            Identity::Remote(other) => Ok(UserInfo {
                id: other,
                name: friends.friend_persona_name(other),
                steam_level: friends.friend_steam_level(other),
            }),
        }
    }

    /// Not supported: the SDK seam has no achievement enumeration.
    pub fn achievement_names(&self) -> Result<Vec<String>> {
        Err(SteamworksError::Unsupported("get_achievement_names"))
    }

    /// Not supported.
    pub fn stat_value(&self, _name: &str) -> Result<f64> {
        Err(SteamworksError::Unsupported("get_stat_value"))
    }
}
