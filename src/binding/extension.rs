//! Host lifecycle integration for the `steamworks` module.

use mlua::Lua;
use tracing::info;

use super::module::SteamworksModule;
use crate::host::Extension;
use crate::{Result, SteamworksError};

/// Loads [`SteamworksModule`] into the host's Lua state.
///
/// Only the per-state `initialize` does work; SDK start and stop are left to
/// the script's own `init()`/`final()` calls.
pub struct SteamworksExtension {
    module: SteamworksModule,
}

impl SteamworksExtension {
    pub fn new(module: SteamworksModule) -> Self {
        Self { module }
    }

    pub fn module(&self) -> &SteamworksModule {
        &self.module
    }
}

impl Extension for SteamworksExtension {
    fn name(&self) -> &str {
        self.module.name()
    }

    fn initialize(&mut self, lua: &Lua) -> Result<()> {
        self.module.register(lua).map_err(|e| {
            SteamworksError::Script(format!("Failed to register {} module: {}", self.module.name(), e))
        })?;
        info!("Registered {} Extension", self.module.name());
        Ok(())
    }

    fn finalize(&mut self, lua: &Lua) -> Result<()> {
        // Registry keys belong to this Lua state.
        self.module
            .listener()
            .borrow_mut()
            .clear(lua)
            .map_err(|e| SteamworksError::Script(format!("Failed to release listener: {}", e)))
    }
}
