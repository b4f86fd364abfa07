//! Extension lifecycle contract between the host application and native
//! extensions.

use mlua::Lua;

use crate::Result;

/// Lifecycle hooks a host invokes on every loaded extension.
///
/// The app-level hooks run once per process, around everything else. The
/// instance-level hooks run once per Lua state the extension is loaded into.
pub trait Extension {
    /// Extension name used in logs.
    fn name(&self) -> &str;

    fn app_initialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Install the extension into a Lua state.
    fn initialize(&mut self, lua: &Lua) -> Result<()>;

    fn finalize(&mut self, _lua: &Lua) -> Result<()> {
        Ok(())
    }

    fn app_finalize(&mut self) -> Result<()> {
        Ok(())
    }
}
