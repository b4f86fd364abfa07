//! The `steamworks` table exposed to Lua.
//!
//! Entry points:
//!
//! | function | returns |
//! |---|---|
//! | `init()` | `true`; raises if Steam is not running |
//! | `update()` | nothing; dispatches pending events to the listener |
//! | `final()` | nothing |
//! | `get_achievement_info(name)` | `{unlocked, unlockTime}` or `nil, err` |
//! | `get_achievement_names()` | `nil, err` (not supported) |
//! | `get_user_info([id])` | `{id, name, steam_level}` or `nil, err` |
//! | `get_stat_value(...)` | `nil, err` (not supported) |
//! | `set_listener(fn, self)` | nothing |

use std::cell::RefCell;
use std::rc::Rc;

use mlua::{Function, Lua, Result as LuaResult, Table, Value, Variadic};
use tracing::debug;

use super::adapter::{AchievementInfo, SteamAdapter, UserInfo};
use super::listener::{notify_listener, ListenerSlot};
use crate::steam::SteamBackend;
use crate::SteamworksError;

/// Default global name of the module table.
pub const MODULE_NAME: &str = "steamworks";

/// Builds and registers the `steamworks` table.
///
/// The adapter and the listener slot live behind `Rc<RefCell<_>>` and are
/// captured by every entry point, so one module instance is one SDK session.
pub struct SteamworksModule {
    name: String,
    adapter: Rc<RefCell<SteamAdapter>>,
    listener: Rc<RefCell<ListenerSlot>>,
}

impl SteamworksModule {
    /// Create a module backed by `backend`.
    pub fn new(backend: impl SteamBackend + 'static) -> Self {
        Self {
            name: MODULE_NAME.to_string(),
            adapter: Rc::new(RefCell::new(SteamAdapter::new(backend))),
            listener: Rc::new(RefCell::new(ListenerSlot::new())),
        }
    }

    /// Register under a different global name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared adapter state.
    pub fn adapter(&self) -> Rc<RefCell<SteamAdapter>> {
        Rc::clone(&self.adapter)
    }

    /// Shared listener slot.
    pub fn listener(&self) -> Rc<RefCell<ListenerSlot>> {
        Rc::clone(&self.listener)
    }

    /// Register the module table as a global in `lua`.
    pub fn register(&self, lua: &Lua) -> LuaResult<()> {
        let module = lua.create_table()?;

        // === Lifecycle ===
        self.register_lifecycle_functions(lua, &module)?;

        // === Queries ===
        self.register_query_functions(lua, &module)?;

        // === Events ===
        self.register_listener_functions(lua, &module)?;

        lua.globals().set(self.name.as_str(), module)?;
        debug!(module = %self.name, "registered Lua module");

        Ok(())
    }

    /// Register init/update/final.
    fn register_lifecycle_functions(&self, lua: &Lua, module: &Table) -> LuaResult<()> {
        // steamworks.init()
        let adapter = Rc::clone(&self.adapter);
        let init_fn = lua.create_function(move |_, ()| {
            adapter.borrow_mut().init()?;
            Ok(true)
        })?;
        module.set("init", init_fn)?;

        // steamworks.update()
        let adapter = Rc::clone(&self.adapter);
        let listener = Rc::clone(&self.listener);
        let update_fn = lua.create_function(move |lua, ()| {
            // Collect first: listeners may call back into the adapter.
            let events = adapter.borrow_mut().update();
            for event in events {
                notify_listener(&listener, lua, event);
            }
            Ok(())
        })?;
        module.set("update", update_fn)?;

        // steamworks.final()
        let adapter = Rc::clone(&self.adapter);
        let final_fn = lua.create_function(move |_, ()| {
            adapter.borrow_mut().shutdown();
            Ok(())
        })?;
        module.set("final", final_fn)?;

        Ok(())
    }

    /// Register achievement, user and stat queries.
    fn register_query_functions(&self, lua: &Lua, module: &Table) -> LuaResult<()> {
        // steamworks.get_achievement_info(name)
        let adapter = Rc::clone(&self.adapter);
        let achievement_info_fn = lua.create_function(move |lua, name: Value| {
            // Interfaces are checked before the argument, so a bad call before
            // init() still yields nil, err.
            let adapter = adapter.borrow();
            let result = adapter
                .require_user_stats()
                .and_then(|()| {
                    string_arg(&name)
                        .ok()
                        .flatten()
                        .ok_or(SteamworksError::InvalidArgument("achievement id must be a string"))
                })
                .and_then(|name| adapter.achievement_info(&name));
            query_return(lua, result, |lua, info| achievement_table(lua, &info))
        })?;
        module.set("get_achievement_info", achievement_info_fn)?;

        // steamworks.get_achievement_names()
        let adapter = Rc::clone(&self.adapter);
        let achievement_names_fn = lua.create_function(move |lua, ()| {
            let result = adapter.borrow().achievement_names();
            query_return(lua, result, |lua, names| lua.create_sequence_from(names))
        })?;
        module.set("get_achievement_names", achievement_names_fn)?;

        // steamworks.get_user_info([id])
        let adapter = Rc::clone(&self.adapter);
        let user_info_fn = lua.create_function(move |lua, id: Value| {
            let adapter = adapter.borrow();
            let result = adapter
                .require_user_and_friends()
                .and_then(|()| {
                    string_arg(&id).map_err(|_| SteamworksError::InvalidArgument("steam id must be a string"))
                })
                .and_then(|id| adapter.user_info(id.as_deref()));
            query_return(lua, result, |lua, user| user_table(lua, &user))
        })?;
        module.set("get_user_info", user_info_fn)?;

        // steamworks.get_stat_value(name)
        let adapter = Rc::clone(&self.adapter);
        let stat_value_fn = lua.create_function(move |lua, args: Variadic<Value>| {
            let name = args
                .first()
                .and_then(|arg| string_arg(arg).ok().flatten())
                .unwrap_or_default();
            let result = adapter.borrow().stat_value(&name);
            query_return(lua, result, |_, value| Ok(value))
        })?;
        module.set("get_stat_value", stat_value_fn)?;

        Ok(())
    }

    /// Register set_listener.
    fn register_listener_functions(&self, lua: &Lua, module: &Table) -> LuaResult<()> {
        // steamworks.set_listener(callback, self)
        let listener = Rc::clone(&self.listener);
        let set_listener_fn = lua.create_function(move |lua, (callback, instance): (Function, Value)| {
            listener.borrow_mut().set(lua, callback, instance)
        })?;
        module.set("set_listener", set_listener_fn)?;

        Ok(())
    }
}

/// Map a query result onto Lua's `value` / `nil, message` convention.
fn query_return<T, V>(
    lua: &Lua,
    result: crate::Result<T>,
    to_lua: impl FnOnce(&Lua, T) -> LuaResult<V>,
) -> LuaResult<(Option<V>, Option<String>)> {
    match result {
        Ok(value) => Ok((Some(to_lua(lua, value)?), None)),
        Err(e) => {
            debug!(error = %e, "query failed");
            Ok((None, Some(e.to_string())))
        }
    }
}

/// Read an optional string argument. Integers are coerced the way Lua's
/// string functions coerce them; other types are rejected.
fn string_arg(value: &Value) -> crate::Result<Option<String>> {
    match value {
        Value::Nil => Ok(None),
        Value::String(s) => s
            .to_str()
            .map(|s| Some(s.to_string()))
            .map_err(|_| SteamworksError::InvalidArgument("argument is not valid UTF-8")),
        Value::Integer(i) => Ok(Some(i.to_string())),
        _ => Err(SteamworksError::InvalidArgument("expected a string")),
    }
}

fn achievement_table(lua: &Lua, info: &AchievementInfo) -> LuaResult<Table> {
    let table = lua.create_table()?;
    table.set("unlocked", info.unlocked)?;
    table.set("unlockTime", info.unlock_time)?;
    Ok(table)
}

fn user_table(lua: &Lua, user: &UserInfo) -> LuaResult<Table> {
    let table = lua.create_table()?;
    table.set("id", user.id.to_string())?;
    table.set("name", user.name.as_str())?;
    table.set("steam_level", user.steam_level)?;
    Ok(table)
}
