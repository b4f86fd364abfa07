//! The single script listener that receives SDK notifications.

use std::cell::RefCell;

use mlua::{Function, Lua, RegistryKey, Result as LuaResult, Value};
use tracing::{debug, error};

use crate::host::is_instance_valid;
use crate::steam::SteamEvent;

struct ListenerRegistration {
    callback: RegistryKey,
    /// `None` when the listener was registered without an owning instance.
    instance: Option<RegistryKey>,
}

impl ListenerRegistration {
    /// Drop both registry anchors. A key that cannot be removed is logged and
    /// dropped anyway.
    fn release(self, lua: &Lua) {
        for key in std::iter::once(self.callback).chain(self.instance) {
            if let Err(e) = lua.remove_registry_value(key) {
                error!("Could not release Steamworks listener: {}", e);
            }
        }
    }
}

/// Holds at most one `(callback, self)` registration.
///
/// The callback and instance are anchored in the Lua registry so they survive
/// garbage collection for as long as they are registered.
#[derive(Default)]
pub struct ListenerSlot {
    registration: Option<ListenerRegistration>,
}

/// What happened to a notification handed to [`notify_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No listener is registered.
    NoListener,
    /// The callback ran to completion.
    Delivered,
    /// The owning instance was destroyed; the callback was not run.
    InstanceGone,
    /// The callback raised an error.
    Failed,
}

impl ListenerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.registration.is_some()
    }

    /// Register `callback` with its owning `instance`, releasing any previous
    /// registration.
    pub fn set(&mut self, lua: &Lua, callback: Function, instance: Value) -> LuaResult<()> {
        let callback = lua.create_registry_value(callback)?;
        let instance = match instance {
            Value::Nil => None,
            value => Some(lua.create_registry_value(value)?),
        };

        if let Some(previous) = self
            .registration
            .replace(ListenerRegistration { callback, instance })
        {
            previous.release(lua);
            debug!("replaced Steamworks listener");
        }
        Ok(())
    }

    /// Release the current registration, if any.
    pub fn clear(&mut self, lua: &Lua) -> LuaResult<()> {
        if let Some(previous) = self.registration.take() {
            previous.release(lua);
        }
        Ok(())
    }

    fn target(&self, lua: &Lua) -> LuaResult<Option<(Function, Value)>> {
        let Some(registration) = &self.registration else {
            return Ok(None);
        };
        let callback: Function = lua.registry_value(&registration.callback)?;
        let instance = match &registration.instance {
            Some(key) => lua.registry_value(key)?,
            None => Value::Nil,
        };
        Ok(Some((callback, instance)))
    }
}

/// Deliver `event` to the registered listener as `callback(self, event_name)`.
///
/// The slot is only borrowed while resolving the registration, so the callback
/// is free to call back into the binding, including replacing the listener.
pub fn notify_listener(slot: &RefCell<ListenerSlot>, lua: &Lua, event: SteamEvent) -> DispatchOutcome {
    let target = slot.borrow().target(lua);
    let (callback, instance) = match target {
        Ok(Some(target)) => target,
        Ok(None) => return DispatchOutcome::NoListener,
        Err(e) => {
            error!(event = event.name(), "Could not resolve Steamworks listener: {}", e);
            return DispatchOutcome::Failed;
        }
    };

    if !is_instance_valid(&instance) {
        error!(
            event = event.name(),
            "Could not run Steamworks callback because the instance has been deleted."
        );
        return DispatchOutcome::InstanceGone;
    }

    debug!(event = event.name(), "dispatching Steamworks event");
    match callback.call::<()>((instance, event.name())) {
        Ok(()) => DispatchOutcome::Delivered,
        Err(e) => {
            error!(event = event.name(), "Error running Steamworks callback: {}", e);
            DispatchOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ScriptInstance;

    fn function(lua: &Lua, source: &str) -> Function {
        lua.load(source).eval().unwrap()
    }

    #[test]
    fn test_no_listener() {
        let lua = Lua::new();
        let slot = RefCell::new(ListenerSlot::new());
        assert_eq!(
            notify_listener(&slot, &lua, SteamEvent::UserStatsReceived),
            DispatchOutcome::NoListener
        );
    }

    #[test]
    fn test_delivers_self_and_event_name() {
        let lua = Lua::new();
        let slot = RefCell::new(ListenerSlot::new());
        let owner = lua.create_table().unwrap();
        owner.set("tag", "owner").unwrap();

        let cb = function(
            &lua,
            "return function(self, event) got_tag = self.tag; got_event = event end",
        );
        slot.borrow_mut()
            .set(&lua, cb, Value::Table(owner))
            .unwrap();

        assert_eq!(
            notify_listener(&slot, &lua, SteamEvent::AchievementStored),
            DispatchOutcome::Delivered
        );
        let globals = lua.globals();
        assert_eq!(globals.get::<String>("got_tag").unwrap(), "owner");
        assert_eq!(globals.get::<String>("got_event").unwrap(), "OnAchievementStored");
    }

    #[test]
    fn test_nil_instance() {
        let lua = Lua::new();
        let slot = RefCell::new(ListenerSlot::new());
        let cb = function(&lua, "return function(self, event) self_is_nil = self == nil end");
        slot.borrow_mut().set(&lua, cb, Value::Nil).unwrap();

        assert_eq!(
            notify_listener(&slot, &lua, SteamEvent::UserStatsStored),
            DispatchOutcome::Delivered
        );
        assert!(lua.globals().get::<bool>("self_is_nil").unwrap());
    }

    #[test]
    fn test_replacement_releases_previous() {
        let lua = Lua::new();
        let slot = RefCell::new(ListenerSlot::new());
        let first = function(&lua, "return function() first_calls = (first_calls or 0) + 1 end");
        let second = function(&lua, "return function() second_calls = (second_calls or 0) + 1 end");

        slot.borrow_mut().set(&lua, first, Value::Nil).unwrap();
        slot.borrow_mut().set(&lua, second, Value::Nil).unwrap();
        notify_listener(&slot, &lua, SteamEvent::UserStatsReceived);

        let globals = lua.globals();
        assert!(globals.get::<Option<i32>>("first_calls").unwrap().is_none());
        assert_eq!(globals.get::<i32>("second_calls").unwrap(), 1);
    }

    #[test]
    fn test_replacement_survives_foreign_previous_keys() {
        let other = Lua::new();
        let lua = Lua::new();
        let slot = RefCell::new(ListenerSlot::new());
        let stale = function(&other, "return function() end");
        let owner = other.create_table().unwrap();
        slot.borrow_mut().set(&other, stale, Value::Table(owner)).unwrap();

        // The old keys belong to `other` and cannot be removed through `lua`.
        let fresh = function(&lua, "return function(self, event) got = event end");
        slot.borrow_mut().set(&lua, fresh, Value::Nil).unwrap();

        assert_eq!(
            notify_listener(&slot, &lua, SteamEvent::UserStatsStored),
            DispatchOutcome::Delivered
        );
        assert_eq!(lua.globals().get::<String>("got").unwrap(), "OnUserStatsStored");
    }

    #[test]
    fn test_dead_instance_skips_dispatch() {
        let lua = Lua::new();
        let slot = RefCell::new(ListenerSlot::new());
        let (instance, handle) = ScriptInstance::new("owner");
        let ud = lua.create_userdata(instance).unwrap();
        let cb = function(&lua, "return function() called = true end");
        slot.borrow_mut()
            .set(&lua, cb, Value::UserData(ud))
            .unwrap();

        handle.destroy();
        assert_eq!(
            notify_listener(&slot, &lua, SteamEvent::UserStatsReceived),
            DispatchOutcome::InstanceGone
        );
        assert!(lua.globals().get::<Option<bool>>("called").unwrap().is_none());
    }

    #[test]
    fn test_callback_error_is_contained() {
        let lua = Lua::new();
        let slot = RefCell::new(ListenerSlot::new());
        let cb = function(&lua, "return function() error('listener broke') end");
        slot.borrow_mut().set(&lua, cb, Value::Nil).unwrap();

        assert_eq!(
            notify_listener(&slot, &lua, SteamEvent::UserStatsStored),
            DispatchOutcome::Failed
        );
        // The slot stays registered after a failing call.
        assert!(slot.borrow().is_set());
    }

    #[test]
    fn test_clear() {
        let lua = Lua::new();
        let slot = RefCell::new(ListenerSlot::new());
        let cb = function(&lua, "return function() end");
        slot.borrow_mut().set(&lua, cb, Value::Nil).unwrap();
        slot.borrow_mut().clear(&lua).unwrap();

        assert!(!slot.borrow().is_set());
        assert_eq!(
            notify_listener(&slot, &lua, SteamEvent::UserStatsStored),
            DispatchOutcome::NoListener
        );
    }
}
