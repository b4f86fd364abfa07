//! Host-side script instances.
//!
//! An instance is the object a script's `self` refers to. The host may destroy
//! it while Lua still holds references, so anything that calls back into a
//! script later has to check that the instance is still valid first.

use std::cell::Cell;
use std::rc::Rc;

use mlua::{MetaMethod, UserData, UserDataFields, UserDataMethods, Value};

/// A script instance exposed to Lua as userdata.
pub struct ScriptInstance {
    name: String,
    alive: Rc<Cell<bool>>,
}

/// Host handle used to destroy a [`ScriptInstance`].
#[derive(Clone)]
pub struct InstanceHandle {
    alive: Rc<Cell<bool>>,
}

impl ScriptInstance {
    /// Create a live instance and the handle that controls its lifetime.
    pub fn new(name: impl Into<String>) -> (Self, InstanceHandle) {
        let alive = Rc::new(Cell::new(true));
        let instance = Self {
            name: name.into(),
            alive: Rc::clone(&alive),
        };
        (instance, InstanceHandle { alive })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_valid(&self) -> bool {
        self.alive.get()
    }
}

impl InstanceHandle {
    /// Mark the instance as destroyed.
    pub fn destroy(&self) {
        self.alive.set(false);
    }

    pub fn is_valid(&self) -> bool {
        self.alive.get()
    }
}

impl UserData for ScriptInstance {
    fn add_fields<F: UserDataFields<Self>>(fields: &mut F) {
        fields.add_field_method_get("name", |_, this| Ok(this.name.clone()));
    }

    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("is_valid", |_, this, ()| Ok(this.is_valid()));
        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| {
            Ok(format!("instance: {}", this.name))
        });
    }
}

/// Whether a Lua value refers to a usable owning instance.
///
/// Values that are not [`ScriptInstance`] userdata have no host lifetime and
/// always count as valid. Userdata whose Rust value was already destructed
/// does not.
pub fn is_instance_valid(value: &Value) -> bool {
    match value {
        Value::UserData(ud) => match ud.borrow::<ScriptInstance>() {
            Ok(instance) => instance.is_valid(),
            Err(mlua::Error::UserDataDestructed) => false,
            Err(_) => true,
        },
        _ => true,
    }
}
