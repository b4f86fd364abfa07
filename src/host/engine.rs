//! Lua state owned by the host application.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use mlua::{Function, HookTriggers, IntoLuaMulti, Lua, Value, VmState};

use crate::config::ScriptConfig;
use crate::{Result, SteamworksError};

const HOOK_INTERVAL: u32 = 10_000;

/// The host's Lua state with per-call resource limits.
pub struct ScriptHost {
    lua: Lua,
    instruction_count: Arc<AtomicU64>,
    max_instructions: u64,
}

impl ScriptHost {
    /// Create a host with default limits.
    pub fn new() -> Result<Self> {
        Self::with_limits(&ScriptConfig::default())
    }

    /// Create a host with the given limits.
    pub fn with_limits(limits: &ScriptConfig) -> Result<Self> {
        let lua = Lua::new();

        if limits.max_memory_mb > 0 {
            let bytes = limits.max_memory_mb.checked_mul(1024 * 1024).ok_or_else(|| {
                SteamworksError::Config(format!(
                    "script.max_memory_mb {} is too large",
                    limits.max_memory_mb
                ))
            })?;
            lua.set_memory_limit(bytes)
                .map_err(|e| SteamworksError::Script(format!("Failed to set memory limit: {}", e)))?;
        }

        Ok(Self {
            lua,
            instruction_count: Arc::new(AtomicU64::new(0)),
            max_instructions: limits.max_instructions,
        })
    }

    /// Run `f` with the instruction budget armed.
    fn with_budget<T>(&self, f: impl FnOnce() -> mlua::Result<T>) -> mlua::Result<T> {
        self.instruction_count.store(0, Ordering::SeqCst);

        if self.max_instructions > 0 {
            let count = Arc::clone(&self.instruction_count);
            let limit = self.max_instructions;

            self.lua.set_hook(
                HookTriggers::new().every_nth_instruction(HOOK_INTERVAL),
                move |_lua, _debug| {
                    let step = u64::from(HOOK_INTERVAL);
                    let current = count.fetch_add(step, Ordering::SeqCst) + step;
                    if current > limit {
                        Err(mlua::Error::RuntimeError(
                            "Script exceeded instruction limit".to_string(),
                        ))
                    } else {
                        Ok(VmState::Continue)
                    }
                },
            );
        }

        let result = f();
        self.lua.remove_hook();
        result
    }

    /// Execute a chunk of Lua source.
    pub fn execute(&self, name: &str, source: &str) -> Result<()> {
        self.with_budget(|| self.lua.load(source).set_name(name).exec())
            .map_err(|e| SteamworksError::Script(format!("Script error: {}", e)))
    }

    /// Call a global lifecycle function if the script defines one.
    ///
    /// Returns `Ok(false)` when the global is absent.
    pub fn call_hook<A: IntoLuaMulti>(&self, name: &str, args: A) -> Result<bool> {
        let hook = match self.get_global::<Value>(name)? {
            Value::Function(f) => f,
            Value::Nil => return Ok(false),
            other => {
                return Err(SteamworksError::Script(format!(
                    "'{}' is a {}, not a function",
                    name,
                    other.type_name()
                )))
            }
        };
        self.call(&hook, args)
            .map_err(|e| SteamworksError::Script(format!("Error in '{}': {}", name, e)))?;
        Ok(true)
    }

    fn call<A: IntoLuaMulti>(&self, f: &Function, args: A) -> mlua::Result<()> {
        self.with_budget(|| f.call::<()>(args))
    }

    /// Set a global value in the Lua environment.
    pub fn set_global<V: mlua::IntoLua>(&self, name: &str, value: V) -> Result<()> {
        self.lua
            .globals()
            .set(name, value)
            .map_err(|e| SteamworksError::Script(format!("Failed to set global '{}': {}", name, e)))
    }

    /// Get a global value from the Lua environment.
    pub fn get_global<V: mlua::FromLua>(&self, name: &str) -> Result<V> {
        self.lua
            .globals()
            .get(name)
            .map_err(|e| SteamworksError::Script(format!("Failed to get global '{}': {}", name, e)))
    }

    /// Instructions counted during the last call (in steps of the hook interval).
    pub fn instruction_count(&self) -> u64 {
        self.instruction_count.load(Ordering::SeqCst)
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_execution() {
        let host = ScriptHost::new().unwrap();
        host.execute("test", "x = 1 + 2").unwrap();

        let result: i32 = host.get_global("x").unwrap();
        assert_eq!(result, 3);
    }

    #[test]
    fn test_syntax_error() {
        let host = ScriptHost::new().unwrap();
        let result = host.execute("test", "this is not valid lua");
        assert!(matches!(result, Err(SteamworksError::Script(_))));
    }

    #[test]
    fn test_runtime_error_carries_message() {
        let host = ScriptHost::new().unwrap();
        let err = host.execute("test", "error('boom')").unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_instruction_limit() {
        let limits = ScriptConfig {
            max_instructions: 1000,
            max_memory_mb: 0,
        };
        let host = ScriptHost::with_limits(&limits).unwrap();

        let err = host.execute("loop", "while true do end").unwrap_err();
        assert!(err.to_string().contains("instruction limit"));
    }

    #[test]
    fn test_instruction_limit_applies_to_hooks() {
        let limits = ScriptConfig {
            max_instructions: 1000,
            max_memory_mb: 0,
        };
        let host = ScriptHost::with_limits(&limits).unwrap();
        host.execute("spin", "function update() while true do end end")
            .unwrap();

        assert!(host.call_hook("update", ()).is_err());
    }

    #[test]
    fn test_memory_limit() {
        let limits = ScriptConfig {
            max_instructions: 0,
            max_memory_mb: 1,
        };
        let host = ScriptHost::with_limits(&limits).unwrap();

        let result = host.execute(
            "alloc",
            r#"
            t = {}
            for i = 1, 100000 do
                t[i] = string.rep("x", 1000)
            end
        "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_memory_limit_overflow_is_config_error() {
        let limits = ScriptConfig {
            max_instructions: 0,
            max_memory_mb: usize::MAX,
        };
        let result = ScriptHost::with_limits(&limits);
        assert!(matches!(result, Err(SteamworksError::Config(_))));
    }

    #[test]
    fn test_instruction_count_tracks_last_call() {
        let limits = ScriptConfig {
            max_instructions: 10_000_000,
            max_memory_mb: 0,
        };
        let host = ScriptHost::with_limits(&limits).unwrap();

        host.execute("busy", "local n = 0 for i = 1, 50000 do n = n + i end")
            .unwrap();
        assert!(host.instruction_count() >= u64::from(HOOK_INTERVAL));

        // Reset at the start of every call.
        host.execute("idle", "x = 1").unwrap();
        assert_eq!(host.instruction_count(), 0);
    }

    #[test]
    fn test_call_hook_present() {
        let host = ScriptHost::new().unwrap();
        host.execute("hooks", "function init(n) called = n end")
            .unwrap();

        assert!(host.call_hook("init", 7).unwrap());
        assert_eq!(host.get_global::<i32>("called").unwrap(), 7);
    }

    #[test]
    fn test_call_hook_absent() {
        let host = ScriptHost::new().unwrap();
        assert!(!host.call_hook("final", ()).unwrap());
    }

    #[test]
    fn test_call_hook_not_a_function() {
        let host = ScriptHost::new().unwrap();
        host.set_global("update", 5).unwrap();

        let err = host.call_hook("update", ()).unwrap_err();
        assert!(err.to_string().contains("not a function"));
    }

    #[test]
    fn test_set_and_get_global() {
        let host = ScriptHost::new().unwrap();

        host.set_global("my_string", "hello").unwrap();
        let result: String = host.get_global("my_string").unwrap();
        assert_eq!(result, "hello");
    }
}
