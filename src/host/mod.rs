//! Minimal model of the application runtime that hosts the binding.
//!
//! Provides the Lua state, script instances with host-controlled lifetimes,
//! the extension lifecycle contract and a frame loop.

pub mod engine;
pub mod extension;
pub mod instance;
pub mod runner;

pub use engine::ScriptHost;
pub use extension::Extension;
pub use instance::{is_instance_valid, InstanceHandle, ScriptInstance};
pub use runner::{FrameRunner, RunReport};
