//! Frame loop for running a game-object script against loaded extensions.
//!
//! The script is driven the way an engine drives a component script: `init`
//! once, `update` once per frame, `final` once, each receiving the instance as
//! `self`. Afterwards the instance is destroyed.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use super::engine::ScriptHost;
use super::instance::ScriptInstance;
use crate::config::HarnessConfig;
use crate::{Result, SteamworksError};

/// Summary of a finished run.
#[derive(Debug)]
pub struct RunReport {
    /// Frames for which `update` was invoked.
    pub frames_run: u32,
    /// False if the first frame found no `update` function.
    pub has_update: bool,
}

/// Drives a script's lifecycle functions on a [`ScriptHost`].
pub struct FrameRunner<'a> {
    host: &'a ScriptHost,
    frames: u32,
    frame_time: Duration,
}

impl<'a> FrameRunner<'a> {
    pub fn new(host: &'a ScriptHost, config: &HarnessConfig) -> Self {
        Self {
            host,
            frames: config.frames,
            frame_time: Duration::from_millis(config.frame_interval_ms),
        }
    }

    /// Load and run a script file.
    pub fn run_file<P: AsRef<Path>>(&self, path: P) -> Result<RunReport> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        self.run(&path.display().to_string(), &source)
    }

    /// Run a script given as source.
    pub fn run(&self, name: &str, source: &str) -> Result<RunReport> {
        let (instance, handle) = ScriptInstance::new(name);
        let result = self.run_instance(name, source, instance);
        handle.destroy();
        result
    }

    fn run_instance(&self, name: &str, source: &str, instance: ScriptInstance) -> Result<RunReport> {
        self.host.execute(name, source)?;

        let this = self
            .host
            .lua()
            .create_userdata(instance)
            .map_err(|e| SteamworksError::Script(format!("Failed to create instance: {}", e)))?;

        info!(script = name, frames = self.frames, "running script");
        self.host.call_hook("init", this.clone())?;

        let dt = self.frame_time.as_secs_f64();
        let mut report = RunReport {
            frames_run: 0,
            has_update: true,
        };
        for frame in 0..self.frames {
            if !self.host.call_hook("update", (this.clone(), dt))? {
                report.has_update = false;
                break;
            }
            debug!(frame, "frame complete");
            report.frames_run += 1;
        }

        self.host.call_hook("final", this)?;
        info!(script = name, frames = report.frames_run, "script finished");
        Ok(report)
    }
}
