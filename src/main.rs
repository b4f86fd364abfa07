use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use steamworks_lua::{
    Config, Extension, FrameRunner, ScriptHost, SimulatedSteam, SteamworksExtension,
    SteamworksModule,
};

/// Run a Lua game-object script against a simulated Steam client.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Script defining init/update/final
    script: PathBuf,

    /// Configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the number of frames to run
    #[arg(short, long)]
    frames: Option<u32>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let mut config = match Config::load_with_env(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", args.config.display());
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };
    if let Some(frames) = args.frames {
        config.harness.frames = frames;
    }
    if let Err(e) = config.validate() {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    // Initialize logging
    if let Err(e) = steamworks_lua::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        steamworks_lua::logging::init_console_only(&config.logging.level);
    }

    match run(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, config: &Config) -> steamworks_lua::Result<()> {
    let host = ScriptHost::with_limits(&config.script)?;
    let module = SteamworksModule::new(SimulatedSteam::new(&config.simulation))
        .with_name(config.steamworks.module_name.as_str());
    let mut extension = SteamworksExtension::new(module);

    extension.app_initialize()?;
    extension.initialize(host.lua())?;

    let report = FrameRunner::new(&host, &config.harness).run_file(&args.script);

    extension.finalize(host.lua())?;
    extension.app_finalize()?;

    let report = report?;
    info!(
        frames = report.frames_run,
        has_update = report.has_update,
        "run complete"
    );
    Ok(())
}
