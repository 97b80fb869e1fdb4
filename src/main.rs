#![forbid(unsafe_code)]

//! dsw — Disk Space Warden CLI entry point.

use std::path::PathBuf;

use clap::Parser;

use disk_space_warden::core::config::Config;
use disk_space_warden::logger::line::RunLogger;
use disk_space_warden::platform::pal::system_platform;
use disk_space_warden::sweep::docker::DockerCli;
use disk_space_warden::sweep::engine::Engine;
use disk_space_warden::sweep::guard::DEFAULT_LOCK_PATH;

/// Single-host disk-space guardian. All tuning comes from environment
/// variables (THRESHOLD_GB, TARGET_PATH, PRUNE_DOCKER, ...); the flags here
/// only change how this one invocation behaves.
#[derive(Parser, Debug)]
#[command(name = "dsw", version, about)]
struct Cli {
    /// Print the effective configuration and exit.
    #[arg(long)]
    print_config: bool,

    /// Run the sweep even when free space and inodes are healthy.
    #[arg(long)]
    force: bool,
}

fn main() {
    let args = Cli::parse();
    let logger = RunLogger::system();

    let (cfg, warnings) = Config::from_env();
    for warning in &warnings {
        logger.warn(warning);
    }

    if args.print_config {
        println!("{}", cfg.summary());
        return;
    }

    let lock_path = std::env::var_os("DSW_LOCK_PATH")
        .map_or_else(|| PathBuf::from(DEFAULT_LOCK_PATH), PathBuf::from);

    let docker = DockerCli;
    let code = Engine::new(&cfg, system_platform(), &docker, &logger)
        .with_lock_path(lock_path)
        .with_force(args.force)
        .run();
    std::process::exit(code);
}
