mod commands;
mod logging;
mod progress;

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use progress::Console;
use structure_sync_core::{AppConfig, SyncEngine};
use tracing::{error, info, warn};

fn main() {
    dotenv().ok();

    let code = {
        let console = Console::new();
        let _guard = logging::init_logger(&console);
        run(Cli::parse(), &console)
    };
    process::exit(code);
}

fn run(args: Cli, console: &Console) -> i32 {
    let mut config = match structure_sync_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            return 1;
        }
    };
    if let Some(every) = args.progress_every {
        config.progress_every = every;
    }

    let outcome = match args.command {
        Some(Commands::Scan { src, map }) => run_scan(&config, console, src, map),
        Some(Commands::Sync { dst, map, dry_run }) => {
            run_sync(&config, console, dst, map, dry_run)
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    match outcome {
        Ok(()) => 0,
        Err(err) => {
            error!("Error: {:#}", err);
            1
        }
    }
}

fn run_scan(
    config: &AppConfig,
    console: &Console,
    src: PathBuf,
    map: Option<PathBuf>,
) -> anyhow::Result<()> {
    let map = map.unwrap_or_else(|| config.map_path.clone());
    let engine = SyncEngine::new(config.clone());
    let reporter = console.reporter();
    let result = engine
        .scan(&src, &map, &reporter)
        .with_context(|| format!("scan of {} failed", src.display()))?;
    reporter.finish();

    info!(
        "Scan: {}, {} files mapped, {} filtered, {} duplicates",
        format!("{:.2}s", result.elapsed.as_secs_f64()).green(),
        format!("{}", result.mapping.len()).green(),
        result.files_filtered,
        format!("{}", result.duplicates).yellow(),
    );
    if !result.issues.is_empty() {
        warn!(
            "{} files could not be fingerprinted",
            format!("{}", result.issues.len()).red()
        );
    }

    Ok(())
}

fn run_sync(
    config: &AppConfig,
    console: &Console,
    dst: PathBuf,
    map: Option<PathBuf>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let map = map.unwrap_or_else(|| config.map_path.clone());
    let engine = SyncEngine::new(config.clone());
    let reporter = console.reporter();
    let result = engine
        .sync(&dst, &map, dry_run, &reporter)
        .with_context(|| format!("sync of {} failed", dst.display()))?;
    reporter.finish();

    info!(
        "{}: {}, {} {}, {} already in place, {} unmatched, {} directories removed",
        if dry_run { "Preview" } else { "Sync" },
        format!("{:.2}s", result.elapsed.as_secs_f64()).green(),
        format!("{}", result.moved()).green(),
        if dry_run { "to move" } else { "moved" },
        result.already_in_place,
        format!("{}", result.unmatched.len()).yellow(),
        result.dirs_pruned,
    );
    if !result.issues.is_empty() {
        warn!(
            "{} problems ({} conflicts), see the log above",
            format!("{}", result.issues.len()).red(),
            result.conflicts,
        );
    }

    Ok(())
}
