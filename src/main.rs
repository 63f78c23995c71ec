use frameview::cli::{Args, Command};
use frameview::config::{self, ViewerConfig};
use frameview::core::manifest;
use frameview::display::LogSurface;
use frameview::fetch::{self, Month};
use frameview::runner;
use frameview::server::{ApiServer, SharedSurface, SharedViewerState};
use frameview::shell::{self, OnEof};

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};

fn main() -> Result<()> {
    // Parse command-line arguments first (needed for log setup)
    let args = Args::parse();

    init_logging(&args)?;

    info!("frameview v{} starting...", env!("CARGO_PKG_VERSION"));
    debug!("Command-line args: {:?}", args);

    let config = ViewerConfig::from_env_and_cli(&args);

    match &args.command {
        Some(Command::Manifest { dir, prefix }) => {
            write_manifest(dir, prefix, config.max_frames)?;
            return Ok(());
        }
        Some(Command::Fetch { start, end, dir, base_url, prefix }) => {
            let start = start.unwrap_or_else(Month::current);
            let end = end.unwrap_or(start);
            let saved = fetch::fetch_months(base_url, start, end, dir)?;
            println!("Downloaded {} maps into {}", saved.len(), dir.display());
            if dir.is_dir() {
                write_manifest(dir, prefix, config.max_frames)?;
            }
            return Ok(());
        }
        None => {}
    }

    info!("Manifest: {}", config.manifest_location());
    let (tx, rx) = crossbeam_channel::unbounded();

    if config.headless {
        info!("Headless mode: reading commands from stdin");
        shell::spawn_stdin_reader(tx.clone(), OnEof::Shutdown)
            .context("Failed to start stdin reader")?;
        runner::run_viewer(&config, LogSurface::new(), tx, rx);
        return Ok(());
    }

    let state = SharedViewerState::new();
    let server = ApiServer::start(config.port, config.local_img_dir(), state.clone(), tx.clone())?;
    println!("Viewer at http://localhost:{}/ (type 'quit' to stop)", server.addr().port());
    // Terminal commands work next to the browser; `quit` stops the server
    shell::spawn_stdin_reader(tx.clone(), OnEof::KeepRunning)
        .context("Failed to start stdin reader")?;
    runner::run_viewer(&config, SharedSurface::new(state), tx, rx);
    server.stop();

    info!("Application exiting");
    Ok(())
}

/// Regenerate `dir/frames.json` from the PNG frames in `dir`
fn write_manifest(dir: &Path, prefix: &str, max_frames: usize) -> Result<()> {
    let frames = manifest::generate_manifest(dir, prefix, max_frames)?;
    let path = manifest::write_manifest(dir, &frames)?;
    println!("Wrote {} frames to {}", frames.len(), path.display());
    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    // Determine log level based on verbosity flags
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    // Headless mode renders through the log, so it starts at info
    let verbosity = if args.headless { args.verbosity.max(1) } else { args.verbosity };
    let log_level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        // File logging with specified verbosity level
        let log_path = log_path_opt
            .clone()
            .unwrap_or_else(|| config::data_file("frameview.log"));

        if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }
        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .filter_module("rouille", log::LevelFilter::Warn)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!(
            "Logging to file: {} (level: {:?})",
            log_path.display(),
            log_level
        );
    } else {
        // Console logging with specified verbosity level (respects RUST_LOG if set)
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(log_level.as_str().to_lowercase()),
        )
        .filter_module("rouille", log::LevelFilter::Warn)
        .format_timestamp_millis()
        .init();
    }

    Ok(())
}
