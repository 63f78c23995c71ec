use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::IMG_DIR;
use crate::fetch::{Month, REPORT_BASE_URL};

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Frame sequence viewer
#[derive(Parser, Debug, Default)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Image directory holding frames.json (local path or http(s) base URL)
    #[arg(long = "img-dir", value_name = "DIR|URL")]
    pub img_dir: Option<String>,

    /// HTTP port for the viewer page and API
    #[arg(long = "port", value_name = "PORT")]
    pub port: Option<u16>,

    /// Playback period in milliseconds (at least 1)
    #[arg(
        long = "interval-ms",
        value_name = "MS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval_ms: Option<u64>,

    /// Maximum number of frames kept from the manifest
    #[arg(long = "max-frames", value_name = "N")]
    pub max_frames: Option<usize>,

    /// Auto-play on startup
    #[arg(short = 'a', long = "autoplay")]
    pub autoplay: bool,

    /// No HTTP server; read commands from stdin and log the display state
    #[arg(long = "headless")]
    pub headless: bool,

    /// Enable logging to file (default: frameview.log in the data directory)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write frames.json listing the PNG frames of a directory in name order
    Manifest {
        /// Directory to scan; frames.json is written here
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Prefix prepended to each file name in the manifest
        #[arg(long = "prefix", value_name = "PREFIX", default_value = "img/")]
        prefix: String,
    },

    /// Download monthly temperature maps as YYYY_MM.png, then rewrite frames.json
    Fetch {
        /// First month (MM/YYYY); defaults to the current month
        #[arg(value_name = "START")]
        start: Option<Month>,

        /// Last month (MM/YYYY); defaults to START
        #[arg(value_name = "END")]
        end: Option<Month>,

        /// Image directory to download into
        #[arg(long = "dir", value_name = "DIR", default_value = IMG_DIR)]
        dir: PathBuf,

        /// Site hosting the monthly posts
        #[arg(long = "base-url", value_name = "URL", default_value = REPORT_BASE_URL)]
        base_url: String,

        /// Prefix prepended to each file name in the manifest
        #[arg(long = "prefix", value_name = "PREFIX", default_value = "img/")]
        prefix: String,
    },
}
