//! Viewer configuration: compile-time constants plus CLI/env overrides.
//!
//! Priority for every overridable field: CLI flag → environment variable →
//! compile-time default.

use std::path::PathBuf;
use std::time::Duration;

use log::warn;

use crate::cli::Args;
use crate::core::manifest::ManifestLocation;

/// Default image directory (relative to the working directory)
pub const IMG_DIR: &str = "img";
/// Manifest file name inside the image directory
pub const MANIFEST_FILE: &str = "frames.json";
/// Frame file extension picked up by manifest generation
pub const FRAME_EXT: &str = "png";
/// Safety limit on the number of frames kept from a manifest
pub const MAX_FRAMES: usize = 200;
/// Playback period (ms per frame)
pub const PLAY_INTERVAL_MS: u64 = 100;
/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8080;

pub const ENV_IMG_DIR: &str = "FRAMEVIEW_IMG_DIR";
pub const ENV_PORT: &str = "FRAMEVIEW_PORT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    /// Local directory or http(s) base URL holding the frames and the manifest
    pub img_dir: String,
    pub port: u16,
    pub play_interval: Duration,
    pub max_frames: usize,
    pub autoplay: bool,
    pub headless: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            img_dir: IMG_DIR.to_string(),
            port: DEFAULT_PORT,
            play_interval: Duration::from_millis(PLAY_INTERVAL_MS),
            max_frames: MAX_FRAMES,
            autoplay: false,
            headless: false,
        }
    }
}

impl ViewerConfig {
    /// Create ViewerConfig from CLI arguments and environment variables
    pub fn from_env_and_cli(args: &Args) -> Self {
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    fn resolve(args: &Args, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let img_dir = args
            .img_dir
            .clone()
            .or_else(|| env(ENV_IMG_DIR))
            .unwrap_or(defaults.img_dir);

        let port = args.port.or_else(|| {
            let raw = env(ENV_PORT)?;
            match raw.parse::<u16>() {
                Ok(port) => Some(port),
                Err(_) => {
                    warn!("Ignoring invalid {}={:?}", ENV_PORT, raw);
                    None
                }
            }
        });

        Self {
            img_dir,
            port: port.unwrap_or(defaults.port),
            play_interval: args
                .interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.play_interval),
            max_frames: args.max_frames.unwrap_or(defaults.max_frames),
            autoplay: args.autoplay,
            headless: args.headless,
        }
    }

    /// Where the manifest is fetched from
    pub fn manifest_location(&self) -> ManifestLocation {
        ManifestLocation::from_img_dir(&self.img_dir)
    }

    /// Local image directory to serve under `/img/`, if the frames are local
    pub fn local_img_dir(&self) -> Option<PathBuf> {
        match self.manifest_location() {
            ManifestLocation::File(_) => Some(PathBuf::from(&self.img_dir)),
            ManifestLocation::Url(_) => None,
        }
    }
}

/// Get path to a data file (logs)
///
/// Platform paths:
/// - Linux: ~/.local/share/frameview/{name}
/// - macOS: ~/Library/Application Support/frameview/{name}
/// - Windows: %APPDATA%\frameview\{name}
pub fn data_file(name: &str) -> PathBuf {
    data_dir().join(name)
}

fn data_dir() -> PathBuf {
    if let Some(dir) = dirs_next::data_dir() {
        return dir.join("frameview");
    }

    // Fallback: "." if everything else fails
    PathBuf::from(".")
}
