//! Manifest loading and generation.
//!
//! The manifest is `frames.json` inside the image directory: a JSON array of
//! frame entries in display order. Loading is all-or-nothing and fails soft:
//! [`load_frames`] turns every [`ManifestError`] into an empty sequence after
//! logging it. [`fetch_manifest`] keeps the error for callers that care.
//!
//! [`generate_manifest`] / [`write_manifest`] build the file from a directory
//! of PNG frames.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use thiserror::Error;

use crate::config::{FRAME_EXT, MANIFEST_FILE};
use crate::core::frame::Frame;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("malformed manifest: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Fixed manifest location derived from the image directory
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManifestLocation {
    Url(String),
    File(PathBuf),
}

impl ManifestLocation {
    /// `http(s)://` bases become URLs, anything else a local path
    pub fn from_img_dir(img_dir: &str) -> Self {
        if img_dir.starts_with("http://") || img_dir.starts_with("https://") {
            ManifestLocation::Url(format!("{}/{}", img_dir.trim_end_matches('/'), MANIFEST_FILE))
        } else {
            ManifestLocation::File(Path::new(img_dir).join(MANIFEST_FILE))
        }
    }
}

impl fmt::Display for ManifestLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestLocation::Url(url) => f.write_str(url),
            ManifestLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Parse a manifest body. Anything but an array of frame entries is an error.
pub fn parse_manifest(bytes: &[u8]) -> Result<Vec<Frame>, ManifestError> {
    Ok(serde_json::from_slice::<Vec<Frame>>(bytes)?)
}

/// Fetch and parse the manifest, keeping the error.
pub fn fetch_manifest(location: &ManifestLocation) -> Result<Vec<Frame>, ManifestError> {
    match location {
        ManifestLocation::File(path) => {
            let bytes = std::fs::read(path).map_err(|source| ManifestError::Io {
                path: path.clone(),
                source,
            })?;
            parse_manifest(&bytes)
        }
        ManifestLocation::Url(url) => fetch_http(url),
    }
}

fn fetch_http(url: &str) -> Result<Vec<Frame>, ManifestError> {
    let http_err = |source: reqwest::Error| ManifestError::Http {
        url: url.to_string(),
        source,
    };

    // No timeout on the manifest fetch
    let client = reqwest::blocking::Client::builder()
        .timeout(None::<Duration>)
        .user_agent(concat!("frameview/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(http_err)?;

    debug!("GET {}", url);
    let response = client.get(url).send().map_err(http_err)?;
    if !response.status().is_success() {
        return Err(ManifestError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    // Redirects may move the manifest; resolve against where it ended up
    let base = response.url().clone();
    let body = response.bytes().map_err(http_err)?;
    Ok(resolve_sources(&base, parse_manifest(&body)?))
}

/// Resolve relative frame sources against the manifest URL.
///
/// The page is served by this process, not by the manifest's host, so a
/// relative `src` would otherwise point back at the local server.
fn resolve_sources(base: &reqwest::Url, frames: Vec<Frame>) -> Vec<Frame> {
    frames
        .into_iter()
        .map(|frame| match base.join(frame.url()) {
            Ok(url) => Frame::new(url),
            Err(e) => {
                warn!("Keeping unresolvable frame source {:?}: {}", frame.url(), e);
                frame
            }
        })
        .collect()
}

/// Load the frame list, degrading to an empty list on any failure.
///
/// At most `max_frames` entries are kept.
pub fn load_frames(location: &ManifestLocation, max_frames: usize) -> Vec<Frame> {
    match fetch_manifest(location) {
        Ok(mut frames) => {
            info!("Frames list loaded from {}: {} entries", location, frames.len());
            if frames.len() > max_frames {
                warn!(
                    "Manifest lists {} frames, keeping the first {}",
                    frames.len(),
                    max_frames
                );
                frames.truncate(max_frames);
            }
            frames
        }
        Err(e) => {
            error!("Error loading {}: {}", location, e);
            Vec::new()
        }
    }
}

/// List the PNG frames of `dir` in file-name order as manifest entries.
pub fn generate_manifest(dir: &Path, prefix: &str, max_frames: usize) -> Result<Vec<Frame>> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let pattern = format!(
        "{}/*.{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        FRAME_EXT
    );
    let mut names: Vec<String> = glob::glob(&pattern)
        .with_context(|| format!("Invalid frame pattern: {}", pattern))?
        .filter_map(|entry| match entry {
            Ok(path) => path.file_name().map(|n| n.to_string_lossy().into_owned()),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .collect();
    names.sort();

    if names.len() > max_frames {
        warn!("{} frames found, keeping the first {}", names.len(), max_frames);
        names.truncate(max_frames);
    }

    Ok(names
        .into_iter()
        .map(|name| Frame::new(format!("{}{}", prefix, name)))
        .collect())
}

/// Write `frames` as `dir/frames.json`. Returns the written path.
pub fn write_manifest(dir: &Path, frames: &[Frame]) -> Result<PathBuf> {
    let path = dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(frames).context("Failed to serialize manifest")?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write manifest: {}", path.display()))?;
    info!("Wrote {} frames to {}", frames.len(), path.display());
    Ok(path)
}
