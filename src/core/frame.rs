//! Frame descriptor - one manifest entry, one displayable image.
//!
//! Manifest entries come in two shapes and both decode to the same [`Frame`]:
//!
//! ```json
//! ["img/2020_01.png", { "src": "img/2020_02.png", "title": "ignored" }]
//! ```

use serde::{Deserialize, Serialize};

/// Immutable image descriptor. `src` is used verbatim as the image URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub src: String,
}

impl Frame {
    pub fn new(src: impl Into<String>) -> Self {
        Self { src: src.into() }
    }

    /// Image URL for the display surface
    pub fn url(&self) -> &str {
        &self.src
    }
}

/// Wire shape of a manifest entry (bare path or `{ "src": ... }`)
#[derive(Deserialize)]
#[serde(untagged)]
enum FrameEntry {
    Path(String),
    Object { src: String },
}

impl<'de> Deserialize<'de> for Frame {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let src = match FrameEntry::deserialize(deserializer)? {
            FrameEntry::Path(src) => src,
            FrameEntry::Object { src } => src,
        };
        Ok(Frame { src })
    }
}
