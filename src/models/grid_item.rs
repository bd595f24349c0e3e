use serde::{Deserialize, Serialize};

/// Aspect ratio substituted when the representative media has no usable dimensions.
pub const FALLBACK_ASPECT_RATIO: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Embed,
}

impl MediaType {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "webp" | "gif" | "bmp" | "tiff" | "tif" => Some(Self::Image),
            "webm" | "mp4" | "mov" => Some(Self::Video),
            _ => None,
        }
    }

    /// Classifies a gallery source: hosted players first, then by extension.
    /// Anything unrecognised is treated as an image.
    pub fn from_source(src: &str) -> Self {
        if src.contains("youtube") || src.contains("vimeo") {
            return Self::Embed;
        }
        let path = src.split(&['?', '#'][..]).next().unwrap_or(src);
        path.rsplit_once('.')
            .and_then(|(_, ext)| Self::from_extension(ext))
            .unwrap_or(Self::Image)
    }
}

/// An entry handed to the masonry packer.
///
/// `aspect_ratio` is width / height of the representative image and must be
/// positive; callers substitute [`FALLBACK_ASPECT_RATIO`] before packing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridItem {
    pub id: String,
    pub aspect_ratio: f64,
}

impl GridItem {
    pub fn new(id: impl Into<String>, aspect_ratio: f64) -> Self {
        Self {
            id: id.into(),
            aspect_ratio,
        }
    }

    /// Builds an item from pixel dimensions, falling back to a square when
    /// either side is zero.
    pub fn from_dimensions(id: impl Into<String>, width: u32, height: u32) -> Self {
        let aspect_ratio = if width == 0 || height == 0 {
            FALLBACK_ASPECT_RATIO
        } else {
            width as f64 / height as f64
        };
        Self::new(id, aspect_ratio)
    }

    pub fn has_valid_aspect_ratio(&self) -> bool {
        self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0
    }
}
