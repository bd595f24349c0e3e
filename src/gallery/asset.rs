use serde::{Deserialize, Serialize};

use crate::models::{is_remote, MediaType, Project};
use crate::state::Language;

/// Query appended to Vimeo embeds that carry none, so they play as silent loops.
pub const VIMEO_BACKGROUND_QUERY: &str = "?autoplay=1&loop=1&background=1&muted=1";

/// One entry of a project's gallery, as consumed by the page script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MediaAsset {
    Image {
        src: String,
        alt: String,
    },
    Video {
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        poster: Option<String>,
        alt: String,
    },
    Embed {
        src: String,
    },
}

impl MediaAsset {
    /// Builds the asset for a gallery path, classified by its source.
    pub fn classify(src: &str, alt: impl Into<String>) -> Self {
        match MediaType::from_source(src) {
            MediaType::Embed => MediaAsset::Embed {
                src: embed_url(src),
            },
            MediaType::Video => MediaAsset::Video {
                src: root_absolute(src),
                poster: None,
                alt: alt.into(),
            },
            MediaType::Image => MediaAsset::Image {
                src: root_absolute(src),
                alt: alt.into(),
            },
        }
    }

    pub fn kind(&self) -> MediaType {
        match self {
            MediaAsset::Image { .. } => MediaType::Image,
            MediaAsset::Video { .. } => MediaType::Video,
            MediaAsset::Embed { .. } => MediaType::Embed,
        }
    }

    pub fn src(&self) -> &str {
        match self {
            MediaAsset::Image { src, .. }
            | MediaAsset::Video { src, .. }
            | MediaAsset::Embed { src } => src,
        }
    }

    pub fn alt(&self) -> Option<&str> {
        match self {
            MediaAsset::Image { alt, .. } | MediaAsset::Video { alt, .. } => Some(alt),
            MediaAsset::Embed { .. } => None,
        }
    }

    /// Gallery of a project: the featured video first, then `images` in order.
    /// Alt text is `"<en title> - <credit> - View <n>"`, counting from 1.
    pub fn for_project(project: &Project, credit: &str) -> Vec<MediaAsset> {
        let title = project.display_title(Language::En);
        let alt = |n: usize| format!("{} - {} - View {}", title, credit, n);

        let mut assets = Vec::with_capacity(project.images.len() + 1);
        if let Some(video) = &project.video {
            assets.push(MediaAsset::Video {
                src: root_absolute(&video.src),
                poster: video.poster.as_deref().map(root_absolute),
                alt: alt(1),
            });
        }
        for src in &project.images {
            let n = assets.len() + 1;
            assets.push(MediaAsset::classify(src, alt(n)));
        }
        assets
    }
}

/// Local paths become root-absolute (`images/a.jpg` -> `/images/a.jpg`);
/// remote URLs are left alone.
pub fn root_absolute(path: &str) -> String {
    if is_remote(path) || path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

pub fn embed_url(src: &str) -> String {
    if src.contains("vimeo") && !src.contains('?') {
        format!("{}{}", src, VIMEO_BACKGROUND_QUERY)
    } else {
        src.to_string()
    }
}
