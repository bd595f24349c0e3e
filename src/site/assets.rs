//! Static asset copying and media checks.
//!
//! The site root holds hand-written CSS/JS plus the media the catalog points
//! at. A build copies the configured entries verbatim into the output
//! directory and reports catalog media that is not on disk.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::catalog::Catalog;

/// Whether two paths name the same existing directory.
pub fn same_location(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Copies each entry (file or directory, relative to `root`) into `out`,
/// keeping relative paths. Missing entries are skipped. Returns the number
/// of files copied.
pub fn copy_static(root: &Path, out: &Path, entries: &[String]) -> Result<usize> {
    let mut copied = 0;
    for entry in entries {
        let src = root.join(entry.trim_start_matches('/'));
        if !src.exists() {
            debug!(?src, "Static entry not present, skipping");
            continue;
        }
        for file in discover_files(&src) {
            let rel = file.strip_prefix(root).unwrap_or(&file);
            let dest = out.join(rel);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::copy(&file, &dest).with_context(|| {
                format!("Failed to copy {} to {}", file.display(), dest.display())
            })?;
            trace!(?file, ?dest, "Copied static file");
            copied += 1;
        }
    }
    debug!(copied, "Copied static assets");
    Ok(copied)
}

/// All regular files under `path` (or `path` itself), sorted.
fn discover_files(path: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Failed to walk {:?}: {}", path, err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// Local media referenced by the catalog but absent under `root`, in catalog
/// order without duplicates.
pub fn missing_media(catalog: &Catalog, root: &Path) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut missing = Vec::new();
    for project in catalog.projects() {
        for media in project.media_paths() {
            if media.is_empty() || !seen.insert(media) {
                continue;
            }
            if !root.join(media.trim_start_matches('/')).is_file() {
                warn!(id = %project.id, media, "Referenced media is missing");
                missing.push(media.to_string());
            }
        }
    }
    missing
}
