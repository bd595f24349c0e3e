//! Site configuration (`folio.toml`).
//!
//! Lookup order: an explicit `--config` path, then `./folio.toml`, then
//! `<platform config dir>/folio/folio.toml`. Without a file every section
//! takes its defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::probe::{DEFAULT_CACHE_CAPACITY, DEFAULT_WORKERS};
use crate::effects::EffectSettings;
use crate::gallery::GallerySettings;
use crate::layout::MasonryLayout;
use crate::state::Language;

pub const CONFIG_FILE: &str = "folio.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryLabel {
    /// Filter key as used in the catalog and in URLs.
    pub key: String,
    pub de: String,
    pub en: String,
}

impl CategoryLabel {
    pub fn new(key: &str, de: &str, en: &str) -> Self {
        Self {
            key: key.to_string(),
            de: de.to_string(),
            en: en.to_string(),
        }
    }

    pub fn label(&self, language: Language) -> &str {
        match language {
            Language::De => &self.de,
            Language::En => &self.en,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    /// Name used in page titles and structured data.
    pub artist: String,
    /// Absolute site URL for Open Graph and JSON-LD image links.
    pub base_url: String,
    /// Middle part of image alt text; defaults to "Architecture by <artist>".
    pub credit: Option<String>,
    pub default_language: Language,
    pub categories: Vec<CategoryLabel>,
    /// Files and directories under the root copied into the output.
    pub static_assets: Vec<String>,
    /// Script tags added to every page.
    pub scripts: Vec<String>,
    /// Footer navigation wraps from the last project to the first.
    pub wrap_navigation: bool,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            artist: "Folio".to_string(),
            base_url: "https://example.com".to_string(),
            credit: None,
            default_language: Language::De,
            categories: vec![
                CategoryLabel::new("architecture", "architektur", "architecture"),
                CategoryLabel::new("objects", "objekte", "objects"),
                CategoryLabel::new("research", "forschung", "research"),
            ],
            static_assets: ["css", "js", "images", "videos", "favicon.svg"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            scripts: vec!["/js/pixel-trail.js".to_string(), "/js/main.js".to_string()],
            wrap_navigation: false,
        }
    }
}

impl SiteSettings {
    pub fn credit(&self) -> String {
        match &self.credit {
            Some(credit) if !credit.is_empty() => credit.clone(),
            _ => format!("Architecture by {}", self.artist),
        }
    }

    /// Joins a site-relative path onto `base_url`.
    pub fn absolute_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn category(&self, key: &str) -> Option<&CategoryLabel> {
        self.categories.iter().find(|c| c.key == key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    pub workers: usize,
    pub cache_capacity: usize,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub grid: MasonryLayout,
    pub site: SiteSettings,
    pub gallery: GallerySettings,
    pub effects: EffectSettings,
    pub probe: ProbeSettings,
}

impl SiteConfig {
    /// Resolves and loads the configuration. Returns the file it came from,
    /// if any.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("config file {} does not exist", path.display());
            }
            let config = Self::load_from_path(path)?;
            return Ok((config, Some(path.to_path_buf())));
        }

        for path in Self::search_paths() {
            if path.exists() {
                let config = Self::load_from_path(&path)?;
                return Ok((config, Some(path)));
            }
        }

        debug!("No config file found, using defaults");
        Ok((Self::default(), None))
    }

    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dirs) = ProjectDirs::from("", "", "folio") {
            paths.push(dirs.config_dir().join(CONFIG_FILE));
        }
        paths
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: SiteConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config {}", path.display()))?;
        info!(?path, "Loaded config");
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.gallery.validate()?;
        if self.probe.workers == 0 {
            bail!("probe.workers must be at least 1");
        }
        for category in &self.site.categories {
            if category.key.is_empty() || category.key == "all" {
                bail!("invalid category key {:?}", category.key);
            }
        }
        Ok(())
    }
}
