//! Static site generation.
//!
//! - `grid_page` - packed project grid per filter (`index.html`, `<category>/index.html`)
//! - `project_page` - one detail page per project (`projects/<id>.html`)
//! - `assets` - static file copy and missing media report

pub mod assets;
pub mod grid_page;
pub mod project_page;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, MediaProbe, ProbeCache};
use crate::config::{SiteConfig, SiteSettings};
use crate::layout::RandomSource;
use crate::state::{Filter, Label, Language, RenderState};

pub use grid_page::{grid_view, render_grid_page, GridView};
pub use project_page::ProjectPage;

const NAV_TEMPLATE: &str = include_str!("templates/nav.html.mustache");

pub(crate) fn render_template<T: Serialize>(template: &str, context: &T) -> Result<String> {
    let template =
        mustache::compile_str(template).map_err(|e| anyhow!("Failed to compile template: {}", e))?;
    template
        .render_to_string(context)
        .map_err(|e| anyhow!("Failed to render template: {}", e))
}

#[derive(Debug, Clone, Serialize)]
pub struct ScriptTag {
    pub src: String,
}

impl ScriptTag {
    pub fn list(scripts: &[String]) -> Vec<ScriptTag> {
        scripts.iter().map(|src| ScriptTag { src: src.clone() }).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageLink {
    pub code: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryLink {
    pub key: String,
    pub href: String,
    pub label: String,
    pub label_de: String,
    pub label_en: String,
    pub active: bool,
}

/// Header and mobile navigation shared by every page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NavView {
    pub site_name: String,
    pub projects_label: String,
    pub projects_active: bool,
    pub info_label: String,
    pub languages: Vec<LanguageLink>,
    pub categories: Vec<CategoryLink>,
}

pub fn nav_view(site: &SiteSettings, state: &RenderState) -> NavView {
    let language = state.language;
    NavView {
        site_name: site.artist.to_lowercase(),
        projects_label: language.label(Label::Projects).to_string(),
        projects_active: state.filter == Filter::All,
        info_label: language.label(Label::Info).to_string(),
        languages: Language::ALL
            .iter()
            .map(|&lang| LanguageLink {
                code: lang.code(),
                active: lang == language,
            })
            .collect(),
        categories: site
            .categories
            .iter()
            .map(|c| CategoryLink {
                key: c.key.clone(),
                href: category_href(&c.key),
                label: c.label(language).to_string(),
                label_de: c.de.clone(),
                label_en: c.en.clone(),
                active: state.filter.key() == c.key,
            })
            .collect(),
    }
}

pub(crate) fn render_nav(nav: &NavView) -> Result<String> {
    render_template(NAV_TEMPLATE, nav)
}

pub fn category_href(key: &str) -> String {
    format!("/{}/", key)
}

/// Output of one site build.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    pub project_pages: usize,
    pub grid_pages: usize,
    pub copied_files: usize,
    pub missing_media: Vec<String>,
}

pub struct SiteBuilder {
    config: SiteConfig,
    root: PathBuf,
    out: PathBuf,
}

impl SiteBuilder {
    pub fn new(config: SiteConfig, root: impl Into<PathBuf>, out: impl Into<PathBuf>) -> Self {
        Self {
            config,
            root: root.into(),
            out: out.into(),
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Renders every page and copies static assets.
    ///
    /// Grid pages are packed in order (all projects first, then each
    /// configured category), all drawing from `rng`.
    pub fn build(
        &self,
        catalog: &Catalog,
        state: &RenderState,
        rng: &mut dyn RandomSource,
    ) -> Result<BuildReport> {
        let start = Instant::now();
        fs::create_dir_all(&self.out)
            .with_context(|| format!("Failed to create output dir {}", self.out.display()))?;

        let mut report = BuildReport {
            output_dir: self.out.clone(),
            ..Default::default()
        };

        report.project_pages = self.write_project_pages(catalog, state)?;
        report.grid_pages = self.write_grid_pages(catalog, state, rng)?;

        if assets::same_location(&self.root, &self.out) {
            debug!("Output is the site root, skipping static copy");
        } else {
            report.copied_files =
                assets::copy_static(&self.root, &self.out, &self.config.site.static_assets)?;
        }

        report.missing_media = assets::missing_media(catalog, &self.root);
        if !report.missing_media.is_empty() {
            warn!(count = report.missing_media.len(), "Catalog references missing media");
        }

        info!(
            project_pages = report.project_pages,
            grid_pages = report.grid_pages,
            copied_files = report.copied_files,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Site build complete"
        );
        Ok(report)
    }

    fn write_project_pages(&self, catalog: &Catalog, state: &RenderState) -> Result<usize> {
        let dir = self.out.join("projects");
        fs::create_dir_all(&dir)?;
        let wrap = self.config.site.wrap_navigation;

        for (index, project) in catalog.projects().iter().enumerate() {
            let page = ProjectPage::new(project, catalog.neighbours(index, wrap), &self.config, state)
                .with_context(|| format!("Failed to prepare page for project {}", project.id))?;
            let html = page.render(&self.config)?;
            write_page(&dir.join(format!("{}.html", project.id)), &html)?;
        }
        Ok(catalog.len())
    }

    fn write_grid_pages(
        &self,
        catalog: &Catalog,
        state: &RenderState,
        rng: &mut dyn RandomSource,
    ) -> Result<usize> {
        let probe = MediaProbe::with_cache(
            &self.root,
            self.config.probe.workers,
            ProbeCache::new(self.config.probe.cache_capacity),
        );

        let mut filters = vec![Filter::All];
        filters.extend(
            self.config
                .site
                .categories
                .iter()
                .map(|c| Filter::Category(c.key.clone())),
        );

        for filter in &filters {
            let page_state = RenderState {
                filter: filter.clone(),
                ..state.clone()
            };
            let projects = catalog.filtered(filter);
            let items = Catalog::grid_items(&projects, &probe);
            let view = grid_view(&projects, &items, &self.config, &page_state, rng)
                .with_context(|| format!("Failed to pack grid for filter {}", filter))?;
            let html = render_grid_page(&view, &self.config)?;

            let path = match filter {
                Filter::All => self.out.join("index.html"),
                Filter::Category(key) => self.out.join(key).join("index.html"),
            };
            write_page(&path, &html)?;
        }
        Ok(filters.len())
    }
}

fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(?path, "Wrote page");
    Ok(())
}
