use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::{Catalog, MediaProbe, ProbeCache};
use crate::config::SiteConfig;
use crate::layout::random::entropy_seed;
use crate::layout::SeededRng;
use crate::models::RowModel;
use crate::site::{BuildReport, SiteBuilder};
use crate::state::{
    FileStore, Filter, KeyValueStore, Language, RenderState, FILTER_KEY, LANGUAGE_KEY,
};

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub catalog: PathBuf,
    pub root: PathBuf,
    pub out: PathBuf,
    pub seed: Option<u64>,
    pub language: Option<Language>,
}

#[derive(Debug, Clone)]
pub struct PackOptions {
    pub catalog: PathBuf,
    pub root: PathBuf,
    pub filter: Option<Filter>,
    pub seed: Option<u64>,
    pub width: Option<u32>,
}

/// Result of `folio pack`, printed as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct PackOutput {
    /// Seed that reproduces this layout.
    pub seed: u64,
    pub filter: String,
    pub container_width: u32,
    pub grid_unit: u32,
    pub rows: Vec<RowModel>,
}

pub struct FolioApp {
    config: SiteConfig,
    store: Box<dyn KeyValueStore>,
}

impl FolioApp {
    pub fn new(config: SiteConfig, store: Box<dyn KeyValueStore>) -> Self {
        Self { config, store }
    }

    /// Loads the config file and opens the state store in the data directory.
    pub fn from_env(config_path: Option<&Path>) -> Result<Self> {
        let (config, source) = SiteConfig::load(config_path)?;
        debug!(?source, "Using configuration");
        let store = FileStore::open_default()?;
        Ok(Self::new(config, Box::new(store)))
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Persisted state, with the configured default language when none is stored.
    pub fn render_state(&self) -> RenderState {
        let mut state = RenderState::load(self.store.as_ref());
        if self.store.get(LANGUAGE_KEY).is_none() {
            state.language = self.config.site.default_language;
        }
        state
    }

    pub fn build(&self, options: &BuildOptions) -> Result<BuildReport> {
        let catalog = Catalog::load(&options.catalog)?;
        let mut state = self.render_state();
        if let Some(language) = options.language {
            state.language = language;
        }
        let seed = options.seed.unwrap_or_else(entropy_seed);
        let state = state.with_seed(seed);
        info!(seed, language = %state.language, "Building site");

        let builder = SiteBuilder::new(self.config.clone(), &options.root, &options.out);
        builder.build(&catalog, &state, &mut SeededRng::new(seed))
    }

    pub fn pack(&self, options: &PackOptions) -> Result<PackOutput> {
        let catalog = Catalog::load(&options.catalog)?;
        let filter = options
            .filter
            .clone()
            .unwrap_or_else(|| self.render_state().filter);

        let mut layout = self.config.grid.clone();
        if let Some(width) = options.width {
            layout.container_width = width;
        }

        let probe = MediaProbe::with_cache(
            &options.root,
            self.config.probe.workers,
            ProbeCache::new(self.config.probe.cache_capacity),
        );
        let projects = catalog.filtered(&filter);
        let items = Catalog::grid_items(&projects, &probe);

        let seed = options.seed.unwrap_or_else(entropy_seed);
        let rows = layout
            .compute(&items, &mut SeededRng::new(seed))
            .with_context(|| format!("Failed to pack {} projects", items.len()))?;

        Ok(PackOutput {
            seed,
            filter: filter.key().to_string(),
            container_width: layout.container_width,
            grid_unit: layout.grid_unit,
            rows,
        })
    }

    pub fn set_language(&mut self, language: Language) -> Result<()> {
        self.store
            .set(LANGUAGE_KEY, language.code())
            .context("Failed to save language")
    }

    pub fn set_filter(&mut self, filter: Filter) -> Result<()> {
        let saved = match &filter {
            Filter::All => self.store.remove(FILTER_KEY),
            Filter::Category(key) => self.store.set(FILTER_KEY, key),
        };
        saved.context("Failed to save filter")
    }

    pub fn clear_state(&mut self) -> Result<()> {
        self.store.remove(LANGUAGE_KEY)?;
        self.store.remove(FILTER_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryStore;
    use tempfile::tempdir;

    fn app() -> FolioApp {
        FolioApp::new(SiteConfig::default(), Box::new(MemoryStore::default()))
    }

    fn write_catalog(dir: &Path) -> PathBuf {
        let path = dir.join("projects.json");
        std::fs::write(
            &path,
            r#"[
                {"id": "1", "category": "objects"},
                {"id": "2", "category": "objects"},
                {"id": "3", "category": "research"},
                {"id": "4", "category": "objects"},
                {"id": "5", "category": "objects"},
                {"id": "6", "category": "objects"}
            ]"#,
        )
        .unwrap();
        path
    }

    #[test]
    fn test_state_commands() {
        let mut app = app();
        assert_eq!(app.render_state(), RenderState::default());

        app.set_language(Language::En).unwrap();
        app.set_filter(Filter::Category("objects".into())).unwrap();
        let state = app.render_state();
        assert_eq!(state.language, Language::En);
        assert_eq!(state.filter, Filter::Category("objects".into()));

        app.clear_state().unwrap();
        assert_eq!(app.render_state(), RenderState::default());
    }

    #[test]
    fn test_set_filter_leaves_language_unset() {
        let mut config = SiteConfig::default();
        config.site.default_language = Language::En;
        let mut app = FolioApp::new(config, Box::new(MemoryStore::default()));

        app.set_filter(Filter::Category("research".into())).unwrap();
        assert_eq!(app.store.get(LANGUAGE_KEY), None);
        assert_eq!(app.store.get(FILTER_KEY).as_deref(), Some("research"));

        app.set_filter(Filter::All).unwrap();
        assert_eq!(app.store.get(FILTER_KEY), None);
        assert_eq!(app.render_state().filter, Filter::All);
    }

    #[test]
    fn test_configured_default_language() {
        let mut config = SiteConfig::default();
        config.site.default_language = Language::En;
        let mut app = FolioApp::new(config, Box::new(MemoryStore::default()));
        assert_eq!(app.render_state().language, Language::En);
        app.set_language(Language::De).unwrap();
        assert_eq!(app.render_state().language, Language::De);
    }

    #[test]
    fn test_pack_is_reproducible() {
        let dir = tempdir().unwrap();
        let catalog = write_catalog(dir.path());
        let app = app();
        let options = PackOptions {
            catalog,
            root: dir.path().to_path_buf(),
            filter: None,
            seed: Some(99),
            width: None,
        };

        let first = app.pack(&options).unwrap();
        let second = app.pack(&options).unwrap();
        assert_eq!(first.rows, second.rows);
        assert_eq!(first.seed, 99);
        assert_eq!(first.filter, "all");
        let ids: usize = first.rows.iter().map(|r| r.len()).sum();
        assert_eq!(ids, 6);
    }

    #[test]
    fn test_pack_with_filter_and_width() {
        let dir = tempdir().unwrap();
        let catalog = write_catalog(dir.path());
        let options = PackOptions {
            catalog,
            root: dir.path().to_path_buf(),
            filter: Some(Filter::Category("objects".into())),
            seed: Some(1),
            width: Some(900),
        };
        let output = app().pack(&options).unwrap();
        assert_eq!(output.container_width, 900);
        for row in &output.rows {
            let gaps = (row.len() as i64 - 1) * 50;
            assert_eq!(row.total_width() + gaps, 900);
            assert!(row.items.iter().all(|item| item.id != "3"));
        }
    }

    #[test]
    fn test_build() {
        let dir = tempdir().unwrap();
        let catalog = write_catalog(dir.path());
        let out = dir.path().join("public");
        let report = app()
            .build(&BuildOptions {
                catalog,
                root: dir.path().to_path_buf(),
                out: out.clone(),
                seed: Some(3),
                language: Some(Language::En),
            })
            .unwrap();
        assert_eq!(report.project_pages, 6);
        let index = std::fs::read_to_string(out.join("index.html")).unwrap();
        assert!(index.contains("<html lang=\"en\">"));
    }

    #[test]
    fn test_missing_catalog() {
        let options = PackOptions {
            catalog: PathBuf::from("/nonexistent/projects.json"),
            root: PathBuf::from("."),
            filter: None,
            seed: Some(1),
            width: None,
        };
        assert!(app().pack(&options).is_err());
    }
}
