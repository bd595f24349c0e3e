//! Project catalog loading and grid item derivation.

pub mod probe;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::models::{GridItem, Project, FALLBACK_ASPECT_RATIO};
use crate::state::Filter;

pub use probe::{MediaProbe, ProbeCache, ProbeKey};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("project at position {0} has an empty id")]
    EmptyId(usize),
    #[error("duplicate project id {0:?}")]
    DuplicateId(String),
}

/// Previous/next projects around a catalog position.
#[derive(Debug, Clone, Copy, Default)]
pub struct Neighbours<'a> {
    pub previous: Option<&'a Project>,
    pub next: Option<&'a Project>,
}

/// Ordered, validated list of projects.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    projects: Vec<Project>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&content)?;
        info!(?path, projects = catalog.len(), "Loaded catalog");
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let projects: Vec<Project> = serde_json::from_str(json)?;
        Self::from_projects(projects)
    }

    pub fn from_projects(projects: Vec<Project>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(projects.len());
        for (position, project) in projects.iter().enumerate() {
            if project.id.trim().is_empty() {
                return Err(CatalogError::EmptyId(position));
            }
            if !seen.insert(project.id.as_str()) {
                return Err(CatalogError::DuplicateId(project.id.clone()));
            }
        }
        Ok(Self { projects })
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.projects.iter().position(|p| p.id == id)
    }

    /// Projects accepted by `filter`, in catalog order.
    pub fn filtered(&self, filter: &Filter) -> Vec<&Project> {
        self.projects
            .iter()
            .filter(|p| filter.accepts(p.category.as_deref()))
            .collect()
    }

    /// Distinct categories in order of first appearance.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.projects
            .iter()
            .filter_map(|p| p.category.as_deref())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Footer neighbours of the project at `index`. Without `wrap` the first
    /// project has no previous and the last has no next.
    pub fn neighbours(&self, index: usize, wrap: bool) -> Neighbours<'_> {
        let len = self.projects.len();
        if index >= len {
            return Neighbours::default();
        }
        if wrap {
            // A single project has no distinct neighbour.
            if len == 1 {
                return Neighbours::default();
            }
            return Neighbours {
                previous: self.projects.get((index + len - 1) % len),
                next: self.projects.get((index + 1) % len),
            };
        }
        Neighbours {
            previous: index.checked_sub(1).and_then(|i| self.projects.get(i)),
            next: self.projects.get(index + 1),
        }
    }

    /// Packer input for `projects`, one item each, in order. Media without
    /// usable dimensions gets the fallback aspect ratio.
    pub fn grid_items(projects: &[&Project], probe: &MediaProbe) -> Vec<GridItem> {
        let sources: Vec<Option<String>> = projects
            .iter()
            .map(|p| p.representative_image().map(str::to_string))
            .collect();
        let dims = probe.probe_all(&sources);

        projects
            .iter()
            .zip(dims)
            .map(|(project, dims)| match dims {
                Some((width, height)) => GridItem::from_dimensions(project.id.as_str(), width, height),
                None => {
                    debug!(id = %project.id, "Using fallback aspect ratio");
                    GridItem::new(project.id.as_str(), FALLBACK_ASPECT_RATIO)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const CATALOG: &str = r#"[
        {"id": "001", "category": "architecture", "thumbnail": "images/001.png",
         "de": {"title": "Haus"}, "en": {"title": "House"}},
        {"id": "002", "category": "objects", "images": ["images/002.png"]},
        {"id": "003", "category": "architecture", "thumbnail": "images/missing.jpg"},
        {"id": "004"}
    ]"#;

    #[test]
    fn test_from_json() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.get("002").unwrap().images.len(), 1);
        assert_eq!(catalog.position("004"), Some(3));
        assert_eq!(catalog.categories(), vec!["architecture", "objects"]);
    }

    #[test]
    fn test_validation() {
        let dup = Catalog::from_json(r#"[{"id": "1"}, {"id": "1"}]"#);
        assert!(matches!(dup, Err(CatalogError::DuplicateId(id)) if id == "1"));

        let empty = Catalog::from_json(r#"[{"id": "1"}, {"id": " "}]"#);
        assert!(matches!(empty, Err(CatalogError::EmptyId(1))));

        assert!(matches!(
            Catalog::from_json("{}"),
            Err(CatalogError::Json(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Catalog::load(Path::new("/nonexistent/projects.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn test_filtered_keeps_order() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let ids = |f: &Filter| -> Vec<String> {
            catalog.filtered(f).iter().map(|p| p.id.clone()).collect()
        };
        assert_eq!(ids(&Filter::All), vec!["001", "002", "003", "004"]);
        assert_eq!(
            ids(&Filter::Category("architecture".into())),
            vec!["001", "003"]
        );
        assert!(ids(&Filter::Category("research".into())).is_empty());
    }

    #[test]
    fn test_neighbours() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let id = |p: Option<&Project>| p.map(|p| p.id.clone());

        let first = catalog.neighbours(0, false);
        assert_eq!(id(first.previous), None);
        assert_eq!(id(first.next).as_deref(), Some("002"));

        let last = catalog.neighbours(3, false);
        assert_eq!(id(last.previous).as_deref(), Some("003"));
        assert_eq!(id(last.next), None);

        let wrapped = catalog.neighbours(0, true);
        assert_eq!(id(wrapped.previous).as_deref(), Some("004"));
        let wrapped = catalog.neighbours(3, true);
        assert_eq!(id(wrapped.next).as_deref(), Some("001"));

        assert!(catalog.neighbours(10, true).next.is_none());
    }

    #[test]
    fn test_single_project_has_no_neighbours() {
        let catalog = Catalog::from_json(r#"[{"id": "1"}]"#).unwrap();
        let n = catalog.neighbours(0, true);
        assert!(n.previous.is_none() && n.next.is_none());
    }

    #[test]
    fn test_grid_items_apply_fallback() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        image::RgbImage::new(40, 20)
            .save(dir.path().join("images/001.png"))
            .unwrap();
        image::RgbImage::new(10, 20)
            .save(dir.path().join("images/002.png"))
            .unwrap();

        let catalog = Catalog::from_json(CATALOG).unwrap();
        let projects = catalog.filtered(&Filter::All);
        let probe = MediaProbe::new(dir.path());
        let items = Catalog::grid_items(&projects, &probe);

        let ratios: Vec<f64> = items.iter().map(|i| i.aspect_ratio).collect();
        assert_eq!(ratios, vec![2.0, 0.5, 1.0, 1.0]);
        assert_eq!(items[2].id, "003");
    }
}
