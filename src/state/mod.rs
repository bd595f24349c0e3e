//! Render state shared by every grid and page render.
//!
//! - `Language` and `Filter` - the two user choices that survive reloads
//! - `RenderState` - explicit state object passed into render functions
//! - `KeyValueStore` - persistence seam (`MemoryStore`, `FileStore`)

pub mod store;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Store key for the language choice.
pub const LANGUAGE_KEY: &str = "userLanguage";
/// Store key for the grid filter.
pub const FILTER_KEY: &str = "filter";

#[derive(Debug, Error)]
pub enum StateError {
    #[error("unknown language {0:?} (expected \"de\" or \"en\")")]
    UnknownLanguage(String),
    #[error("filter must not be empty")]
    EmptyFilter,
    #[error("state store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("state store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    De,
    En,
}

/// Fixed interface strings that are not part of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    PreviousProject,
    NextProject,
    Projects,
    Info,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::De, Language::En];

    pub fn code(self) -> &'static str {
        match self {
            Language::De => "de",
            Language::En => "en",
        }
    }

    pub fn label(self, label: Label) -> &'static str {
        match (self, label) {
            (Language::De, Label::PreviousProject) => "Vorheriges Projekt",
            (Language::De, Label::NextProject) => "Nächstes Projekt",
            (Language::De, Label::Projects) => "projekte",
            (Language::En, Label::PreviousProject) => "Previous Project",
            (Language::En, Label::NextProject) => "Next Project",
            (Language::En, Label::Projects) => "projects",
            (_, Label::Info) => "info",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "de" => Ok(Language::De),
            "en" => Ok(Language::En),
            _ => Err(StateError::UnknownLanguage(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    #[default]
    All,
    Category(String),
}

impl Filter {
    pub fn key(&self) -> &str {
        match self {
            Filter::All => "all",
            Filter::Category(c) => c.as_str(),
        }
    }

    pub fn accepts(&self, category: Option<&str>) -> bool {
        match self {
            Filter::All => true,
            Filter::Category(c) => category == Some(c.as_str()),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Filter {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(StateError::EmptyFilter);
        }
        if s.eq_ignore_ascii_case("all") {
            Ok(Filter::All)
        } else {
            Ok(Filter::Category(s.to_string()))
        }
    }
}

/// Everything a grid render depends on besides the catalog itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderState {
    pub language: Language,
    pub filter: Filter,
    /// Fixed jitter seed; `None` draws a fresh one per render.
    pub seed: Option<u64>,
}

impl RenderState {
    pub fn new(language: Language, filter: Filter) -> Self {
        Self {
            language,
            filter,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Restores the persisted choices. Unreadable values fall back to defaults.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let language = store
            .get(LANGUAGE_KEY)
            .and_then(|v| match v.parse::<Language>() {
                Ok(lang) => Some(lang),
                Err(e) => {
                    warn!(value = %v, error = %e, "Ignoring stored language");
                    None
                }
            })
            .unwrap_or_default();
        let filter = store
            .get(FILTER_KEY)
            .and_then(|v| v.parse::<Filter>().ok())
            .unwrap_or_default();
        Self::new(language, filter)
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StateError> {
        store.set(LANGUAGE_KEY, self.language.code())?;
        match &self.filter {
            Filter::All => store.remove(FILTER_KEY)?,
            Filter::Category(c) => store.set(FILTER_KEY, c)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse() {
        assert_eq!("de".parse::<Language>().unwrap(), Language::De);
        assert_eq!(" EN ".parse::<Language>().unwrap(), Language::En);
        assert!("fr".parse::<Language>().is_err());
        assert_eq!(Language::default(), Language::De);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Language::De.label(Label::NextProject), "Nächstes Projekt");
        assert_eq!(Language::En.label(Label::PreviousProject), "Previous Project");
    }

    #[test]
    fn test_filter_parse_and_accept() {
        assert_eq!("all".parse::<Filter>().unwrap(), Filter::All);
        let objects: Filter = "objects".parse().unwrap();
        assert_eq!(objects, Filter::Category("objects".into()));
        assert!(objects.accepts(Some("objects")));
        assert!(!objects.accepts(Some("research")));
        assert!(!objects.accepts(None));
        assert!(Filter::All.accepts(None));
        assert!("  ".parse::<Filter>().is_err());
    }

    #[test]
    fn test_round_trip_through_store() {
        let mut store = MemoryStore::default();
        let state = RenderState::new(Language::En, Filter::Category("research".into()));
        state.save(&mut store).unwrap();

        let loaded = RenderState::load(&store);
        assert_eq!(loaded.language, Language::En);
        assert_eq!(loaded.filter, Filter::Category("research".into()));
        assert_eq!(loaded.seed, None);
    }

    #[test]
    fn test_saving_all_clears_filter() {
        let mut store = MemoryStore::default();
        store.set(FILTER_KEY, "objects").unwrap();
        RenderState::default().save(&mut store).unwrap();
        assert_eq!(store.get(FILTER_KEY), None);
        assert_eq!(store.get(LANGUAGE_KEY).as_deref(), Some("de"));
    }

    #[test]
    fn test_garbage_in_store_falls_back() {
        let mut store = MemoryStore::default();
        store.set(LANGUAGE_KEY, "klingon").unwrap();
        let loaded = RenderState::load(&store);
        assert_eq!(loaded, RenderState::default());
    }
}
