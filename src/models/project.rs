use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::Language;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default)]
    pub title: String,
    /// May contain inline HTML (links, line breaks).
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturedVideo {
    pub src: String,
    #[serde(default)]
    pub poster: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Year {
    Number(i64),
    Text(String),
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Year::Number(n) => write!(f, "{n}"),
            Year::Text(s) => f.write_str(s),
        }
    }
}

/// One record of the project catalog (`projects.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub video: Option<FeaturedVideo>,
    #[serde(default)]
    pub year: Option<Year>,
    #[serde(default)]
    pub de: Option<LocalizedText>,
    #[serde(default)]
    pub en: Option<LocalizedText>,
}

impl Project {
    pub fn text(&self, language: Language) -> Option<&LocalizedText> {
        let own = match language {
            Language::De => self.de.as_ref(),
            Language::En => self.en.as_ref(),
        };
        own.or(self.en.as_ref())
    }

    /// Title in the given language, else English, else the id.
    pub fn display_title(&self, language: Language) -> &str {
        let own = match language {
            Language::De => self.de.as_ref(),
            Language::En => self.en.as_ref(),
        };
        non_empty_title(own)
            .or_else(|| non_empty_title(self.en.as_ref()))
            .unwrap_or(self.id.as_str())
    }

    pub fn description(&self, language: Language) -> &str {
        self.text(language)
            .map(|t| t.description.as_str())
            .unwrap_or("")
    }

    /// The image the grid derives the aspect ratio from.
    pub fn representative_image(&self) -> Option<&str> {
        self.thumbnail
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.images.first().map(String::as_str))
    }

    pub fn in_category(&self, category: &str) -> bool {
        self.category.as_deref() == Some(category)
    }

    /// Every local media path the project references.
    pub fn media_paths(&self) -> impl Iterator<Item = &str> {
        let video = self
            .video
            .iter()
            .flat_map(|v| std::iter::once(v.src.as_str()).chain(v.poster.as_deref()));
        self.thumbnail
            .as_deref()
            .into_iter()
            .chain(video)
            .chain(self.images.iter().map(String::as_str))
            .filter(|p| !is_remote(p))
    }
}

fn non_empty_title(text: Option<&LocalizedText>) -> Option<&str> {
    text.map(|t| t.title.as_str()).filter(|t| !t.is_empty())
}

pub fn is_remote(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(json: &str) -> Project {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_full_record() {
        let p = project(
            r#"{
                "id": "023",
                "category": "architecture",
                "thumbnail": "images/023/thumb.jpg",
                "images": ["images/023/01.jpg", "images/023/02.jpg"],
                "video": {"src": "videos/023.mp4", "poster": "images/023/poster.jpg"},
                "year": 2021,
                "de": {"title": "Haus am See", "description": "Ein Haus."},
                "en": {"title": "House by the Lake", "description": "A house."}
            }"#,
        );
        assert_eq!(p.id, "023");
        assert_eq!(p.year, Some(Year::Number(2021)));
        assert_eq!(p.display_title(Language::De), "Haus am See");
        assert_eq!(p.display_title(Language::En), "House by the Lake");
        assert_eq!(p.representative_image(), Some("images/023/thumb.jpg"));
        assert!(p.in_category("architecture"));
        assert_eq!(p.media_paths().count(), 5);
    }

    #[test]
    fn test_title_fallbacks() {
        let only_en = project(r#"{"id": "7", "en": {"title": "Chair"}}"#);
        assert_eq!(only_en.display_title(Language::De), "Chair");

        let empty_de = project(r#"{"id": "8", "de": {"title": ""}, "en": {"title": "Lamp"}}"#);
        assert_eq!(empty_de.display_title(Language::De), "Lamp");

        let none = project(r#"{"id": "9"}"#);
        assert_eq!(none.display_title(Language::En), "9");
        assert_eq!(none.description(Language::De), "");
    }

    #[test]
    fn test_representative_image_falls_back_to_first_image() {
        let p = project(r#"{"id": "1", "images": ["a.jpg", "b.jpg"]}"#);
        assert_eq!(p.representative_image(), Some("a.jpg"));

        let none = project(r#"{"id": "2"}"#);
        assert_eq!(none.representative_image(), None);
    }

    #[test]
    fn test_year_as_text() {
        let p = project(r#"{"id": "1", "year": "2019–2020"}"#);
        assert_eq!(p.year.unwrap().to_string(), "2019–2020");
    }

    #[test]
    fn test_remote_media_not_listed() {
        let p = project(
            r#"{"id": "1", "images": ["a.jpg", "https://player.vimeo.com/video/1"]}"#,
        );
        let paths: Vec<&str> = p.media_paths().collect();
        assert_eq!(paths, vec!["a.jpg"]);
    }
}
