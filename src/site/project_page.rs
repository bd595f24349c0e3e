//! Per-project detail pages.

use serde::Serialize;
use serde_json::json;

use super::{nav_view, render_template, NavView, ScriptTag};
use crate::catalog::Neighbours;
use crate::config::SiteConfig;
use crate::gallery::asset::root_absolute;
use crate::gallery::MediaAsset;
use crate::models::{is_remote, MediaType, Project};
use crate::state::{Label, Language, RenderState};

const PROJECT_TEMPLATE: &str = include_str!("templates/project.html.mustache");

/// Meta descriptions are cut to this many characters.
pub const META_DESCRIPTION_LIMIT: usize = 160;

#[derive(Debug, Clone, Serialize)]
pub struct LanguageBlock {
    pub code: &'static str,
    pub hidden: bool,
    pub id: String,
    pub title: String,
    /// Raw HTML from the catalog.
    pub description: String,
    pub has_year: bool,
    pub year: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThumbnailView {
    /// Gallery index opened by this thumbnail.
    pub index: usize,
    /// Display number, `<id>.<nn>`.
    pub number: String,
    pub src: String,
    pub alt: String,
    pub is_image: bool,
    pub is_video: bool,
    pub is_embed: bool,
    pub has_poster: bool,
    pub poster: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavLink {
    pub href: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectPage {
    pub id: String,
    pub lang: &'static str,
    pub site_name: String,
    pub page_title: String,
    pub meta_description: String,
    pub has_og_image: bool,
    pub og_image: String,
    pub json_ld: String,
    pub overlay_title: String,
    pub blocks: Vec<LanguageBlock>,
    pub thumbnails: Vec<ThumbnailView>,
    pub assets_json: String,
    pub gallery_settings_json: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<NavLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<NavLink>,
    #[serde(skip)]
    pub assets: Vec<MediaAsset>,
    #[serde(skip)]
    pub nav: NavView,
}

impl ProjectPage {
    pub fn new(
        project: &Project,
        neighbours: Neighbours<'_>,
        config: &SiteConfig,
        state: &RenderState,
    ) -> anyhow::Result<Self> {
        let site = &config.site;
        let language = state.language;
        let meta_description = meta_description(project.description(Language::En));
        let page_title = format!("{} – {}", project.display_title(Language::De), site.artist);

        let assets = MediaAsset::for_project(project, &site.credit());
        let thumbnails = thumbnails(&project.id, &assets);

        let og_image = project
            .representative_image()
            .map(|path| absolute_media_url(config, path));

        let year = project.year.as_ref().map(|y| y.to_string());
        let blocks = Language::ALL
            .iter()
            .map(|&lang| LanguageBlock {
                code: lang.code(),
                hidden: lang != language,
                id: project.id.clone(),
                title: project.display_title(lang).to_string(),
                description: project.description(lang).to_string(),
                has_year: year.is_some(),
                year: year.clone().unwrap_or_default(),
            })
            .collect();

        let link = |p: Option<&Project>, label: Label| {
            p.map(|p| NavLink {
                href: format!("{}.html", p.id),
                label: language.label(label).to_string(),
            })
        };

        Ok(Self {
            id: project.id.clone(),
            lang: language.code(),
            site_name: site.artist.to_lowercase(),
            page_title,
            meta_description: meta_description.clone(),
            has_og_image: og_image.is_some(),
            og_image: og_image.unwrap_or_default(),
            json_ld: script_safe(&serde_json::to_string_pretty(&json_ld(
                project,
                config,
                &meta_description,
            ))?),
            overlay_title: project.display_title(language).to_string(),
            blocks,
            thumbnails,
            assets_json: script_safe(&serde_json::to_string(&assets)?),
            gallery_settings_json: script_safe(&serde_json::to_string(&config.gallery)?),
            prev: link(neighbours.previous, Label::PreviousProject),
            next: link(neighbours.next, Label::NextProject),
            assets,
            nav: nav_view(site, state),
        })
    }

    pub fn render(&self, config: &SiteConfig) -> anyhow::Result<String> {
        #[derive(Serialize)]
        struct Context<'a> {
            #[serde(flatten)]
            page: &'a ProjectPage,
            nav: String,
            scripts: Vec<ScriptTag>,
        }

        let context = Context {
            page: self,
            nav: super::render_nav(&self.nav)?,
            scripts: ScriptTag::list(&config.site.scripts),
        };
        render_template(PROJECT_TEMPLATE, &context)
    }
}

fn thumbnails(id: &str, assets: &[MediaAsset]) -> Vec<ThumbnailView> {
    assets
        .iter()
        .enumerate()
        .map(|(index, asset)| {
            let kind = asset.kind();
            let poster = match asset {
                MediaAsset::Video { poster, .. } => poster.clone(),
                _ => None,
            };
            ThumbnailView {
                index,
                number: format!("{}.{:02}", id, index + 1),
                src: asset.src().to_string(),
                alt: asset.alt().unwrap_or_default().to_string(),
                is_image: kind == MediaType::Image,
                is_video: kind == MediaType::Video,
                is_embed: kind == MediaType::Embed,
                has_poster: poster.is_some(),
                poster: poster.unwrap_or_default(),
            }
        })
        .collect()
}

fn absolute_media_url(config: &SiteConfig, path: &str) -> String {
    if is_remote(path) {
        path.to_string()
    } else {
        config.site.absolute_url(&root_absolute(path))
    }
}

fn json_ld(project: &Project, config: &SiteConfig, description: &str) -> serde_json::Value {
    let images: Vec<String> = project
        .images
        .iter()
        .map(|img| absolute_media_url(config, img))
        .collect();
    let mut data = json!({
        "@context": "https://schema.org",
        "@type": "VisualArtwork",
        "name": project.display_title(Language::En),
        "artist": { "@type": "Person", "name": config.site.artist },
        "description": description,
        "image": images,
    });
    if let Some(year) = &project.year {
        data["yearCreated"] = serde_json::to_value(year).unwrap_or(serde_json::Value::Null);
    }
    data
}

/// Plain-text description for meta tags: tags removed, whitespace collapsed,
/// cut to [`META_DESCRIPTION_LIMIT`] characters with `...` when cut.
pub fn meta_description(html: &str) -> String {
    let text = strip_tags(html);
    if text.chars().count() <= META_DESCRIPTION_LIMIT {
        return text;
    }
    let mut cut: String = text.chars().take(META_DESCRIPTION_LIMIT).collect();
    cut.push_str("...");
    cut
}

/// Removes HTML tags. Tags become word breaks so `a<br>b` reads `a b`.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            _ => out.push(ch),
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keeps embedded JSON from closing its `<script>` element.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::state::Filter;

    fn catalog() -> Catalog {
        Catalog::from_json(
            r#"[
                {"id": "022", "thumbnail": "images/022/thumb.jpg", "images": ["images/022/01.jpg"],
                 "de": {"title": "Turm"}, "en": {"title": "Tower", "description": "Tall."}},
                {"id": "023", "category": "architecture", "thumbnail": "images/023/thumb.jpg",
                 "images": ["images/023/01.jpg", "https://player.vimeo.com/video/7"],
                 "video": {"src": "videos/023.mp4", "poster": "images/023/poster.jpg"},
                 "year": 2021,
                 "de": {"title": "Pavillon", "description": "Ein <a href=\"/x\">Pavillon</a>."},
                 "en": {"title": "Pavilion", "description": "A timber<br>pavilion."}}
            ]"#,
        )
        .unwrap()
    }

    fn page(index: usize, language: Language) -> ProjectPage {
        let catalog = catalog();
        let config = SiteConfig::default();
        let state = RenderState::new(language, Filter::All);
        let project = &catalog.projects()[index];
        ProjectPage::new(project, catalog.neighbours(index, false), &config, &state).unwrap()
    }

    #[test]
    fn test_meta_description() {
        assert_eq!(meta_description("A timber<br>pavilion."), "A timber pavilion.");
        assert_eq!(
            meta_description("See <a href=\"x\">this</a> now"),
            "See this now"
        );
        let long = "x".repeat(200);
        let cut = meta_description(&long);
        assert_eq!(cut.chars().count(), 163);
        assert!(cut.ends_with("..."));
        let exact = "ä".repeat(160);
        assert_eq!(meta_description(&exact), exact);
    }

    #[test]
    fn test_page_fields() {
        let page = page(1, Language::De);
        assert_eq!(page.page_title, "Pavillon – Folio");
        assert_eq!(page.meta_description, "A timber pavilion.");
        assert_eq!(page.og_image, "https://example.com/images/023/thumb.jpg");
        assert_eq!(page.overlay_title, "Pavillon");
        assert!(!page.blocks[0].hidden);
        assert!(page.blocks[1].hidden);
        assert_eq!(page.blocks[1].year, "2021");
    }

    #[test]
    fn test_thumbnails_numbered_from_video() {
        let page = page(1, Language::De);
        let numbers: Vec<&str> = page.thumbnails.iter().map(|t| t.number.as_str()).collect();
        assert_eq!(numbers, vec!["023.01", "023.02", "023.03"]);
        assert!(page.thumbnails[0].is_video);
        assert_eq!(page.thumbnails[0].poster, "/images/023/poster.jpg");
        assert_eq!(
            page.thumbnails[1].alt,
            "Pavilion - Architecture by Folio - View 2"
        );
        assert!(page.thumbnails[2].is_embed);
        assert_eq!(page.assets.len(), 3);
    }

    #[test]
    fn test_json_ld() {
        let page = page(1, Language::En);
        let value: serde_json::Value = serde_json::from_str(&page.json_ld).unwrap();
        assert_eq!(value["@type"], "VisualArtwork");
        assert_eq!(value["name"], "Pavilion");
        assert_eq!(value["artist"]["name"], "Folio");
        assert_eq!(value["yearCreated"], 2021);
        assert_eq!(value["image"][0], "https://example.com/images/023/01.jpg");
        assert_eq!(value["image"][1], "https://player.vimeo.com/video/7");

        let first = page_without_year();
        let value: serde_json::Value = serde_json::from_str(&first.json_ld).unwrap();
        assert!(value.get("yearCreated").is_none());
    }

    fn page_without_year() -> ProjectPage {
        page(0, Language::En)
    }

    #[test]
    fn test_footer_navigation() {
        let first = page(0, Language::De);
        assert!(first.prev.is_none());
        let next = first.next.as_ref().unwrap();
        assert_eq!(next.href, "023.html");
        assert_eq!(next.label, "Nächstes Projekt");

        let last = page(1, Language::En);
        assert!(last.next.is_none());
        assert_eq!(last.prev.as_ref().unwrap().label, "Previous Project");
    }

    #[test]
    fn test_render() {
        let config = SiteConfig::default();
        let html = page(1, Language::De).render(&config).unwrap();
        assert!(html.contains("<title>Pavillon – Folio</title>"));
        assert!(html.contains("data-lang-content=\"en\" style=\"display:none;\""));
        assert!(html.contains("Ein <a href=\"/x\">Pavillon</a>."));
        assert!(html.contains("023.02"));
        assert!(html.contains("window.galleryAssets = [{\"type\":\"video\""));
        assert!(html.contains("\"stack_limit\":10"));
        assert!(html.contains("id=\"prev-project-link\""));
        assert!(!html.contains("id=\"next-project-link\""));
    }
}
