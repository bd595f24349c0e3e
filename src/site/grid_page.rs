//! Grid page rendering.
//!
//! `grid_view` is the pure render step: catalog slice + probed items +
//! render state in, fully sized view model out. The template only formats it.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use super::{nav_view, render_template, NavView, ScriptTag};
use crate::config::SiteConfig;
use crate::gallery::asset::root_absolute;
use crate::layout::{PackError, RandomSource};
use crate::models::{GridItem, Project, RowModel};
use crate::state::{Filter, Language, RenderState};

const GRID_TEMPLATE: &str = include_str!("templates/grid.html.mustache");

#[derive(Debug, Clone, Serialize)]
pub struct GridItemView {
    pub id: String,
    pub width: i64,
    pub height: i64,
    pub href: String,
    pub has_src: bool,
    pub src: String,
    /// Title in the active language.
    pub title: String,
    pub title_de: String,
    pub title_en: String,
    /// Resolution of the static pixelated preview.
    pub preview_resolution: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridRowView {
    pub row_index: u32,
    pub items: Vec<GridItemView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridView {
    pub lang: &'static str,
    pub filter: String,
    pub page_title: String,
    pub container_width: u32,
    pub grid_unit: u32,
    pub total_height: i64,
    pub depixelate_steps: String,
    pub depixelate_interval_ms: u64,
    pub trail_cell_size: u32,
    pub trail_fade_ms: u64,
    pub rows: Vec<GridRowView>,
    #[serde(skip)]
    pub nav: NavView,
}

impl GridView {
    pub fn item_count(&self) -> usize {
        self.rows.iter().map(|r| r.items.len()).sum()
    }
}

/// Packs `items` and decorates each placed item with its project's data.
///
/// `projects` and `items` must describe the same projects; items without a
/// matching project are rendered with their id as title.
pub fn grid_view(
    projects: &[&Project],
    items: &[GridItem],
    config: &SiteConfig,
    state: &RenderState,
    rng: &mut dyn RandomSource,
) -> Result<GridView, PackError> {
    let layout = &config.grid;
    let rows = layout.compute(items, rng)?;
    let total_height = layout.total_height(&rows, layout.grid_unit);

    let by_id: HashMap<&str, &Project> = projects.iter().map(|p| (p.id.as_str(), *p)).collect();
    let preview_resolution = config
        .effects
        .depixelate
        .steps
        .first()
        .copied()
        .unwrap_or(0);

    let row_views = rows
        .iter()
        .map(|row| row_view(row, &by_id, layout.grid_unit, state.language, preview_resolution))
        .collect();

    let site = &config.site;
    let page_title = match &state.filter {
        Filter::All => site.artist.clone(),
        Filter::Category(key) => {
            let label = site
                .category(key)
                .map(|c| c.label(state.language).to_string())
                .unwrap_or_else(|| key.clone());
            format!("{} – {}", label, site.artist)
        }
    };

    debug!(filter = %state.filter, rows = rows.len(), "Rendered grid view");
    Ok(GridView {
        lang: state.language.code(),
        filter: state.filter.key().to_string(),
        page_title,
        container_width: layout.container_width,
        grid_unit: layout.grid_unit,
        total_height,
        depixelate_steps: config
            .effects
            .depixelate
            .steps
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(","),
        depixelate_interval_ms: config.effects.depixelate.interval_ms,
        trail_cell_size: config.effects.trail.cell_size,
        trail_fade_ms: config.effects.trail.fade_ms,
        rows: row_views,
        nav: nav_view(site, state),
    })
}

fn row_view(
    row: &RowModel,
    by_id: &HashMap<&str, &Project>,
    grid_unit: u32,
    language: Language,
    preview_resolution: u32,
) -> GridRowView {
    let items = row
        .items
        .iter()
        .map(|placed| {
            let project = by_id.get(placed.id.as_str());
            let title = |lang: Language| {
                project
                    .map(|p| p.display_title(lang).to_string())
                    .unwrap_or_else(|| placed.id.clone())
            };
            let src = project
                .and_then(|p| p.representative_image())
                .map(root_absolute);
            GridItemView {
                id: placed.id.clone(),
                width: placed.width,
                height: placed.snapped_height(grid_unit),
                href: project_href(&placed.id),
                has_src: src.is_some(),
                src: src.unwrap_or_default(),
                title: title(language),
                title_de: title(Language::De),
                title_en: title(Language::En),
                preview_resolution,
            }
        })
        .collect();
    GridRowView {
        row_index: row.row_index,
        items,
    }
}

pub fn project_href(id: &str) -> String {
    format!("/projects/{}.html", id)
}

#[derive(Serialize)]
struct GridPageContext<'a> {
    #[serde(flatten)]
    view: &'a GridView,
    nav: String,
    scripts: Vec<ScriptTag>,
}

pub fn render_grid_page(view: &GridView, config: &SiteConfig) -> anyhow::Result<String> {
    let context = GridPageContext {
        view,
        nav: super::render_nav(&view.nav)?,
        scripts: ScriptTag::list(&config.site.scripts),
    };
    render_template(GRID_TEMPLATE, &context)
}
