//! folio: static portfolio site builder.
//!
//! The core is the masonry row packer in [`layout::masonry`]; the rest loads
//! the project catalog, models the browser-side behaviour (gallery, effects,
//! language/filter state) and renders the static pages.

pub mod app;
pub mod catalog;
pub mod config;
pub mod effects;
pub mod gallery;
pub mod layout;
pub mod models;
pub mod site;
pub mod state;
