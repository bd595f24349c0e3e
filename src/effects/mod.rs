//! Decorative hover effects, modelled as small clock-driven state machines.
//!
//! The browser scripts own drawing; these types own the timing rules and are
//! what the site generator serializes into page data attributes.

pub mod depixelate;
pub mod trail;

use serde::{Deserialize, Serialize};

pub use depixelate::{Depixelate, DepixelatePhase, DepixelateSettings};
pub use trail::{PixelTrail, TrailCell, TrailSettings};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
    pub depixelate: DepixelateSettings,
    pub trail: TrailSettings,
}
