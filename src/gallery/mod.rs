//! Full-screen gallery model.
//!
//! One `Gallery` serves every project page. Opening shows the chosen item at
//! full scale; moving to another item raises it to the top of a bounded stack
//! of already-shown items and gives it a random scale, so earlier items stay
//! visible underneath.

pub mod asset;
pub mod input;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::layout::RandomSource;

pub use asset::MediaAsset;
pub use input::{command_for_key, Swipe, DEFAULT_SWIPE_THRESHOLD};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GalleryError {
    #[error("gallery index {index} out of range (gallery has {len} items)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("stack limit must be at least 1")]
    InvalidStackLimit,
    #[error("invalid scale range [{min}, {max})")]
    InvalidScaleRange { min: f64, max: f64 },
    #[error("swipe threshold must be a non-negative finite number, got {0}")]
    InvalidSwipeThreshold(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GallerySettings {
    /// Maximum number of items kept on the stack.
    pub stack_limit: usize,
    /// Minimum swipe distance in pixels.
    pub swipe_threshold: f64,
    pub scale_min: f64,
    pub scale_max: f64,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            stack_limit: 10,
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            scale_min: 0.80,
            scale_max: 1.05,
        }
    }
}

impl GallerySettings {
    pub fn validate(&self) -> Result<(), GalleryError> {
        if self.stack_limit == 0 {
            return Err(GalleryError::InvalidStackLimit);
        }
        if !self.swipe_threshold.is_finite() || self.swipe_threshold < 0.0 {
            return Err(GalleryError::InvalidSwipeThreshold(self.swipe_threshold));
        }
        let (min, max) = (self.scale_min, self.scale_max);
        if !min.is_finite() || !max.is_finite() || min <= 0.0 || min > max {
            return Err(GalleryError::InvalidScaleRange { min, max });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryCommand {
    Open(usize),
    Close,
    Next,
    Prev,
}

/// An item currently on the stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackEntry {
    pub index: usize,
    pub scale: f64,
}

#[derive(Debug, Clone)]
pub struct Gallery {
    assets: Vec<MediaAsset>,
    settings: GallerySettings,
    current: Option<usize>,
    /// Bottom first, the shown item last.
    stack: Vec<StackEntry>,
}

impl Gallery {
    pub fn new(assets: Vec<MediaAsset>, settings: GallerySettings) -> Result<Self, GalleryError> {
        settings.validate()?;
        Ok(Self {
            assets,
            settings,
            current: None,
            stack: Vec::new(),
        })
    }

    pub fn assets(&self) -> &[MediaAsset] {
        &self.assets
    }

    pub fn settings(&self) -> &GallerySettings {
        &self.settings
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&MediaAsset> {
        self.current.and_then(|i| self.assets.get(i))
    }

    pub fn stack(&self) -> &[StackEntry] {
        &self.stack
    }

    pub fn open(&mut self, index: usize, rng: &mut dyn RandomSource) -> Result<(), GalleryError> {
        if index >= self.assets.len() {
            return Err(GalleryError::IndexOutOfRange {
                index,
                len: self.assets.len(),
            });
        }
        debug!(index, "Opening gallery");
        self.stack.clear();
        self.current = Some(index);
        self.show(index, true, rng);
        Ok(())
    }

    pub fn close(&mut self) {
        if self.current.take().is_some() {
            debug!("Closing gallery");
        }
        self.stack.clear();
    }

    pub fn next(&mut self, rng: &mut dyn RandomSource) {
        self.step(1, rng);
    }

    pub fn prev(&mut self, rng: &mut dyn RandomSource) {
        self.step(-1, rng);
    }

    pub fn apply(
        &mut self,
        command: GalleryCommand,
        rng: &mut dyn RandomSource,
    ) -> Result<(), GalleryError> {
        match command {
            GalleryCommand::Open(index) => self.open(index, rng)?,
            GalleryCommand::Close => self.close(),
            GalleryCommand::Next => self.next(rng),
            GalleryCommand::Prev => self.prev(rng),
        }
        Ok(())
    }

    /// Keys are ignored while the gallery is closed.
    pub fn handle_key(&mut self, key: &str, rng: &mut dyn RandomSource) {
        if !self.is_open() {
            return;
        }
        if let Some(command) = command_for_key(key) {
            trace!(key, ?command, "Gallery key");
            // Close/Next/Prev never fail.
            let _ = self.apply(command, rng);
        }
    }

    pub fn handle_swipe(&mut self, swipe: Swipe, rng: &mut dyn RandomSource) {
        if !self.is_open() {
            return;
        }
        if let Some(command) = swipe.command(self.settings.swipe_threshold) {
            let _ = self.apply(command, rng);
        }
    }

    fn step(&mut self, delta: isize, rng: &mut dyn RandomSource) {
        let Some(current) = self.current else {
            return;
        };
        let len = self.assets.len();
        if len == 0 {
            return;
        }
        let index = if delta < 0 {
            (current + len - 1) % len
        } else {
            (current + 1) % len
        };
        self.current = Some(index);
        self.show(index, false, rng);
    }

    fn show(&mut self, index: usize, initial: bool, rng: &mut dyn RandomSource) {
        let is_new = match self.stack.iter().position(|e| e.index == index) {
            Some(pos) => {
                let entry = self.stack.remove(pos);
                self.stack.push(entry);
                false
            }
            None => {
                self.stack.push(StackEntry { index, scale: 1.0 });
                true
            }
        };

        let scale = if initial {
            1.0
        } else {
            rng.next_f64_in(self.settings.scale_min, self.settings.scale_max)
        };
        if let Some(top) = self.stack.last_mut() {
            top.scale = scale;
        }

        // The shown item is on top, so the bottom entry is never the current one.
        if is_new && self.stack.len() > self.settings.stack_limit {
            let evicted = self.stack.remove(0);
            trace!(index = evicted.index, "Evicted gallery stack entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{ScriptedSource, SeededRng};

    fn images(n: usize) -> Vec<MediaAsset> {
        (0..n)
            .map(|i| MediaAsset::Image {
                src: format!("/images/{}.jpg", i),
                alt: format!("View {}", i + 1),
            })
            .collect()
    }

    fn gallery(n: usize) -> Gallery {
        Gallery::new(images(n), GallerySettings::default()).unwrap()
    }

    fn indices(g: &Gallery) -> Vec<usize> {
        g.stack().iter().map(|e| e.index).collect()
    }

    #[test]
    fn test_open_and_close() {
        let mut g = gallery(3);
        let mut rng = SeededRng::new(1);
        assert!(!g.is_open());

        g.open(1, &mut rng).unwrap();
        assert_eq!(g.current_index(), Some(1));
        assert_eq!(g.stack(), &[StackEntry { index: 1, scale: 1.0 }]);

        g.close();
        assert!(!g.is_open());
        assert!(g.stack().is_empty());
    }

    #[test]
    fn test_open_out_of_range() {
        let mut g = gallery(2);
        let err = g.open(2, &mut SeededRng::new(1)).unwrap_err();
        assert_eq!(err, GalleryError::IndexOutOfRange { index: 2, len: 2 });
        assert!(!g.is_open());

        let mut empty = gallery(0);
        assert!(empty.open(0, &mut SeededRng::new(1)).is_err());
    }

    #[test]
    fn test_navigation_wraps() {
        let mut g = gallery(3);
        let mut rng = SeededRng::new(7);
        g.open(2, &mut rng).unwrap();
        g.next(&mut rng);
        assert_eq!(g.current_index(), Some(0));
        g.prev(&mut rng);
        assert_eq!(g.current_index(), Some(2));
        g.prev(&mut rng);
        assert_eq!(g.current_index(), Some(1));
    }

    #[test]
    fn test_navigation_ignored_when_closed() {
        let mut g = gallery(3);
        let mut rng = SeededRng::new(7);
        g.next(&mut rng);
        g.handle_key("ArrowRight", &mut rng);
        assert_eq!(g.current_index(), None);
        assert!(g.stack().is_empty());
    }

    #[test]
    fn test_scale_draws() {
        let mut g = gallery(3);
        let mut rng = ScriptedSource::new(vec![0.0, 0.5]);
        g.open(0, &mut rng).unwrap();
        g.next(&mut rng);
        assert!((g.stack()[1].scale - 0.80).abs() < 1e-9);
        g.next(&mut rng);
        assert!((g.stack()[2].scale - 0.925).abs() < 1e-9);
        // the opening item keeps its full scale
        assert_eq!(g.stack()[0].scale, 1.0);
    }

    #[test]
    fn test_revisit_raises_existing_entry() {
        let mut g = gallery(3);
        let mut rng = SeededRng::new(3);
        g.open(0, &mut rng).unwrap();
        g.next(&mut rng);
        g.next(&mut rng);
        assert_eq!(indices(&g), vec![0, 1, 2]);
        g.next(&mut rng);
        assert_eq!(indices(&g), vec![1, 2, 0]);
        assert_eq!(g.current_index(), Some(0));
    }

    #[test]
    fn test_stack_is_bounded() {
        let mut g = gallery(15);
        let mut rng = SeededRng::new(11);
        g.open(0, &mut rng).unwrap();
        for _ in 0..12 {
            g.next(&mut rng);
        }
        assert_eq!(g.stack().len(), 10);
        assert_eq!(indices(&g), (3..=12).collect::<Vec<_>>());
        assert_eq!(g.stack().last().map(|e| e.index), g.current_index());
        for entry in g.stack() {
            assert!(entry.scale >= 0.80 && entry.scale < 1.05);
        }
    }

    #[test]
    fn test_keys_and_swipes() {
        let mut g = gallery(4);
        let mut rng = SeededRng::new(5);
        g.open(0, &mut rng).unwrap();

        g.handle_key("ArrowLeft", &mut rng);
        assert_eq!(g.current_index(), Some(3));
        g.handle_swipe(Swipe::new((300.0, 0.0), (100.0, 10.0)), &mut rng);
        assert_eq!(g.current_index(), Some(0));
        g.handle_key("Enter", &mut rng);
        assert_eq!(g.current_index(), Some(0));
        g.handle_swipe(Swipe::new((0.0, 0.0), (0.0, 120.0)), &mut rng);
        assert!(!g.is_open());
    }

    #[test]
    fn test_apply() {
        let mut g = gallery(2);
        let mut rng = SeededRng::new(5);
        g.apply(GalleryCommand::Open(1), &mut rng).unwrap();
        g.apply(GalleryCommand::Next, &mut rng).unwrap();
        assert_eq!(g.current_index(), Some(0));
        g.apply(GalleryCommand::Close, &mut rng).unwrap();
        assert!(!g.is_open());
        assert!(g.apply(GalleryCommand::Open(5), &mut rng).is_err());
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = GallerySettings::default();
        assert!(settings.validate().is_ok());
        settings.stack_limit = 0;
        assert_eq!(settings.validate(), Err(GalleryError::InvalidStackLimit));

        let settings = GallerySettings {
            scale_min: 1.2,
            scale_max: 1.0,
            ..Default::default()
        };
        assert!(Gallery::new(Vec::new(), settings).is_err());
    }
}
