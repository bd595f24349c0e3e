// Input mapping for the gallery overlay
//
// Keybindings (only while the overlay is open):
// - Escape / ArrowDown: Close
// - ArrowRight: Next item
// - ArrowLeft: Previous item
//
// Touch: a horizontal swipe longer than the threshold moves (left = next,
// right = previous), a downward vertical swipe closes.

use super::GalleryCommand;

/// Default minimum swipe distance in CSS pixels.
pub const DEFAULT_SWIPE_THRESHOLD: f64 = 50.0;

/// Maps a DOM `KeyboardEvent.key` value to a gallery command.
pub fn command_for_key(key: &str) -> Option<GalleryCommand> {
    match key {
        "Escape" | "ArrowDown" => Some(GalleryCommand::Close),
        "ArrowRight" => Some(GalleryCommand::Next),
        "ArrowLeft" => Some(GalleryCommand::Prev),
        _ => None,
    }
}

/// A completed touch gesture, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swipe {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

impl Swipe {
    pub fn new(start: (f64, f64), end: (f64, f64)) -> Self {
        Self { start, end }
    }

    pub fn delta(&self) -> (f64, f64) {
        (self.end.0 - self.start.0, self.end.1 - self.start.1)
    }

    pub fn command(&self, threshold: f64) -> Option<GalleryCommand> {
        let (dx, dy) = self.delta();
        if dx.abs() > dy.abs() {
            if dx.abs() <= threshold {
                None
            } else if dx < 0.0 {
                Some(GalleryCommand::Next)
            } else {
                Some(GalleryCommand::Prev)
            }
        } else if dy > threshold {
            Some(GalleryCommand::Close)
        } else {
            None
        }
    }
}
