use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepixelateSettings {
    /// Horizontal pixel resolutions, coarsest first. The first one is the
    /// static preview shown before the animation starts.
    pub steps: Vec<u32>,
    pub interval_ms: u64,
}

impl Default for DepixelateSettings {
    fn default() -> Self {
        Self {
            steps: vec![4, 8, 16, 32],
            interval_ms: 150,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepixelatePhase {
    /// Drawn at this resolution.
    Pixelated(u32),
    /// Full-resolution image visible; the canvas is faded out.
    Loaded,
}

/// One image's de-pixelation run. Starts once, then advances one step per
/// interval until the full image shows.
#[derive(Debug, Clone)]
pub struct Depixelate {
    steps: Vec<u32>,
    interval: Duration,
    started: bool,
    elapsed: Duration,
}

impl Depixelate {
    pub fn new(settings: &DepixelateSettings) -> Self {
        Self {
            steps: settings.steps.clone(),
            interval: Duration::from_millis(settings.interval_ms),
            started: false,
            elapsed: Duration::ZERO,
        }
    }

    /// Triggers the animation. Returns false if it already ran.
    pub fn start(&mut self) -> bool {
        if self.started {
            return false;
        }
        self.started = true;
        self.elapsed = Duration::ZERO;
        true
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn tick(&mut self, dt: Duration) -> DepixelatePhase {
        if self.started {
            self.elapsed = self.elapsed.saturating_add(dt);
        }
        self.phase()
    }

    pub fn phase(&self) -> DepixelatePhase {
        if !self.started {
            return match self.steps.first() {
                Some(&step) => DepixelatePhase::Pixelated(step),
                None => DepixelatePhase::Loaded,
            };
        }
        if self.interval.is_zero() {
            return DepixelatePhase::Loaded;
        }
        // The next step is drawn as soon as the animation starts.
        let passed = (self.elapsed.as_nanos() / self.interval.as_nanos()) as usize;
        match self.steps.get(passed.saturating_add(1)) {
            Some(&step) => DepixelatePhase::Pixelated(step),
            None => DepixelatePhase::Loaded,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.phase() == DepixelatePhase::Loaded
    }

    /// Time from start until the image is loaded.
    pub fn total_duration(&self) -> Duration {
        let remaining = self.steps.len().saturating_sub(1) as u32;
        self.interval * remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_preview_before_start() {
        let mut d = Depixelate::new(&DepixelateSettings::default());
        assert_eq!(d.phase(), DepixelatePhase::Pixelated(4));
        // time does not pass until started
        assert_eq!(d.tick(ms(10_000)), DepixelatePhase::Pixelated(4));
    }

    #[test]
    fn test_steps_advance_per_interval() {
        let mut d = Depixelate::new(&DepixelateSettings::default());
        assert!(d.start());
        assert_eq!(d.phase(), DepixelatePhase::Pixelated(8));
        assert_eq!(d.tick(ms(149)), DepixelatePhase::Pixelated(8));
        assert_eq!(d.tick(ms(1)), DepixelatePhase::Pixelated(16));
        assert_eq!(d.tick(ms(150)), DepixelatePhase::Pixelated(32));
        assert!(!d.is_loaded());
        assert_eq!(d.tick(ms(150)), DepixelatePhase::Loaded);
        assert_eq!(d.total_duration(), ms(450));
    }

    #[test]
    fn test_large_tick_skips_to_loaded() {
        let mut d = Depixelate::new(&DepixelateSettings::default());
        d.start();
        assert_eq!(d.tick(ms(5_000)), DepixelatePhase::Loaded);
        assert!(d.is_loaded());
    }

    #[test]
    fn test_starts_once() {
        let mut d = Depixelate::new(&DepixelateSettings::default());
        assert!(d.start());
        d.tick(ms(200));
        assert!(!d.start());
        assert_eq!(d.phase(), DepixelatePhase::Pixelated(16));
    }

    #[test]
    fn test_degenerate_settings_end_loaded() {
        let empty = DepixelateSettings {
            steps: Vec::new(),
            interval_ms: 150,
        };
        assert!(Depixelate::new(&empty).is_loaded());

        let zero = DepixelateSettings {
            interval_ms: 0,
            ..Default::default()
        };
        let mut d = Depixelate::new(&zero);
        d.start();
        assert!(d.is_loaded());
    }
}
