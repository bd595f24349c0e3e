use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailSettings {
    pub cell_size: u32,
    pub fade_ms: u64,
}

impl Default for TrailSettings {
    fn default() -> Self {
        Self {
            cell_size: 50,
            fade_ms: 1500,
        }
    }
}

/// A lit cell, in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailCell {
    pub x: i64,
    pub y: i64,
    pub born_ms: u64,
}

/// Cursor trail of grid-aligned cells that fade out.
///
/// Columns are measured from the grid's left edge (`offset_x`) so the trail
/// lines up with the masonry grid; rows from the document top.
#[derive(Debug, Clone)]
pub struct PixelTrail {
    settings: TrailSettings,
    offset_x: i64,
    last_cell: Option<(i64, i64)>,
    cells: Vec<TrailCell>,
}

impl PixelTrail {
    pub fn new(settings: TrailSettings) -> Self {
        Self {
            settings,
            offset_x: 0,
            last_cell: None,
            cells: Vec::new(),
        }
    }

    /// Sets the grid's left edge. Sub-pixel offsets are rounded.
    pub fn set_offset(&mut self, offset_x: f64) {
        self.offset_x = offset_x.round() as i64;
    }

    pub fn offset(&self) -> i64 {
        self.offset_x
    }

    pub fn cells(&self) -> &[TrailCell] {
        &self.cells
    }

    /// Records the cell under the pointer if it differs from the last one.
    pub fn pointer_moved(&mut self, client_x: f64, page_y: f64, now_ms: u64) -> bool {
        let size = self.settings.cell_size.max(1) as f64;
        let col = ((client_x - self.offset_x as f64) / size).floor() as i64;
        let row = (page_y / size).floor() as i64;
        if self.last_cell == Some((col, row)) {
            return false;
        }
        let size = size as i64;
        self.cells.push(TrailCell {
            x: col * size + self.offset_x,
            y: row * size,
            born_ms: now_ms,
        });
        self.last_cell = Some((col, row));
        true
    }

    /// Linear fade from 1 to 0 over the fade duration.
    pub fn opacity(&self, cell: &TrailCell, now_ms: u64) -> f64 {
        if self.settings.fade_ms == 0 {
            return 0.0;
        }
        let age = now_ms.saturating_sub(cell.born_ms) as f64;
        (1.0 - age / self.settings.fade_ms as f64).max(0.0)
    }

    /// Drops cells older than the fade duration.
    pub fn prune(&mut self, now_ms: u64) -> usize {
        let fade = self.settings.fade_ms;
        let before = self.cells.len();
        self.cells
            .retain(|cell| now_ms.saturating_sub(cell.born_ms) <= fade);
        before - self.cells.len()
    }

    /// Prunes, then returns every live cell with its opacity.
    pub fn frame(&mut self, now_ms: u64) -> Vec<(TrailCell, f64)> {
        self.prune(now_ms);
        self.cells
            .iter()
            .map(|cell| (*cell, self.opacity(cell, now_ms)))
            .collect()
    }
}

impl Default for PixelTrail {
    fn default() -> Self {
        Self::new(TrailSettings::default())
    }
}
