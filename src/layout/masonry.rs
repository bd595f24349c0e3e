use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use super::random::RandomSource;
use crate::models::{GridItem, PlacedItem, RowModel};

#[derive(Debug, Error, PartialEq)]
pub enum PackError {
    #[error("container width must be positive")]
    InvalidContainerWidth,
    #[error("grid unit must be positive")]
    InvalidGridUnit,
    #[error("invalid row sizes: min {min}, max {max}")]
    InvalidRowSizes { min: usize, max: usize },
    #[error("invalid jitter range [{min}, {max}]")]
    InvalidJitter { min: f64, max: f64 },
    #[error("item {id:?} has invalid aspect ratio {value}")]
    InvalidAspectRatio { id: String, value: f64 },
    #[error("row {row_index} has zero total weight")]
    DegenerateWeights { row_index: u32 },
}

/// Per-render random multiplier range applied to each item's aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JitterRange {
    pub min: f64,
    pub max: f64,
}

impl Default for JitterRange {
    fn default() -> Self {
        Self { min: 0.6, max: 1.4 }
    }
}

impl JitterRange {
    /// A range that always yields `value`.
    pub fn fixed(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }
}

/// Configuration for the masonry row packer.
///
/// Rows hold `min_row_size..=max_row_size` items separated by one grid unit of
/// gap; item widths follow jittered aspect ratios and snap to the grid unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasonryLayout {
    /// Total row width in pixels (default: 1200)
    pub container_width: u32,
    /// Snapping increment and inter-item gap in pixels (default: 50)
    pub grid_unit: u32,
    /// Smallest regular row (default: 3)
    pub min_row_size: usize,
    /// Largest row (default: 4)
    pub max_row_size: usize,
    /// Width floor per item, in grid units (default: 4)
    pub min_item_width_units: u32,
    /// Jitter multiplier range (default: 0.6..1.4)
    pub jitter: JitterRange,
}

impl Default for MasonryLayout {
    fn default() -> Self {
        Self {
            container_width: 1200,
            grid_unit: 50,
            min_row_size: 3,
            max_row_size: 4,
            min_item_width_units: 4,
            jitter: JitterRange::default(),
        }
    }
}

impl MasonryLayout {
    pub fn validate(&self) -> Result<(), PackError> {
        if self.container_width == 0 {
            return Err(PackError::InvalidContainerWidth);
        }
        if self.grid_unit == 0 {
            return Err(PackError::InvalidGridUnit);
        }
        if self.min_row_size == 0 || self.min_row_size > self.max_row_size {
            return Err(PackError::InvalidRowSizes {
                min: self.min_row_size,
                max: self.max_row_size,
            });
        }
        let JitterRange { min, max } = self.jitter;
        if !min.is_finite() || !max.is_finite() || min <= 0.0 || min > max {
            return Err(PackError::InvalidJitter { min, max });
        }
        Ok(())
    }

    /// Row width left after reserving one grid unit between adjacent items.
    pub fn available_width(&self, count: usize) -> i64 {
        let gaps = count.saturating_sub(1) as i64;
        self.container_width as i64 - gaps * self.grid_unit as i64
    }

    fn min_item_width(&self) -> i64 {
        self.min_item_width_units as i64 * self.grid_unit as i64
    }

    fn draw_row_size(&self, rng: &mut dyn RandomSource) -> usize {
        rng.next_usize_inclusive(self.min_row_size, self.max_row_size)
    }

    fn draw_jitter(&self, rng: &mut dyn RandomSource) -> f64 {
        rng.next_f64_in(self.jitter.min, self.jitter.max)
    }

    /// Number of items the next row takes, given how many are left.
    fn row_size(&self, remaining: usize, drawn: usize) -> usize {
        if remaining <= self.max_row_size {
            // Tail: everything left goes into one final row.
            return remaining;
        }
        if remaining - drawn == 1 {
            // The next row would be a single orphan.
            return drawn.saturating_sub(1).max(1);
        }
        drawn
    }

    /// Partitions `items` into rows and sizes every item.
    ///
    /// # Algorithm
    /// 1. Draw a row size, then apply tail and look-ahead corrections so no
    ///    row after the first ends up with a single item.
    /// 2. Weight each item by `aspect_ratio * jitter`.
    /// 3. Split the row's available width by weight, snap to the grid unit and
    ///    clamp to the width floor.
    /// 4. Fold the remaining drift into the widest item; display order is kept.
    ///
    /// Draw order is one row-size draw per row followed by one jitter draw per
    /// item, so a fixed random sequence reproduces the same grid.
    ///
    /// # Errors
    /// Invalid configuration or any non-positive aspect ratio rejects the whole
    /// input; no partial grid is produced.
    pub fn compute(
        &self,
        items: &[GridItem],
        rng: &mut dyn RandomSource,
    ) -> Result<Vec<RowModel>, PackError> {
        self.validate()?;
        if let Some(bad) = items.iter().find(|item| !item.has_valid_aspect_ratio()) {
            return Err(PackError::InvalidAspectRatio {
                id: bad.id.clone(),
                value: bad.aspect_ratio,
            });
        }

        let mut rows = Vec::new();
        let mut cursor = 0usize;
        let mut row_index = 0u32;

        while cursor < items.len() {
            let remaining = items.len() - cursor;
            let drawn = self.draw_row_size(rng);
            let count = self.row_size(remaining, drawn);

            let row_items = &items[cursor..cursor + count];
            let weights: Vec<f64> = row_items
                .iter()
                .map(|item| item.aspect_ratio * self.draw_jitter(rng))
                .collect();

            rows.push(self.size_row(row_index, row_items, &weights)?);
            trace!(row_index, drawn, count, remaining, "Packed row");

            cursor += count;
            row_index += 1;
        }

        debug!(items = items.len(), rows = rows.len(), "Computed masonry layout");
        Ok(rows)
    }

    fn size_row(
        &self,
        row_index: u32,
        items: &[GridItem],
        weights: &[f64],
    ) -> Result<RowModel, PackError> {
        let available = self.available_width(items.len());
        let total_weight: f64 = weights.iter().sum();
        if total_weight <= 0.0 || !total_weight.is_finite() {
            return Err(PackError::DegenerateWeights { row_index });
        }

        let unit = self.grid_unit as f64;
        let floor = self.min_item_width();
        let mut placed: Vec<PlacedItem> = items
            .iter()
            .zip(weights)
            .map(|(item, weight)| {
                let raw = weight / total_weight * available as f64;
                let snapped = ((raw / unit).round() * unit) as i64;
                PlacedItem {
                    id: item.id.clone(),
                    width: snapped.max(floor),
                    aspect_ratio: item.aspect_ratio,
                }
            })
            .collect();

        let allocated: i64 = placed.iter().map(|p| p.width).sum();
        let drift = available - allocated;

        // First of the widest wins ties, as a stable descending sort would.
        let widest = placed
            .iter()
            .enumerate()
            .fold(0, |best, (i, p)| if p.width > placed[best].width { i } else { best });
        placed[widest].width += drift;

        Ok(RowModel::new(row_index, placed, drift, widest))
    }

    /// Computes row breaks (start, end) without keeping the sized items.
    pub fn compute_breaks(
        &self,
        items: &[GridItem],
        rng: &mut dyn RandomSource,
    ) -> Result<Vec<RowBreak>, PackError> {
        let rows = self.compute(items, rng)?;
        let mut start = 0usize;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let end = start + row.items.len();
            out.push(RowBreak {
                start_index: start,
                end_index: end,
            });
            start = end;
        }
        Ok(out)
    }

    /// Total rendered height of all rows, each as tall as its tallest item.
    pub fn total_height(&self, rows: &[RowModel], row_gap: u32) -> i64 {
        if rows.is_empty() {
            return 0;
        }
        let heights: i64 = rows
            .iter()
            .map(|row| {
                row.items
                    .iter()
                    .map(|item| item.snapped_height(self.grid_unit))
                    .max()
                    .unwrap_or(0)
            })
            .sum();
        heights + rows.len().saturating_sub(1) as i64 * row_gap as i64
    }
}

/// Index range of one packed row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowBreak {
    /// Start index in the items array (inclusive)
    pub start_index: usize,
    /// End index in the items array (exclusive)
    pub end_index: usize,
}
