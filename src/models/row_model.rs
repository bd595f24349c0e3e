use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedItem {
    pub id: String,
    /// Pixel width. A multiple of the grid unit except on the item that
    /// absorbed the row's rounding drift.
    pub width: i64,
    #[serde(skip)]
    pub aspect_ratio: f64,
}

impl PlacedItem {
    /// Height snapped to the grid unit, never below one unit.
    pub fn snapped_height(&self, grid_unit: u32) -> i64 {
        snap_height(self.width, self.aspect_ratio, grid_unit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowModel {
    pub row_index: u32,
    pub items: Vec<PlacedItem>,
    /// Rounding/clamping error that was folded into `items[drift_target]`.
    pub drift: i64,
    pub drift_target: usize,
}

impl RowModel {
    pub fn new(row_index: u32, items: Vec<PlacedItem>, drift: i64, drift_target: usize) -> Self {
        Self {
            row_index,
            items,
            drift,
            drift_target,
        }
    }

    /// Width of item `index` as it was before drift correction.
    pub fn snapped_width(&self, index: usize) -> i64 {
        let width = self.items[index].width;
        if index == self.drift_target {
            width - self.drift
        } else {
            width
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_width(&self) -> i64 {
        self.items.iter().map(|item| item.width).sum()
    }
}

pub fn snap_height(width: i64, aspect_ratio: f64, grid_unit: u32) -> i64 {
    let unit = grid_unit.max(1) as f64;
    let raw = width as f64 / aspect_ratio;
    let snapped = ((raw / unit).round() * unit) as i64;
    snapped.max(grid_unit as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(width: i64, aspect_ratio: f64) -> PlacedItem {
        PlacedItem {
            id: "x".into(),
            width,
            aspect_ratio,
        }
    }

    #[test]
    fn test_snapped_height() {
        // 400 / 1.5 = 266.7 -> 250
        assert_eq!(placed(400, 1.5).snapped_height(50), 250);
        // 350 / 0.5 = 700
        assert_eq!(placed(350, 0.5).snapped_height(50), 700);
    }

    #[test]
    fn test_snapped_height_floor() {
        // Very wide panorama collapses to a single unit
        assert_eq!(placed(200, 20.0).snapped_height(50), 50);
        assert_eq!(placed(-100, 1.0).snapped_height(50), 50);
    }

    #[test]
    fn test_row_total_width() {
        let row = RowModel::new(
            0,
            vec![placed(400, 1.0), placed(350, 1.0), placed(350, 1.0)],
            50,
            0,
        );
        assert_eq!(row.len(), 3);
        assert_eq!(row.total_width(), 1100);
        assert_eq!(row.snapped_width(0), 350);
        assert_eq!(row.snapped_width(1), 350);
    }
}
