use crate::layout::{ElementLocator, Rect};

/// Configuration for the square-tile grid used by the picker screens.
///
/// Items are placed left-to-right, `columns` per row, with `spacing` between
/// tiles and between rows. Tile side follows the viewport width.
#[derive(Debug, Clone)]
pub struct GridLayout {
    /// Number of tiles per row (default: 4)
    pub columns: usize,
    /// Gap between tiles in points (default: 1)
    pub spacing: f64,
    /// Width the tiles are fitted into
    pub viewport_width: f64,
    /// Number of UI items, including any synthetic leading cell
    pub item_count: usize,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: 4,
            spacing: 1.0,
            viewport_width: 320.0,
            item_count: 0,
        }
    }
}

impl GridLayout {
    pub fn new(columns: usize, spacing: f64, viewport_width: f64) -> Self {
        Self {
            columns: columns.max(1),
            spacing: spacing.max(0.0),
            viewport_width,
            item_count: 0,
        }
    }

    pub fn with_item_count(mut self, item_count: usize) -> Self {
        self.item_count = item_count;
        self
    }

    /// Side length of one square tile.
    pub fn tile_side(&self) -> f64 {
        let columns = self.columns.max(1) as f64;
        let gaps = self.spacing * (columns - 1.0);
        ((self.viewport_width - gaps) / columns).max(1.0)
    }

    fn row_pitch(&self) -> f64 {
        self.tile_side() + self.spacing
    }

    pub fn row_count(&self) -> usize {
        self.item_count.div_ceil(self.columns.max(1))
    }

    pub fn content_height(&self) -> f64 {
        let rows = self.row_count();
        if rows == 0 {
            return 0.0;
        }
        rows as f64 * self.row_pitch() - self.spacing
    }

    /// Frame of the item at `index` in content coordinates.
    pub fn frame(&self, index: usize) -> Rect {
        let columns = self.columns.max(1);
        let side = self.tile_side();
        let pitch = self.row_pitch();
        let row = index / columns;
        let col = index % columns;
        Rect::new(col as f64 * pitch, row as f64 * pitch, side, side)
    }
}

impl ElementLocator for GridLayout {
    fn indices_in_rect(&self, rect: Rect) -> Vec<usize> {
        if rect.is_empty() || self.item_count == 0 {
            return Vec::new();
        }

        let pitch = self.row_pitch();
        // One spare row on each side; the frame test below is authoritative
        let first_row = ((rect.min_y() / pitch).floor().max(0.0) as usize).saturating_sub(1);
        let last_row = ((rect.max_y() / pitch).ceil().max(0.0) as usize)
            .saturating_add(1)
            .min(self.row_count());
        let columns = self.columns.max(1);

        let mut indices = Vec::new();
        for row in first_row..last_row {
            for col in 0..columns {
                let index = row * columns + col;
                if index >= self.item_count {
                    break;
                }
                if self.frame(index).intersects(&rect) {
                    indices.push(index);
                }
            }
        }
        indices
    }
}
