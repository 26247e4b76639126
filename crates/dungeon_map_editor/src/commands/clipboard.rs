//! Rectangle copy and tile stamping

use dungeon_map_core::{Cell, Grid, GridError};

/// Corners of a rectangle being dragged out, in tile coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileSelection {
    pub start: Option<(u32, u32)>,
    pub end: Option<(u32, u32)>,
}

impl TileSelection {
    pub fn is_empty(&self) -> bool {
        self.start.is_none()
    }

    pub fn clear(&mut self) {
        self.start = None;
        self.end = None;
    }

    /// Inclusive `(min_x, min_y, max_x, max_y)`.
    ///
    /// A selection without an end corner covers just the start cell.
    pub fn normalized(&self) -> Option<(u32, u32, u32, u32)> {
        let (sx, sy) = self.start?;
        let (ex, ey) = self.end.unwrap_or((sx, sy));
        Some((sx.min(ex), sy.min(ey), sx.max(ex), sy.max(ey)))
    }
}

/// Deep copy of a rectangular block of cells, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardRegion {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl ClipboardRegion {
    /// Copy every field of the inclusive rectangle `(x0, y0)..=(x1, y1)`.
    ///
    /// Corners must already be normalized (`x0 <= x1`, `y0 <= y1`); swapped
    /// corners give [`GridError::InvertedRegion`].
    pub fn capture(grid: &Grid, x0: u32, y0: u32, x1: u32, y1: u32) -> Result<Self, GridError> {
        let cells = grid.cells_in_region(x0, y0, x1, y1)?;
        Ok(Self {
            width: x1 - x0 + 1,
            height: y1 - y0 + 1,
            cells,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Cell at `(dx, dy)` relative to the region's top-left corner
    pub fn get(&self, dx: u32, dy: u32) -> Option<&Cell> {
        if dx >= self.width || dy >= self.height {
            return None;
        }
        self.cells.get((dy * self.width + dx) as usize)
    }

    /// Stamp the copied tile indices with the region's top-left at `(origin_x, origin_y)`.
    ///
    /// Only tile indices are written; rooms, annotations and enemies stay as
    /// they are at the destination. Cells falling outside the grid are
    /// skipped. Returns the number of cells written.
    pub fn paste(&self, grid: &mut Grid, origin_x: u32, origin_y: u32) -> usize {
        let mut written = 0;
        for dy in 0..self.height {
            let Some(y) = Grid::offset_in_bounds(origin_y, dy, grid.height()) else {
                break;
            };
            for dx in 0..self.width {
                let Some(x) = Grid::offset_in_bounds(origin_x, dx, grid.width()) else {
                    break;
                };
                let Some(source) = self.get(dx, dy) else {
                    continue;
                };
                if grid.set_tile_index(x, y, source.tile_index).is_ok() {
                    written += 1;
                }
            }
        }
        written
    }
}

/// Holds the most recent capture; pastes don't consume it
#[derive(Debug, Clone, Default)]
pub struct TileClipboard {
    region: Option<ClipboardRegion>,
}

impl TileClipboard {
    pub fn is_empty(&self) -> bool {
        self.region.is_none()
    }

    pub fn region(&self) -> Option<&ClipboardRegion> {
        self.region.as_ref()
    }

    /// Replace the clipboard contents
    pub fn set(&mut self, region: ClipboardRegion) {
        tracing::info!(
            "Copied {}x{} region to clipboard",
            region.width(),
            region.height()
        );
        self.region = Some(region);
    }
}
