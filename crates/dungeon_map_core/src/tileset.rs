//! Atlas geometry for the tileset and the enemy sprite sheet
//!
//! Only pixel dimensions are needed here; decoding and drawing the images is
//! left to the host.

use std::path::Path;

/// Number of columns in the tile palette, independent of the tileset's own layout
pub const PALETTE_COLUMNS: u32 = 4;

/// Pixel-space source rectangle of a tile inside its atlas
pub type SourceRect = (u32, u32, u32, u32);

fn atlas_grid(width_px: u32, height_px: u32, cell_size: u32) -> (u32, u32) {
    if cell_size == 0 {
        return (0, 0);
    }
    let per_row = width_px / cell_size;
    (per_row, per_row * (height_px / cell_size))
}

fn atlas_source(index: u32, per_row: u32, count: u32, cell_size: u32) -> Option<SourceRect> {
    if per_row == 0 || index >= count {
        return None;
    }
    Some((
        (index % per_row) * cell_size,
        (index / per_row) * cell_size,
        cell_size,
        cell_size,
    ))
}

/// Tileset image geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilesetInfo {
    pub tile_size: u32,
    pub tiles_per_row: u32,
    pub tile_count: u32,
}

impl TilesetInfo {
    /// Derive the tile layout from image dimensions. Partial tiles at the
    /// right and bottom edges are ignored.
    pub fn from_dimensions(width_px: u32, height_px: u32, tile_size: u32) -> Self {
        let (tiles_per_row, tile_count) = atlas_grid(width_px, height_px, tile_size);
        Self {
            tile_size,
            tiles_per_row,
            tile_count,
        }
    }

    /// Read the image header at `path` and derive the layout
    pub fn from_image_path(path: &Path, tile_size: u32) -> Result<Self, image::ImageError> {
        let (w, h) = image::image_dimensions(path)?;
        let info = Self::from_dimensions(w, h, tile_size);
        tracing::info!(
            "Tileset {:?}: {}x{} px, {} tiles per row, {} tiles",
            path,
            w,
            h,
            info.tiles_per_row,
            info.tile_count
        );
        Ok(info)
    }

    /// Where tile `index` lives in the tileset image
    pub fn source_rect(&self, index: u32) -> Option<SourceRect> {
        atlas_source(index, self.tiles_per_row, self.tile_count, self.tile_size)
    }

    /// Top-left pixel of tile `index` in the palette
    pub fn palette_position(&self, index: u32) -> (u32, u32) {
        (
            (index % PALETTE_COLUMNS) * self.tile_size,
            (index / PALETTE_COLUMNS) * self.tile_size,
        )
    }

    /// Palette position of `index`, or `None` when the tileset has no such tile
    pub fn palette_slot(&self, index: u32) -> Option<(u32, u32)> {
        (index < self.tile_count).then(|| self.palette_position(index))
    }

    /// Pixel height of the palette needed to show every tile
    pub fn palette_height(&self) -> u32 {
        self.tile_count.div_ceil(PALETTE_COLUMNS) * self.tile_size
    }

    /// Tile under a pixel position of the palette, if any
    pub fn palette_index_at(&self, px: u32, py: u32) -> Option<u32> {
        if self.tile_size == 0 {
            return None;
        }
        let col = px / self.tile_size;
        let row = py / self.tile_size;
        if col >= PALETTE_COLUMNS {
            return None;
        }
        let index = row.checked_mul(PALETTE_COLUMNS)?.checked_add(col)?;
        (index < self.tile_count).then_some(index)
    }
}

/// Enemy sprite sheet geometry, one enemy per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteSheetInfo {
    pub frame_size: u32,
    pub frames_per_row: u32,
    pub frame_count: u32,
}

impl SpriteSheetInfo {
    pub fn from_dimensions(width_px: u32, height_px: u32, frame_size: u32) -> Self {
        let (frames_per_row, frame_count) = atlas_grid(width_px, height_px, frame_size);
        Self {
            frame_size,
            frames_per_row,
            frame_count,
        }
    }

    pub fn from_image_path(path: &Path, frame_size: u32) -> Result<Self, image::ImageError> {
        let (w, h) = image::image_dimensions(path)?;
        Ok(Self::from_dimensions(w, h, frame_size))
    }

    /// Where enemy `index` lives in the sheet
    pub fn source_rect(&self, index: u32) -> Option<SourceRect> {
        atlas_source(index, self.frames_per_row, self.frame_count, self.frame_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tileset_from_dimensions() {
        let info = TilesetInfo::from_dimensions(200, 120, 50);
        assert_eq!(info.tiles_per_row, 4);
        assert_eq!(info.tile_count, 8);
    }

    #[test]
    fn test_source_rect() {
        let info = TilesetInfo::from_dimensions(150, 100, 50);
        assert_eq!(info.source_rect(0), Some((0, 0, 50, 50)));
        assert_eq!(info.source_rect(4), Some((50, 50, 50, 50)));
        assert_eq!(info.source_rect(6), None);
    }

    #[test]
    fn test_zero_tile_size() {
        let info = TilesetInfo::from_dimensions(150, 100, 0);
        assert_eq!(info.tile_count, 0);
        assert_eq!(info.source_rect(0), None);
        assert_eq!(info.palette_index_at(10, 10), None);
    }

    #[test]
    fn test_palette_lookup() {
        // 6 per row in the image, but the palette always uses 4 columns
        let info = TilesetInfo::from_dimensions(300, 100, 50);
        assert_eq!(info.tile_count, 12);
        assert_eq!(info.palette_index_at(60, 60), Some(5));
        assert_eq!(info.palette_position(5), (50, 50));
        assert_eq!(info.palette_index_at(210, 0), None);
        assert_eq!(info.palette_index_at(0, 160), None);
        assert_eq!(info.palette_height(), 150);
        assert_eq!(info.palette_slot(5), Some((50, 50)));
        assert_eq!(info.palette_slot(info.tile_count), None);
        assert_eq!(info.palette_slot(u32::MAX), None);
    }

    #[test]
    fn test_sprite_sheet() {
        let sheet = SpriteSheetInfo::from_dimensions(100, 50, 50);
        assert_eq!(sheet.frame_count, 2);
        assert_eq!(sheet.source_rect(1), Some((50, 0, 50, 50)));
        assert_eq!(sheet.source_rect(2), None);
    }
}
