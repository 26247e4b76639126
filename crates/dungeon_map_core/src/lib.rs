//! Core data structures for dungeon_map_editor
//!
//! This crate provides the fundamental types for representing a dungeon floor:
//! - `Cell` - One grid position with its tile and annotation layers
//! - `Grid` - The fixed-size tile grid that owns every cell
//! - `FloorFile` - The persisted JSON format, one file per floor
//! - `TilesetInfo` / `SpriteSheetInfo` - Atlas geometry for tiles and enemy sprites

mod cell;
mod floor;
mod grid;
mod tileset;

pub use cell::{AnnotationKind, Cell, PassageTarget, ToggleField};
pub use floor::{FloorFile, FloorFileError, ImportedFloor, TileRecord};
pub use grid::{Grid, GridError};
pub use tileset::{SourceRect, SpriteSheetInfo, TilesetInfo, PALETTE_COLUMNS};

/// Default floor width in tiles
pub const MAP_WIDTH: u32 = 270;
/// Default floor height in tiles
pub const MAP_HEIGHT: u32 = 150;
/// Default edge length of one tile, in pixels, both in the tileset image and on the map
pub const TILE_SIZE: u32 = 50;
