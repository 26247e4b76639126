//! Persisted floor file format
//!
//! One JSON file holds one floor:
//!
//! ```json
//! {
//!   "tilesetIndex": 0,
//!   "tiles": [[{ "index": 3, "type": "passage", "roomId": 2,
//!                "enemyIndex": null, "passageTo": { "f": 1, "x": 4, "y": 9 } }]]
//! }
//! ```
//!
//! `tiles` has one inner array per grid row. Import validates the shape
//! against the grid dimensions before building anything, so a rejected file
//! never touches the live grid.

use crate::{AnnotationKind, Cell, Grid, PassageTarget};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FloorFileError {
    #[error("malformed JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("invalid floor file: {0}")]
    InvalidFile(String),
    #[error("failed to serialize floor: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// One cell as written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileRecord {
    pub index: u32,
    #[serde(rename = "type", default)]
    pub kind: Option<AnnotationKind>,
    /// `null` and `0` both mean "no room"
    #[serde(default)]
    pub room_id: Option<u32>,
    #[serde(default)]
    pub enemy_index: Option<u32>,
    #[serde(default)]
    pub passage_to: Option<PassageTarget>,
}

impl TileRecord {
    /// Export a cell. Passage targets survive only on passage cells, room 0 becomes `null`.
    pub fn from_cell(cell: &Cell) -> Self {
        Self {
            index: cell.tile_index,
            kind: cell.annotation,
            room_id: (cell.room_id > 0).then_some(cell.room_id),
            enemy_index: cell.enemy_index,
            passage_to: cell.effective_passage_target(),
        }
    }

    pub fn into_cell(self) -> Cell {
        Cell {
            tile_index: self.index,
            annotation: self.kind,
            room_id: self.room_id.unwrap_or(0),
            enemy_index: self.enemy_index,
            passage_target: self.passage_to,
        }
    }
}

/// The whole floor as written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorFile {
    #[serde(default)]
    pub tileset_index: u32,
    pub tiles: Vec<Vec<TileRecord>>,
}

/// Result of a successful import
#[derive(Debug, Clone)]
pub struct ImportedFloor {
    pub grid: Grid,
    /// `None` for legacy files, which only stored tile indices
    pub tileset_index: Option<u32>,
}

impl FloorFile {
    /// Build the on-disk representation of a grid
    pub fn from_grid(grid: &Grid, tileset_index: u32) -> Self {
        let tiles = grid
            .rows()
            .map(|row| row.iter().map(TileRecord::from_cell).collect())
            .collect();
        Self {
            tileset_index,
            tiles,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, FloorFileError> {
        serde_json::to_string_pretty(self).map_err(FloorFileError::Serialize)
    }

    /// Parse a floor file for a `width × height` grid.
    ///
    /// Accepts the current object format and the legacy format, a bare
    /// `height × width` matrix of tile indices.
    pub fn parse(json: &str, width: u32, height: u32) -> Result<ImportedFloor, FloorFileError> {
        let value: Value = serde_json::from_str(json).map_err(FloorFileError::Malformed)?;

        match value {
            Value::Object(map) => {
                let tiles = map
                    .get("tiles")
                    .ok_or_else(|| FloorFileError::InvalidFile("missing `tiles`".to_string()))?;
                check_shape(tiles, width, height)?;

                let file: FloorFile = serde_json::from_value(Value::Object(map))
                    .map_err(|e| FloorFileError::InvalidFile(e.to_string()))?;
                let tileset_index = file.tileset_index;
                let grid = file.into_grid(width, height)?;
                Ok(ImportedFloor {
                    grid,
                    tileset_index: Some(tileset_index),
                })
            }
            Value::Array(_) => {
                check_shape(&value, width, height)?;
                let rows: Vec<Vec<u32>> = serde_json::from_value(value)
                    .map_err(|e| FloorFileError::InvalidFile(e.to_string()))?;
                tracing::info!("Importing legacy tile-index matrix");

                let cells = rows.into_iter().flatten().map(Cell::with_tile).collect();
                let grid = Grid::from_cells(width, height, cells).ok_or_else(|| {
                    FloorFileError::InvalidFile("cell count mismatch".to_string())
                })?;
                Ok(ImportedFloor {
                    grid,
                    tileset_index: None,
                })
            }
            _ => Err(FloorFileError::InvalidFile(
                "expected an object with `tiles` or a tile matrix".to_string(),
            )),
        }
    }

    fn into_grid(self, width: u32, height: u32) -> Result<Grid, FloorFileError> {
        let cells = self
            .tiles
            .into_iter()
            .flatten()
            .map(TileRecord::into_cell)
            .collect();
        Grid::from_cells(width, height, cells)
            .ok_or_else(|| FloorFileError::InvalidFile("cell count mismatch".to_string()))
    }
}

/// Check that `tiles` is an array of `height` arrays of `width` entries
fn check_shape(tiles: &Value, width: u32, height: u32) -> Result<(), FloorFileError> {
    let rows = tiles
        .as_array()
        .ok_or_else(|| FloorFileError::InvalidFile("`tiles` is not an array".to_string()))?;

    if rows.len() != height as usize {
        return Err(FloorFileError::InvalidFile(format!(
            "expected {} rows, found {}",
            height,
            rows.len()
        )));
    }

    for (y, row) in rows.iter().enumerate() {
        let row = row
            .as_array()
            .ok_or_else(|| FloorFileError::InvalidFile(format!("row {} is not an array", y)))?;
        if row.len() != width as usize {
            return Err(FloorFileError::InvalidFile(format!(
                "row {} has {} cells, expected {}",
                y,
                row.len(),
                width
            )));
        }
    }
    Ok(())
}
