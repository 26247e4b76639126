//! Fixed-size tile grid owning every cell of a floor

use crate::{AnnotationKind, Cell, PassageTarget, ToggleField, MAP_HEIGHT, MAP_WIDTH};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    #[error("region ({min_x}, {min_y})..=({max_x}, {max_y}) has its corners swapped")]
    InvertedRegion {
        min_x: u32,
        min_y: u32,
        max_x: u32,
        max_y: u32,
    },
}

/// A floor's tile grid, stored row-major.
///
/// Dimensions are fixed at construction. History snapshots and clipboard
/// regions are deep copies; everything else works on the live grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(MAP_WIDTH, MAP_HEIGHT)
    }
}

impl Grid {
    /// Create a grid of default (empty) cells
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![Cell::default(); size],
        }
    }

    /// Build a grid from row-major cells; `None` if the count doesn't match
    pub fn from_cells(width: u32, height: u32, cells: Vec<Cell>) -> Option<Self> {
        if cells.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    fn index(&self, x: u32, y: u32) -> Result<usize, GridError> {
        if !self.contains(x, y) {
            return Err(GridError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok((y as usize) * (self.width as usize) + x as usize)
    }

    pub fn get(&self, x: u32, y: u32) -> Result<&Cell, GridError> {
        let idx = self.index(x, y)?;
        Ok(&self.cells[idx])
    }

    pub fn get_mut(&mut self, x: u32, y: u32) -> Result<&mut Cell, GridError> {
        let idx = self.index(x, y)?;
        Ok(&mut self.cells[idx])
    }

    pub fn set_tile_index(&mut self, x: u32, y: u32, index: u32) -> Result<(), GridError> {
        self.get_mut(x, y)?.tile_index = index;
        Ok(())
    }

    pub fn set_room_id(&mut self, x: u32, y: u32, id: u32) -> Result<(), GridError> {
        self.get_mut(x, y)?.room_id = id;
        Ok(())
    }

    pub fn set_annotation(
        &mut self,
        x: u32,
        y: u32,
        kind: Option<AnnotationKind>,
    ) -> Result<(), GridError> {
        self.get_mut(x, y)?.annotation = kind;
        Ok(())
    }

    pub fn set_enemy_index(&mut self, x: u32, y: u32, idx: Option<u32>) -> Result<(), GridError> {
        self.get_mut(x, y)?.enemy_index = idx;
        Ok(())
    }

    /// Store a passage target. Allowed regardless of the cell's annotation;
    /// export drops targets on cells that aren't passages.
    pub fn set_passage_target(
        &mut self,
        x: u32,
        y: u32,
        target: Option<PassageTarget>,
    ) -> Result<(), GridError> {
        self.get_mut(x, y)?.passage_target = target;
        Ok(())
    }

    /// Assign the field's value, or clear it if it already holds that value.
    ///
    /// Returns `true` when the field holds the value afterwards.
    pub fn toggle(&mut self, x: u32, y: u32, field: ToggleField) -> Result<bool, GridError> {
        let cell = self.get_mut(x, y)?;
        Ok(field.apply(cell))
    }

    /// Full independent copy, O(width × height)
    pub fn clone_deep(&self) -> Grid {
        self.clone()
    }

    /// Swap in another grid wholesale (used by undo and import)
    pub fn replace_with(&mut self, other: Grid) {
        *self = other;
    }

    /// Offset `base` by `delta`, returning the coordinate only if it stays inside `0..limit`
    pub fn offset_in_bounds(base: u32, delta: u32, limit: u32) -> Option<u32> {
        base.checked_add(delta).filter(|v| *v < limit)
    }

    /// Copy the cells of an inclusive rectangle, row-major
    pub fn cells_in_region(
        &self,
        min_x: u32,
        min_y: u32,
        max_x: u32,
        max_y: u32,
    ) -> Result<Vec<Cell>, GridError> {
        // Validate both corners up front so a bad rectangle copies nothing
        self.index(min_x, min_y)?;
        self.index(max_x, max_y)?;
        if min_x > max_x || min_y > max_y {
            return Err(GridError::InvertedRegion {
                min_x,
                min_y,
                max_x,
                max_y,
            });
        }

        let mut cells = Vec::new();
        for y in min_y..=max_y {
            let row_start = (y as usize) * (self.width as usize);
            let start = row_start + min_x as usize;
            let end = row_start + max_x as usize;
            cells.extend_from_slice(&self.cells[start..=end]);
        }
        Ok(cells)
    }

    /// Iterate all cells with their coordinates
    pub fn iter(&self) -> impl Iterator<Item = ((u32, u32), &Cell)> + '_ {
        let width = self.width as usize;
        self.cells.iter().enumerate().map(move |(i, cell)| {
            (((i % width) as u32, (i / width) as u32), cell)
        })
    }

    /// Iterate rows of cells, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Room ids currently assigned to at least one cell
    pub fn room_ids(&self) -> BTreeSet<u32> {
        self.cells
            .iter()
            .map(|c| c.room_id)
            .filter(|id| *id > 0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid() {
        let grid = Grid::default();
        assert_eq!(grid.width(), MAP_WIDTH);
        assert_eq!(grid.height(), MAP_HEIGHT);
        assert!(grid.iter().all(|(_, c)| *c == Cell::default()));
    }

    #[test]
    fn test_tile_operations() {
        let mut grid = Grid::new(10, 10);
        assert_eq!(grid.get(5, 5).unwrap().tile_index, 0);

        grid.set_tile_index(5, 5, 42).unwrap();
        assert_eq!(grid.get(5, 5).unwrap().tile_index, 42);

        grid.set_tile_index(9, 9, 7).unwrap();
        assert_eq!(grid.get(9, 9).unwrap().tile_index, 7);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut grid = Grid::new(10, 4);
        assert_eq!(
            grid.get(10, 0),
            Err(GridError::OutOfBounds {
                x: 10,
                y: 0,
                width: 10,
                height: 4
            })
        );
        assert!(grid.get(0, 4).is_err());
        assert!(grid.set_room_id(11, 1, 3).is_err());
        assert!(grid.set_passage_target(0, 99, None).is_err());
    }

    #[test]
    fn test_toggle_twice_restores_empty_or_matching_field() {
        let mut grid = Grid::new(4, 4);
        grid.set_room_id(1, 1, 9).unwrap();
        let before = grid.clone_deep();

        for field in [
            ToggleField::Room(9),
            ToggleField::Annotation(AnnotationKind::Trap),
            ToggleField::Enemy(0),
        ] {
            grid.toggle(1, 1, field).unwrap();
            grid.toggle(1, 1, field).unwrap();
            assert_eq!(grid, before, "toggle {:?} twice changed the grid", field);
        }
    }

    #[test]
    fn test_toggle_different_value_replaces_then_clears() {
        let mut grid = Grid::new(4, 4);
        grid.set_room_id(1, 1, 9).unwrap();
        grid.set_enemy_index(1, 1, Some(5)).unwrap();

        assert!(grid.toggle(1, 1, ToggleField::Room(3)).unwrap());
        assert_eq!(grid.get(1, 1).unwrap().room_id, 3);
        assert!(!grid.toggle(1, 1, ToggleField::Room(3)).unwrap());
        assert_eq!(grid.get(1, 1).unwrap().room_id, 0);

        assert!(grid.toggle(1, 1, ToggleField::Enemy(2)).unwrap());
        assert!(!grid.toggle(1, 1, ToggleField::Enemy(2)).unwrap());
        assert_eq!(grid.get(1, 1).unwrap().enemy_index, None);
    }

    #[test]
    fn test_passage_target_kept_without_passage() {
        let mut grid = Grid::new(3, 3);
        grid.set_annotation(0, 0, Some(AnnotationKind::Trap)).unwrap();
        grid.set_passage_target(0, 0, Some(PassageTarget::new(1, 1, 1)))
            .unwrap();
        assert!(grid.get(0, 0).unwrap().passage_target.is_some());
    }

    #[test]
    fn test_clone_deep_is_independent() {
        let mut grid = Grid::new(3, 3);
        let copy = grid.clone_deep();
        grid.set_tile_index(1, 1, 5).unwrap();
        assert_eq!(copy.get(1, 1).unwrap().tile_index, 0);

        grid.replace_with(copy);
        assert_eq!(grid.get(1, 1).unwrap().tile_index, 0);
    }

    #[test]
    fn test_cells_in_region() {
        let mut grid = Grid::new(5, 5);
        grid.set_tile_index(1, 1, 1).unwrap();
        grid.set_tile_index(2, 1, 2).unwrap();
        grid.set_tile_index(1, 2, 3).unwrap();
        grid.set_tile_index(2, 2, 4).unwrap();

        let cells = grid.cells_in_region(1, 1, 2, 2).unwrap();
        let indices: Vec<u32> = cells.iter().map(|c| c.tile_index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);

        assert!(grid.cells_in_region(3, 3, 5, 5).is_err());
    }

    #[test]
    fn test_cells_in_region_rejects_swapped_corners() {
        let grid = Grid::new(5, 5);
        assert_eq!(
            grid.cells_in_region(3, 1, 1, 2),
            Err(GridError::InvertedRegion {
                min_x: 3,
                min_y: 1,
                max_x: 1,
                max_y: 2,
            })
        );
        assert!(grid.cells_in_region(1, 4, 2, 0).is_err());
    }

    #[test]
    fn test_offset_in_bounds() {
        assert_eq!(Grid::offset_in_bounds(3, 2, 10), Some(5));
        assert_eq!(Grid::offset_in_bounds(9, 1, 10), None);
        assert_eq!(Grid::offset_in_bounds(u32::MAX, 1, 10), None);
    }

    #[test]
    fn test_room_ids() {
        let mut grid = Grid::new(4, 4);
        grid.set_room_id(0, 0, 3).unwrap();
        grid.set_room_id(1, 0, 3).unwrap();
        grid.set_room_id(3, 3, 1).unwrap();
        let ids: Vec<u32> = grid.room_ids().into_iter().collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_from_cells_checks_len() {
        assert!(Grid::from_cells(2, 2, vec![Cell::default(); 3]).is_none());
        assert!(Grid::from_cells(2, 2, vec![Cell::default(); 4]).is_some());
    }
}
