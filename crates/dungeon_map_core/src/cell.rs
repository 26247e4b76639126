//! Cell record and annotation types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Special behavior attached to a cell.
///
/// The three kinds are mutually exclusive; a cell without special behavior
/// carries `None` in [`Cell::annotation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    /// Flagged when stepped on or identified, shows a trap sprite
    Trap,
    /// May hold nothing, a treasure sprite or a monster
    Treasure,
    /// Transports the player to [`Cell::passage_target`] when stepped on
    Passage,
}

impl AnnotationKind {
    pub const ALL: [AnnotationKind; 3] = [
        AnnotationKind::Trap,
        AnnotationKind::Treasure,
        AnnotationKind::Passage,
    ];

    /// Label used both in the file format and on the overlay
    pub fn label(&self) -> &'static str {
        match self {
            AnnotationKind::Trap => "trap",
            AnnotationKind::Treasure => "treasure",
            AnnotationKind::Passage => "passage",
        }
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Destination of a passage on another floor.
///
/// Coordinates are opaque: they refer to a grid this editor never sees,
/// so they are stored as given and never bounds-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PassageTarget {
    #[serde(rename = "f")]
    pub floor: i32,
    pub x: i32,
    pub y: i32,
}

impl PassageTarget {
    pub fn new(floor: i32, x: i32, y: i32) -> Self {
        Self { floor, x, y }
    }
}

/// One grid position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    /// Index into the tileset image
    pub tile_index: u32,
    pub annotation: Option<AnnotationKind>,
    /// Room membership, 0 means "no room"
    pub room_id: u32,
    /// Index into the enemy roster
    pub enemy_index: Option<u32>,
    /// Only meaningful while `annotation` is `Some(Passage)`; may go stale
    pub passage_target: Option<PassageTarget>,
}

impl Cell {
    /// Create a cell showing `tile_index` with no annotations
    pub fn with_tile(tile_index: u32) -> Self {
        Self {
            tile_index,
            ..Default::default()
        }
    }

    /// Whether the cell shows something other than the background tile
    pub fn has_tile(&self) -> bool {
        self.tile_index > 0
    }

    pub fn is_passage(&self) -> bool {
        self.annotation == Some(AnnotationKind::Passage)
    }

    /// The passage target, but only while the cell is actually a passage
    pub fn effective_passage_target(&self) -> Option<PassageTarget> {
        if self.is_passage() {
            self.passage_target
        } else {
            None
        }
    }
}

/// A cell field together with the value a click assigns to it.
///
/// Toggling assigns the value, or clears the field to its empty sentinel
/// when it already holds that value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleField {
    /// Empty sentinel: room 0
    Room(u32),
    /// Empty sentinel: `None`
    Annotation(AnnotationKind),
    /// Empty sentinel: `None`
    Enemy(u32),
}

impl ToggleField {
    /// Apply the toggle to `cell`, returning whether the field now holds the value
    pub(crate) fn apply(self, cell: &mut Cell) -> bool {
        match self {
            ToggleField::Room(id) => {
                if cell.room_id == id {
                    cell.room_id = 0;
                    false
                } else {
                    cell.room_id = id;
                    true
                }
            }
            ToggleField::Annotation(kind) => {
                if cell.annotation == Some(kind) {
                    cell.annotation = None;
                    false
                } else {
                    cell.annotation = Some(kind);
                    true
                }
            }
            ToggleField::Enemy(idx) => {
                if cell.enemy_index == Some(idx) {
                    cell.enemy_index = None;
                    false
                } else {
                    cell.enemy_index = Some(idx);
                    true
                }
            }
        }
    }
}
