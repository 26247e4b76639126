//! dungeon_map_editor - Grid map editor for dungeon floors
//!
//! This crate provides the editing engine for a fixed-size tile grid:
//! - Tile painting with click and drag strokes
//! - Room, special tile (trap/treasure/passage) and enemy annotation modes
//! - Snapshot-based undo/redo
//! - Rectangle copy and tile stamping
//! - Viewport-limited rendering against any [`render::DrawSurface`]
//! - Floor file save/load
//!
//! Everything hangs off one [`EditorSession`]; the host feeds it pointer
//! and keyboard events and redraws whatever the returned [`Redraw`] asks for.
//!
//! # Usage
//!
//! ```rust
//! use dungeon_map_editor::{EditMode, EditorSession};
//! use dungeon_map_editor::tools::TilePos;
//!
//! let mut session = EditorSession::new();
//! session.selected_tile = 3;
//! session.pointer_down(TilePos::new(5, 5));
//! session.pointer_up();
//! assert_eq!(session.grid().get(5, 5).unwrap().tile_index, 3);
//!
//! session.undo();
//! assert_eq!(session.grid().get(5, 5).unwrap().tile_index, 0);
//!
//! session.toggle_mode(EditMode::Room);
//! assert_eq!(session.mode, EditMode::Room);
//! ```
//!
//! With the `bevy` feature, [`plugin::EditorPlugin`] hosts the session in a
//! Bevy app.

pub mod commands;
pub mod preferences;
pub mod project;
pub mod render;
pub mod tools;

#[cfg(feature = "bevy")]
pub mod plugin;

// Re-export core types
pub use dungeon_map_core;

use commands::clipboard::{TileClipboard, TileSelection};
use commands::history::{CommandHistory, UndoOutcome, MAX_UNDO};
use dungeon_map_core::{
    AnnotationKind, Grid, SpriteSheetInfo, TilesetInfo, MAP_HEIGHT, MAP_WIDTH, TILE_SIZE,
};
use preferences::EditorPreferences;
use std::path::PathBuf;
use tools::PassagePrompt;

/// Exclusive top-level mode selecting which field a click mutates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Tile painting, rectangle copy and paste
    #[default]
    Normal,
    Room,
    SpecialTile,
    Enemy,
}

impl EditMode {
    pub fn label(&self) -> &'static str {
        match self {
            EditMode::Normal => "Tiles",
            EditMode::Room => "Rooms",
            EditMode::SpecialTile => "Special Tiles",
            EditMode::Enemy => "Enemies",
        }
    }
}

/// Which parts of the viewport need drawing after an operation.
///
/// Ordered, so requests from several handlers merge with `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Redraw {
    #[default]
    None,
    /// Hover highlight or selection rectangle only
    Interaction,
    /// The active overlay layer
    Overlay,
    /// Base tiles and overlay
    All,
}

impl Redraw {
    pub fn merge(self, other: Redraw) -> Redraw {
        self.max(other)
    }
}

/// Configuration for a new editing session
///
/// Use this to customize grid size, tile size and history depth when
/// embedding the editor.
#[derive(Clone, Debug)]
pub struct EditorConfig {
    /// Grid width in tiles. Default: 270
    pub width: u32,
    /// Grid height in tiles. Default: 150
    pub height: u32,
    /// Tile edge in pixels. Default: 50
    pub tile_size: u32,
    /// Maximum undo snapshots kept. Default: 50
    pub history_capacity: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            width: MAP_WIDTH,
            height: MAP_HEIGHT,
            tile_size: TILE_SIZE,
            history_capacity: MAX_UNDO,
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take tile size and history depth from saved preferences
    pub fn from_preferences(preferences: &EditorPreferences) -> Self {
        Self::default()
            .with_tile_size(preferences.tile_size)
            .with_history_capacity(preferences.history_capacity)
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the tile size in pixels (minimum 1)
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size.max(1);
        self
    }

    /// Set the undo depth (minimum 1)
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity.max(1);
        self
    }
}

/// The editing session: live grid, history, clipboard and all editor state.
///
/// Every operation goes through this object; there is no global state.
#[derive(Debug)]
#[cfg_attr(feature = "bevy", derive(bevy::prelude::Resource))]
pub struct EditorSession {
    grid: Grid,
    history: CommandHistory,
    clipboard: TileClipboard,

    // Modes
    pub mode: EditMode,
    /// Rectangle copy modifier (held Ctrl+C), only meaningful in `Normal`
    pub rect_selecting: bool,
    /// Rectangle paste modifier (held Ctrl+V), only meaningful in `Normal`
    pub rect_pasting: bool,

    // Values picked by the host's widgets
    pub selected_tile: u32,
    pub selected_room: u32,
    pub selected_kind: AnnotationKind,
    pub selected_enemy: u32,

    // Pointer state
    pub selection: TileSelection,
    pub is_painting: bool,
    pub hover: Option<(u32, u32)>,

    /// Passage cell waiting for its target from the host's form
    pub pending_passage: Option<PassagePrompt>,

    // Assets
    pub tile_size: u32,
    pub tileset: Option<TilesetInfo>,
    pub enemy_sheet: Option<SpriteSheetInfo>,
    /// Tileset the floor file refers to
    pub tileset_index: u32,

    /// File of the last load or save
    pub floor_path: Option<PathBuf>,
    /// Unsaved changes since the last save or load
    pub dirty: bool,
    /// Last error to surface to the user
    pub error_message: Option<String>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::with_config(EditorConfig::default())
    }
}

impl EditorSession {
    /// Create a session with the default 270x150 grid
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            grid: Grid::new(config.width, config.height),
            history: CommandHistory::with_capacity(config.history_capacity),
            clipboard: TileClipboard::default(),

            mode: EditMode::Normal,
            rect_selecting: false,
            rect_pasting: false,

            selected_tile: 0,
            selected_room: 1,
            selected_kind: AnnotationKind::Trap,
            selected_enemy: 0,

            selection: TileSelection::default(),
            is_painting: false,
            hover: None,

            pending_passage: None,

            tile_size: config.tile_size.max(1),
            tileset: None,
            enemy_sheet: None,
            tileset_index: 0,

            floor_path: None,
            dirty: false,
            error_message: None,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn clipboard(&self) -> &TileClipboard {
        &self.clipboard
    }

    /// Snapshot the live grid ahead of a mutation
    pub(crate) fn record_history(&mut self) {
        self.history.record_before_mutation(&self.grid);
    }

    /// Switch to `mode`, or back to `Normal` if it is already active.
    ///
    /// Rectangle modifiers are left as they are.
    pub fn toggle_mode(&mut self, mode: EditMode) -> Redraw {
        self.mode = if self.mode == mode {
            EditMode::Normal
        } else {
            mode
        };
        tracing::debug!("Edit mode: {}", self.mode.label());
        Redraw::Overlay
    }

    /// Restore the most recent snapshot
    pub fn undo(&mut self) -> UndoOutcome {
        match self.history.undo(&self.grid) {
            Some(previous) => {
                self.grid.replace_with(previous);
                self.dirty = true;
                UndoOutcome::Restored
            }
            None => UndoOutcome::EmptyHistory,
        }
    }

    /// Re-apply the most recently undone state
    pub fn redo(&mut self) -> UndoOutcome {
        match self.history.redo(&self.grid) {
            Some(next) => {
                self.grid.replace_with(next);
                self.dirty = true;
                UndoOutcome::Restored
            }
            None => UndoOutcome::EmptyHistory,
        }
    }

    /// Pick the paint tile from a pixel position on the palette.
    ///
    /// Ignored while a rectangle modifier is held.
    pub fn select_tile_from_palette(&mut self, px: u32, py: u32) -> Option<u32> {
        if self.rect_selecting || self.rect_pasting {
            return None;
        }
        let index = self.tileset.as_ref()?.palette_index_at(px, py)?;
        self.selected_tile = index;
        Some(index)
    }
}
