//! Floor import and export for the session
//!
//! This module converts between the live grid and [`FloorFile`]; disk access
//! lives in [`file`].

mod file;

pub use file::*;

use dungeon_map_core::{FloorFile, FloorFileError};

use crate::EditorSession;

impl EditorSession {
    /// Replace the grid with a parsed floor file.
    ///
    /// The whole file is validated before anything changes; on failure the
    /// grid, history and clipboard are left untouched and the error is kept
    /// in `error_message`. A successful import can be undone.
    pub fn import_floor_str(&mut self, json: &str) -> Result<(), FloorFileError> {
        let imported = match FloorFile::parse(json, self.grid.width(), self.grid.height()) {
            Ok(imported) => imported,
            Err(e) => {
                tracing::warn!("Floor import failed: {}", e);
                self.error_message = Some(format!("Import failed: {}", e));
                return Err(e);
            }
        };

        self.record_history();
        self.grid.replace_with(imported.grid);
        if let Some(index) = imported.tileset_index {
            self.tileset_index = index;
        }

        self.selection.clear();
        self.is_painting = false;
        self.pending_passage = None;
        self.error_message = None;
        self.dirty = false;

        tracing::info!(
            "Imported {}x{} floor (tileset {})",
            self.grid.width(),
            self.grid.height(),
            self.tileset_index
        );
        Ok(())
    }

    /// Snapshot of the live grid in file form
    pub fn export_floor(&self) -> FloorFile {
        FloorFile::from_grid(&self.grid, self.tileset_index)
    }

    /// Pretty-printed floor file for the live grid
    pub fn export_floor_json(&self) -> Result<String, FloorFileError> {
        self.export_floor().to_json_pretty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::TilePos;
    use crate::{EditMode, EditorConfig};
    use dungeon_map_core::{AnnotationKind, PassageTarget};

    fn small_session() -> EditorSession {
        EditorSession::with_config(EditorConfig::new().with_dimensions(4, 3))
    }

    #[test]
    fn test_export_then_import_restores_grid() {
        let mut session = small_session();
        session.selected_tile = 9;
        session.pointer_down(TilePos::new(1, 1));
        session.pointer_up();
        session.toggle_mode(EditMode::SpecialTile);
        session.selected_kind = AnnotationKind::Passage;
        session.click(TilePos::new(1, 1));
        session.confirm_passage_target(PassageTarget::new(3, 0, 2));
        session.tileset_index = 2;

        let json = session.export_floor_json().unwrap();
        let saved = session.grid().clone_deep();

        let mut other = small_session();
        other.import_floor_str(&json).unwrap();
        assert_eq!(other.grid(), &saved);
        assert_eq!(other.tileset_index, 2);
        assert!(!other.dirty);
    }

    #[test]
    fn test_import_is_undoable() {
        let mut session = small_session();
        session.selected_tile = 4;
        session.click(TilePos::new(0, 0));

        let blank = small_session().export_floor_json().unwrap();
        session.import_floor_str(&blank).unwrap();
        assert_eq!(session.grid().get(0, 0).unwrap().tile_index, 0);

        session.undo();
        assert_eq!(session.grid().get(0, 0).unwrap().tile_index, 4);
    }

    #[test]
    fn test_failed_import_leaves_state_untouched() {
        let mut session = small_session();
        session.selected_tile = 4;
        session.pointer_down(TilePos::new(2, 2));
        session.pointer_up();
        let before = session.grid().clone_deep();
        let history_len = session.history().undo_len();

        assert!(matches!(
            session.import_floor_str("{\"tiles\": [[]]}"),
            Err(FloorFileError::InvalidFile(_))
        ));
        assert!(matches!(
            session.import_floor_str("not json"),
            Err(FloorFileError::Malformed(_))
        ));

        assert_eq!(session.grid(), &before);
        assert_eq!(session.history().undo_len(), history_len);
        assert!(session.error_message.is_some());
    }

    #[test]
    fn test_legacy_import_keeps_tileset_index() {
        let mut session = small_session();
        session.tileset_index = 5;
        session
            .import_floor_str("[[1,2,3,4],[0,0,0,0],[7,7,7,7]]")
            .unwrap();
        assert_eq!(session.tileset_index, 5);
        assert_eq!(session.grid().get(1, 0).unwrap().tile_index, 2);
        assert_eq!(session.grid().get(3, 2).unwrap().tile_index, 7);
    }

    #[test]
    fn test_export_drops_stale_passage_target() {
        let mut session = small_session();
        session.toggle_mode(EditMode::SpecialTile);
        session.selected_kind = AnnotationKind::Passage;
        session.click(TilePos::new(0, 0));
        session.confirm_passage_target(PassageTarget::new(1, 1, 1));
        // Switch the cell to a trap; the target stays on the cell
        session.click(TilePos::new(0, 0));
        session.selected_kind = AnnotationKind::Trap;
        session.click(TilePos::new(0, 0));

        let file = session.export_floor();
        let record = &file.tiles[0][0];
        assert_eq!(record.kind, Some(AnnotationKind::Trap));
        assert_eq!(record.passage_to, None);
    }
}
