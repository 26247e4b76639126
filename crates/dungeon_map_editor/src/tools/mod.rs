//! Editor tools - painting, annotation and rectangle copy/paste
//!
//! Routes pointer events to the mutation that matches the current
//! [`EditMode`] and rectangle modifiers.
//!
//! | Mode | click |
//! |---|---|
//! | Room | toggle the selected room id, only on cells with a tile |
//! | SpecialTile | toggle the selected kind; a new passage opens a [`PassagePrompt`] |
//! | Enemy | toggle the selected enemy |
//! | Normal | paint the selected tile, or stamp the clipboard while pasting |
//!
//! Drag painting in `Normal` mode snapshots history once per cell it
//! changes; cells that already hold the selected tile are skipped.

use dungeon_map_core::{PassageTarget, ToggleField};

use crate::commands::clipboard::ClipboardRegion;
use crate::{EditMode, EditorSession, Redraw};

/// Pointer position in tile coordinates, possibly outside the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Tile under a pixel position in map space (scroll offset already applied)
    pub fn from_pixels(px: f32, py: f32, tile_size: u32) -> Self {
        let ts = tile_size.max(1) as f32;
        Self {
            x: (px / ts).floor() as i32,
            y: (py / ts).floor() as i32,
        }
    }
}

/// A passage cell waiting for the host to ask for its destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassagePrompt {
    pub x: u32,
    pub y: u32,
    /// Target already stored on the cell, for prefilling the form
    pub current: Option<PassageTarget>,
}

/// Per-frame button state of a pointer that can wander off the map area.
///
/// Hosts that poll buttons each frame feed it here. It turns the polls into
/// session pointer events: leaving the map ends a stroke, and a release only
/// counts as a click when the press also began over the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerTracker {
    last_tile: Option<TilePos>,
    pressed_on_map: bool,
}

impl PointerTracker {
    /// Pointer is over the map at `pos` this frame
    pub fn over_map(
        &mut self,
        session: &mut EditorSession,
        pos: TilePos,
        just_pressed: bool,
        just_released: bool,
    ) -> Redraw {
        let mut redraw = Redraw::None;
        if just_pressed {
            self.pressed_on_map = true;
            redraw = redraw.merge(session.pointer_down(pos));
        }
        if self.last_tile != Some(pos) {
            self.last_tile = Some(pos);
            redraw = redraw.merge(session.pointer_move(pos));
        }
        if just_released {
            redraw = redraw.merge(session.pointer_up());
            if std::mem::take(&mut self.pressed_on_map) {
                redraw = redraw.merge(session.click(pos));
            }
        }
        redraw
    }

    /// Pointer is over a side panel or outside the window this frame
    pub fn off_map(
        &mut self,
        session: &mut EditorSession,
        just_pressed: bool,
        just_released: bool,
    ) -> Redraw {
        self.last_tile = None;
        if just_pressed || just_released {
            self.pressed_on_map = false;
        }
        if session.is_painting || session.hover.is_some() {
            session.pointer_leave()
        } else {
            Redraw::None
        }
    }
}

impl EditorSession {
    /// Grid coordinates of `pos`, if it lies on the grid
    fn cell_at(&self, pos: TilePos) -> Option<(u32, u32)> {
        let x = u32::try_from(pos.x).ok()?;
        let y = u32::try_from(pos.y).ok()?;
        self.grid().contains(x, y).then_some((x, y))
    }

    fn modifier_held(&self) -> bool {
        self.rect_selecting || self.rect_pasting
    }

    /// Primary button pressed over the map
    pub fn pointer_down(&mut self, pos: TilePos) -> Redraw {
        let cell = self.cell_at(pos);
        self.hover = cell;

        if self.mode != EditMode::Normal {
            return Redraw::None;
        }

        if self.rect_selecting {
            let Some(start) = cell else {
                return Redraw::None;
            };
            self.selection.start = Some(start);
            self.selection.end = None;
            return Redraw::Interaction;
        }

        if self.rect_pasting {
            return Redraw::None;
        }

        self.is_painting = true;
        match cell {
            Some((x, y)) => self.paint_tile_checked(x, y),
            None => Redraw::None,
        }
    }

    /// Pointer moved over the map, with or without a button held
    pub fn pointer_move(&mut self, pos: TilePos) -> Redraw {
        let cell = self.cell_at(pos);
        self.hover = cell;

        if self.mode != EditMode::Normal {
            return Redraw::None;
        }

        if self.rect_selecting {
            if let (Some(end), false) = (cell, self.selection.is_empty()) {
                self.selection.end = Some(end);
            }
            return Redraw::Interaction;
        }

        if self.is_painting && !self.rect_pasting {
            if let Some((x, y)) = cell {
                return self.paint_tile_checked(x, y).merge(Redraw::Interaction);
            }
        }
        Redraw::Interaction
    }

    /// Primary button released
    pub fn pointer_up(&mut self) -> Redraw {
        self.is_painting = false;

        if self.mode == EditMode::Normal && self.rect_selecting && !self.selection.is_empty() {
            return self.finish_rect_select();
        }
        Redraw::None
    }

    /// Pointer left the map; ends any stroke
    pub fn pointer_leave(&mut self) -> Redraw {
        self.is_painting = false;
        self.hover = None;
        Redraw::Interaction
    }

    /// Primary button clicked (pressed and released on the same tile)
    pub fn click(&mut self, pos: TilePos) -> Redraw {
        let Some((x, y)) = self.cell_at(pos) else {
            return Redraw::None;
        };

        match self.mode {
            EditMode::Room => self.toggle_room(x, y),
            EditMode::SpecialTile => self.toggle_special_tile(x, y),
            EditMode::Enemy => self.toggle_enemy(x, y),
            EditMode::Normal => {
                let mut redraw = Redraw::None;
                if !self.modifier_held() {
                    // Click painting is unconditional and takes no snapshot;
                    // the pointer_down that precedes it already did.
                    if self.grid.set_tile_index(x, y, self.selected_tile).is_ok() {
                        self.dirty = true;
                        redraw = Redraw::All;
                    }
                }
                if self.rect_pasting {
                    redraw = redraw.merge(self.paste_at(x, y));
                }
                redraw
            }
        }
    }

    /// Store the destination for the passage waiting in [`Self::pending_passage`]
    pub fn confirm_passage_target(&mut self, target: PassageTarget) -> Redraw {
        let Some(prompt) = self.pending_passage.take() else {
            return Redraw::None;
        };
        match self
            .grid
            .set_passage_target(prompt.x, prompt.y, Some(target))
        {
            Ok(()) => {
                tracing::info!(
                    "Passage at ({}, {}) leads to floor {} ({}, {})",
                    prompt.x,
                    prompt.y,
                    target.floor,
                    target.x,
                    target.y
                );
                self.dirty = true;
                Redraw::Overlay
            }
            Err(e) => {
                tracing::warn!("Dropping passage target: {}", e);
                Redraw::None
            }
        }
    }

    /// Dismiss the passage prompt, leaving the cell's target as it was
    pub fn cancel_passage_target(&mut self) -> Redraw {
        self.pending_passage = None;
        Redraw::None
    }

    /// Paint one cell, snapshotting first, unless it already holds the selected tile
    fn paint_tile_checked(&mut self, x: u32, y: u32) -> Redraw {
        let Ok(cell) = self.grid.get(x, y) else {
            return Redraw::None;
        };
        if cell.tile_index == self.selected_tile {
            return Redraw::None;
        }

        self.record_history();
        if self.grid.set_tile_index(x, y, self.selected_tile).is_err() {
            return Redraw::None;
        }
        self.dirty = true;
        Redraw::All
    }

    /// Stamp the clipboard with its top-left at `(x, y)`
    fn paste_at(&mut self, x: u32, y: u32) -> Redraw {
        if self.clipboard.is_empty() {
            tracing::debug!("Paste with an empty clipboard");
            return Redraw::None;
        }

        self.record_history();
        let Some(region) = self.clipboard.region() else {
            return Redraw::None;
        };
        let written = region.paste(&mut self.grid, x, y);
        tracing::debug!("Pasted {} tiles at ({}, {})", written, x, y);
        self.dirty = true;
        Redraw::All
    }

    /// Normalize the dragged rectangle and copy it to the clipboard
    fn finish_rect_select(&mut self) -> Redraw {
        let Some((x0, y0, x1, y1)) = self.selection.normalized() else {
            return Redraw::None;
        };

        self.record_history();
        match ClipboardRegion::capture(&self.grid, x0, y0, x1, y1) {
            Ok(region) => self.clipboard.set(region),
            Err(e) => tracing::warn!("Could not copy selection: {}", e),
        }
        self.selection.clear();
        Redraw::Interaction
    }

    fn toggle_room(&mut self, x: u32, y: u32) -> Redraw {
        let has_tile = self.grid.get(x, y).is_ok_and(|c| c.has_tile());
        if !has_tile {
            tracing::debug!("Cell ({}, {}) has no tile, room not assigned", x, y);
            return Redraw::None;
        }
        match self.grid.toggle(x, y, ToggleField::Room(self.selected_room)) {
            Ok(_) => {
                self.dirty = true;
                Redraw::Overlay
            }
            Err(_) => Redraw::None,
        }
    }

    fn toggle_special_tile(&mut self, x: u32, y: u32) -> Redraw {
        let field = ToggleField::Annotation(self.selected_kind);
        let Ok(assigned) = self.grid.toggle(x, y, field) else {
            return Redraw::None;
        };
        self.dirty = true;

        if let Ok(cell) = self.grid.get(x, y) {
            if assigned && cell.is_passage() {
                self.pending_passage = Some(PassagePrompt {
                    x,
                    y,
                    current: cell.passage_target,
                });
            }
        }
        Redraw::Overlay
    }

    fn toggle_enemy(&mut self, x: u32, y: u32) -> Redraw {
        match self.grid.toggle(x, y, ToggleField::Enemy(self.selected_enemy)) {
            Ok(_) => {
                self.dirty = true;
                Redraw::Overlay
            }
            Err(_) => Redraw::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::shortcuts::ShortcutAction;
    use crate::EditorConfig;
    use dungeon_map_core::AnnotationKind;

    fn small_session() -> EditorSession {
        EditorSession::with_config(EditorConfig::new().with_dimensions(20, 20))
    }

    /// Press, release and click on one tile, as a browser-style host reports it
    fn tap(session: &mut EditorSession, x: i32, y: i32) {
        session.pointer_down(TilePos::new(x, y));
        session.pointer_up();
        session.click(TilePos::new(x, y));
    }

    #[test]
    fn test_from_pixels() {
        assert_eq!(TilePos::from_pixels(125.0, 49.9, 50), TilePos::new(2, 0));
        assert_eq!(TilePos::from_pixels(-1.0, 0.0, 50), TilePos::new(-1, 0));
    }

    #[test]
    fn test_paint_then_undo() {
        let mut session = small_session();
        session.selected_tile = 3;
        tap(&mut session, 5, 5);
        assert_eq!(session.grid().get(5, 5).unwrap().tile_index, 3);
        assert_eq!(session.history().undo_len(), 1);

        session.undo();
        assert_eq!(session.grid().get(5, 5).unwrap().tile_index, 0);
    }

    #[test]
    fn test_drag_snapshots_each_changed_cell() {
        let mut session = small_session();
        session.selected_tile = 2;
        session.grid.set_tile_index(2, 0, 2).unwrap();

        session.pointer_down(TilePos::new(0, 0));
        session.pointer_move(TilePos::new(1, 0));
        session.pointer_move(TilePos::new(1, 0));
        session.pointer_move(TilePos::new(2, 0));
        session.pointer_move(TilePos::new(3, 0));
        session.pointer_up();

        // (0,0), (1,0) and (3,0) changed; the revisit and the matching (2,0) did not
        assert_eq!(session.history().undo_len(), 3);
        for x in 0..4 {
            assert_eq!(session.grid().get(x, 0).unwrap().tile_index, 2);
        }

        session.undo();
        assert_eq!(session.grid().get(3, 0).unwrap().tile_index, 0);
        assert_eq!(session.grid().get(1, 0).unwrap().tile_index, 2);
    }

    #[test]
    fn test_move_without_button_does_not_paint() {
        let mut session = small_session();
        session.selected_tile = 4;
        assert_eq!(session.pointer_move(TilePos::new(3, 3)), Redraw::Interaction);
        assert_eq!(session.hover, Some((3, 3)));
        assert_eq!(session.grid().get(3, 3).unwrap().tile_index, 0);
    }

    #[test]
    fn test_pointer_leave_ends_stroke() {
        let mut session = small_session();
        session.selected_tile = 1;
        session.pointer_down(TilePos::new(0, 0));
        session.pointer_leave();
        session.pointer_move(TilePos::new(1, 1));
        assert_eq!(session.grid().get(1, 1).unwrap().tile_index, 0);
        assert_eq!(session.hover, Some((1, 1)));
    }

    #[test]
    fn test_leaving_mid_stroke_stops_painting() {
        let mut session = small_session();
        session.selected_tile = 4;
        let mut pointer = PointerTracker::default();

        pointer.over_map(&mut session, TilePos::new(0, 0), true, false);
        assert!(session.is_painting);

        // Released over the palette, then back over the map with no button
        assert_eq!(pointer.off_map(&mut session, false, true), Redraw::Interaction);
        assert!(!session.is_painting);
        assert_eq!(session.hover, None);
        pointer.over_map(&mut session, TilePos::new(10, 10), false, false);

        assert!(!session.is_painting);
        assert_eq!(session.grid().get(10, 10).unwrap().tile_index, 0);
        assert_eq!(session.grid().get(0, 0).unwrap().tile_index, 4);
        assert_eq!(session.history().undo_len(), 1);
    }

    #[test]
    fn test_release_counts_as_click_only_after_press_on_map() {
        let mut session = small_session();
        session.toggle_mode(EditMode::Enemy);
        session.selected_enemy = 2;
        let mut pointer = PointerTracker::default();

        // Pressed over the palette, released over the map
        pointer.off_map(&mut session, true, false);
        pointer.over_map(&mut session, TilePos::new(3, 3), false, true);
        assert_eq!(session.grid().get(3, 3).unwrap().enemy_index, None);

        // Pressed and released over the map
        pointer.over_map(&mut session, TilePos::new(3, 3), true, false);
        pointer.over_map(&mut session, TilePos::new(3, 3), false, true);
        assert_eq!(session.grid().get(3, 3).unwrap().enemy_index, Some(2));
    }

    #[test]
    fn test_pointer_tracker_moves_once_per_tile() {
        let mut session = small_session();
        let mut pointer = PointerTracker::default();
        let pos = TilePos::new(2, 2);
        assert_eq!(pointer.over_map(&mut session, pos, false, false), Redraw::Interaction);
        assert_eq!(pointer.over_map(&mut session, pos, false, false), Redraw::None);
        assert_eq!(pointer.off_map(&mut session, false, false), Redraw::Interaction);
        assert_eq!(pointer.off_map(&mut session, false, false), Redraw::None);
    }

    #[test]
    fn test_out_of_grid_pointer_is_ignored() {
        let mut session = small_session();
        session.selected_tile = 1;
        assert_eq!(session.pointer_down(TilePos::new(-1, 0)), Redraw::None);
        assert_eq!(session.click(TilePos::new(20, 3)), Redraw::None);
        assert_eq!(session.history().undo_len(), 0);
    }

    #[test]
    fn test_room_toggle_requires_tile() {
        let mut session = small_session();
        session.toggle_mode(EditMode::Room);
        session.selected_room = 3;

        assert_eq!(session.click(TilePos::new(4, 4)), Redraw::None);
        assert_eq!(session.grid().get(4, 4).unwrap().room_id, 0);

        session.grid.set_tile_index(4, 4, 1).unwrap();
        tap(&mut session, 4, 4);
        assert_eq!(session.grid().get(4, 4).unwrap().room_id, 3);
        tap(&mut session, 4, 4);
        assert_eq!(session.grid().get(4, 4).unwrap().room_id, 0);
    }

    #[test]
    fn test_annotation_modes_leave_tiles_and_history_alone() {
        let mut session = small_session();
        session.selected_tile = 9;
        session.toggle_mode(EditMode::Enemy);
        session.selected_enemy = 2;

        tap(&mut session, 1, 1);
        let cell = session.grid().get(1, 1).unwrap();
        assert_eq!(cell.enemy_index, Some(2));
        assert_eq!(cell.tile_index, 0);
        assert_eq!(session.history().undo_len(), 0);
    }

    #[test]
    fn test_passage_prompt_confirm() {
        let mut session = small_session();
        session.toggle_mode(EditMode::SpecialTile);
        session.selected_kind = AnnotationKind::Passage;

        assert_eq!(session.click(TilePos::new(6, 7)), Redraw::Overlay);
        let prompt = session.pending_passage.unwrap();
        assert_eq!((prompt.x, prompt.y, prompt.current), (6, 7, None));

        session.confirm_passage_target(PassageTarget::new(1, 10, 12));
        assert!(session.pending_passage.is_none());
        let cell = session.grid().get(6, 7).unwrap();
        assert_eq!(cell.passage_target, Some(PassageTarget::new(1, 10, 12)));
    }

    #[test]
    fn test_passage_prompt_cancel_leaves_target_unset() {
        let mut session = small_session();
        session.toggle_mode(EditMode::SpecialTile);
        session.selected_kind = AnnotationKind::Passage;
        session.click(TilePos::new(0, 0));
        session.apply_shortcut(ShortcutAction::Cancel);

        assert!(session.pending_passage.is_none());
        let cell = session.grid().get(0, 0).unwrap();
        assert_eq!(cell.annotation, Some(AnnotationKind::Passage));
        assert_eq!(cell.passage_target, None);
    }

    #[test]
    fn test_unsetting_passage_keeps_stale_target() {
        let mut session = small_session();
        session.toggle_mode(EditMode::SpecialTile);
        session.selected_kind = AnnotationKind::Passage;
        session.click(TilePos::new(2, 2));
        session.confirm_passage_target(PassageTarget::new(0, 1, 1));

        session.click(TilePos::new(2, 2));
        assert!(session.pending_passage.is_none());
        let cell = session.grid().get(2, 2).unwrap();
        assert_eq!(cell.annotation, None);
        assert!(cell.passage_target.is_some());
    }

    #[test]
    fn test_trap_does_not_prompt() {
        let mut session = small_session();
        session.toggle_mode(EditMode::SpecialTile);
        session.selected_kind = AnnotationKind::Trap;
        session.click(TilePos::new(2, 2));
        assert!(session.pending_passage.is_none());
        assert_eq!(
            session.grid().get(2, 2).unwrap().annotation,
            Some(AnnotationKind::Trap)
        );
    }

    #[test]
    fn test_rect_copy_and_paste() {
        let mut session = small_session();
        for (x, y) in [(2, 2), (3, 2), (2, 3), (3, 3)] {
            session.grid.set_tile_index(x, y, 7).unwrap();
        }

        session.apply_shortcut(ShortcutAction::BeginRectSelect);
        session.pointer_down(TilePos::new(3, 3));
        session.pointer_move(TilePos::new(2, 2));
        session.pointer_up();
        session.apply_shortcut(ShortcutAction::EndRectSelect);

        let region = session.clipboard().region().unwrap();
        assert_eq!((region.width(), region.height()), (2, 2));
        assert_eq!(session.history().undo_len(), 1);

        session.apply_shortcut(ShortcutAction::BeginRectPaste);
        tap(&mut session, 10, 10);
        assert_eq!(session.grid().get(11, 11).unwrap().tile_index, 7);
        assert_eq!(session.grid().get(12, 12).unwrap().tile_index, 0);
        assert_eq!(session.history().undo_len(), 2);

        // The clipboard survives the paste
        tap(&mut session, 15, 15);
        assert_eq!(session.grid().get(16, 16).unwrap().tile_index, 7);

        session.undo();
        assert_eq!(session.grid().get(16, 16).unwrap().tile_index, 0);
        assert_eq!(session.grid().get(11, 11).unwrap().tile_index, 7);
    }

    #[test]
    fn test_rect_select_without_move_copies_one_cell() {
        let mut session = small_session();
        session.grid.set_tile_index(4, 5, 3).unwrap();
        session.rect_selecting = true;
        session.pointer_down(TilePos::new(4, 5));
        session.pointer_up();

        let region = session.clipboard().region().unwrap();
        assert_eq!((region.width(), region.height()), (1, 1));
        assert_eq!(region.get(0, 0).unwrap().tile_index, 3);
    }

    #[test]
    fn test_paste_with_empty_clipboard_is_noop() {
        let mut session = small_session();
        session.rect_pasting = true;
        assert_eq!(session.click(TilePos::new(1, 1)), Redraw::None);
        assert_eq!(session.history().undo_len(), 0);
    }

    #[test]
    fn test_pasting_does_not_paint() {
        let mut session = small_session();
        session.selected_tile = 5;
        session.rect_pasting = true;
        tap(&mut session, 1, 1);
        assert_eq!(session.grid().get(1, 1).unwrap().tile_index, 0);
    }

    #[test]
    fn test_modifiers_ignored_outside_normal_mode() {
        let mut session = small_session();
        session.rect_selecting = true;
        session.toggle_mode(EditMode::Enemy);
        session.pointer_down(TilePos::new(1, 1));
        session.pointer_up();
        assert!(session.selection.is_empty());
        assert!(session.clipboard().is_empty());
        assert!(session.rect_selecting);
    }
}
