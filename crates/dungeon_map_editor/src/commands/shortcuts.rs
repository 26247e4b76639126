//! Keyboard shortcut handling
//!
//! Rectangle copy and paste are held modifiers: Ctrl+C / Ctrl+V switch them
//! on when pressed and off when released.

use crate::{EditMode, EditorSession, Redraw};

/// A key as far as the shortcuts are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutKey {
    /// A letter key, lowercase
    Char(char),
    Ctrl,
    Escape,
}

/// One key event together with the modifier state at that moment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: ShortcutKey,
    pub ctrl: bool,
    pub shift: bool,
}

impl KeyInput {
    pub fn new(key: ShortcutKey) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
        }
    }

    pub fn ctrl(key: char) -> Self {
        Self {
            key: ShortcutKey::Char(key.to_ascii_lowercase()),
            ctrl: true,
            shift: false,
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// Editor action triggered by a shortcut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Undo,
    Redo,
    BeginRectSelect,
    EndRectSelect,
    BeginRectPaste,
    EndRectPaste,
    ToggleMode(EditMode),
    /// Dismiss the passage prompt, or drop the selection rectangle
    Cancel,
    /// Handled by the host: needs a file dialog
    Save,
    /// Handled by the host: needs a file dialog
    Open,
}

/// Map a key press to an action
pub fn action_for_press(input: KeyInput) -> Option<ShortcutAction> {
    match input.key {
        ShortcutKey::Escape => Some(ShortcutAction::Cancel),
        ShortcutKey::Ctrl => None,
        ShortcutKey::Char(c) if input.ctrl => match c.to_ascii_lowercase() {
            'z' if input.shift => Some(ShortcutAction::Redo),
            'z' => Some(ShortcutAction::Undo),
            'y' => Some(ShortcutAction::Redo),
            'c' => Some(ShortcutAction::BeginRectSelect),
            'v' => Some(ShortcutAction::BeginRectPaste),
            's' => Some(ShortcutAction::Save),
            'o' => Some(ShortcutAction::Open),
            _ => None,
        },
        ShortcutKey::Char(c) => match c.to_ascii_lowercase() {
            'r' => Some(ShortcutAction::ToggleMode(EditMode::Room)),
            't' => Some(ShortcutAction::ToggleMode(EditMode::SpecialTile)),
            'e' => Some(ShortcutAction::ToggleMode(EditMode::Enemy)),
            _ => None,
        },
    }
}

/// Map a key release to the actions it ends.
///
/// Releasing C ends rectangle copy, releasing V ends rectangle paste, and
/// releasing Ctrl ends both.
pub fn actions_for_release(input: KeyInput) -> Vec<ShortcutAction> {
    match input.key {
        ShortcutKey::Ctrl => vec![ShortcutAction::EndRectSelect, ShortcutAction::EndRectPaste],
        ShortcutKey::Char(c) => match c.to_ascii_lowercase() {
            'c' => vec![ShortcutAction::EndRectSelect],
            'v' => vec![ShortcutAction::EndRectPaste],
            _ => Vec::new(),
        },
        ShortcutKey::Escape => Vec::new(),
    }
}

impl EditorSession {
    /// Apply a shortcut action to the session.
    ///
    /// `Save` and `Open` need the host's file dialogs and are ignored here.
    pub fn apply_shortcut(&mut self, action: ShortcutAction) -> Redraw {
        match action {
            ShortcutAction::Undo => {
                self.undo();
                Redraw::All
            }
            ShortcutAction::Redo => {
                self.redo();
                Redraw::All
            }
            ShortcutAction::BeginRectSelect => {
                if !self.rect_selecting {
                    tracing::debug!("Rectangle copy on");
                    self.rect_selecting = true;
                }
                Redraw::None
            }
            ShortcutAction::EndRectSelect => {
                if !self.rect_selecting {
                    return Redraw::None;
                }
                tracing::debug!("Rectangle copy off");
                self.rect_selecting = false;
                self.selection.clear();
                Redraw::Interaction
            }
            ShortcutAction::BeginRectPaste => {
                if !self.rect_pasting {
                    tracing::debug!("Rectangle paste on");
                    self.rect_pasting = true;
                }
                Redraw::None
            }
            ShortcutAction::EndRectPaste => {
                if self.rect_pasting {
                    tracing::debug!("Rectangle paste off");
                    self.rect_pasting = false;
                }
                Redraw::None
            }
            ShortcutAction::ToggleMode(mode) => self.toggle_mode(mode),
            ShortcutAction::Cancel => {
                if self.pending_passage.is_some() {
                    self.cancel_passage_target()
                } else if !self.selection.is_empty() {
                    self.selection.clear();
                    Redraw::Interaction
                } else {
                    Redraw::None
                }
            }
            ShortcutAction::Save | ShortcutAction::Open => Redraw::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::history::UndoOutcome;
    use crate::tools::TilePos;

    #[test]
    fn test_press_mapping() {
        assert_eq!(
            action_for_press(KeyInput::ctrl('z')),
            Some(ShortcutAction::Undo)
        );
        assert_eq!(
            action_for_press(KeyInput::ctrl('Z').with_shift()),
            Some(ShortcutAction::Redo)
        );
        assert_eq!(
            action_for_press(KeyInput::ctrl('c')),
            Some(ShortcutAction::BeginRectSelect)
        );
        assert_eq!(
            action_for_press(KeyInput::ctrl('v')),
            Some(ShortcutAction::BeginRectPaste)
        );
        assert_eq!(
            action_for_press(KeyInput::new(ShortcutKey::Char('r'))),
            Some(ShortcutAction::ToggleMode(EditMode::Room))
        );
        assert_eq!(action_for_press(KeyInput::new(ShortcutKey::Char('c'))), None);
    }

    #[test]
    fn test_release_mapping() {
        assert_eq!(
            actions_for_release(KeyInput::new(ShortcutKey::Char('c'))),
            vec![ShortcutAction::EndRectSelect]
        );
        assert_eq!(actions_for_release(KeyInput::new(ShortcutKey::Ctrl)).len(), 2);
        assert!(actions_for_release(KeyInput::new(ShortcutKey::Char('q'))).is_empty());
    }

    #[test]
    fn test_modifiers_hold_and_release() {
        let mut session = EditorSession::new();
        session.apply_shortcut(ShortcutAction::BeginRectSelect);
        session.apply_shortcut(ShortcutAction::BeginRectPaste);
        assert!(session.rect_selecting && session.rect_pasting);

        session.pointer_down(TilePos::new(1, 1));
        assert!(!session.selection.is_empty());

        session.apply_shortcut(ShortcutAction::EndRectSelect);
        assert!(!session.rect_selecting);
        assert!(session.selection.is_empty());
        assert!(session.rect_pasting);
    }

    #[test]
    fn test_undo_shortcut() {
        let mut session = EditorSession::new();
        session.selected_tile = 2;
        session.pointer_down(TilePos::new(0, 0));
        session.pointer_up();

        assert_eq!(session.apply_shortcut(ShortcutAction::Undo), Redraw::All);
        assert_eq!(session.grid().get(0, 0).unwrap().tile_index, 0);
        assert_eq!(session.undo(), UndoOutcome::EmptyHistory);
    }
}
