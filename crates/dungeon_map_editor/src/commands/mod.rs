//! Editor commands: undo history, clipboard and keyboard shortcuts

pub mod clipboard;
pub mod history;
pub mod shortcuts;

pub use clipboard::{ClipboardRegion, TileClipboard, TileSelection};
pub use history::{CommandHistory, UndoOutcome, MAX_UNDO};
pub use shortcuts::{
    action_for_press, actions_for_release, KeyInput, ShortcutAction, ShortcutKey,
};
