//! Persisted editor preferences

mod file;

pub use file::*;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::commands::history::MAX_UNDO;
use dungeon_map_core::TILE_SIZE;

/// Most recent floors kept in the list
pub const MAX_RECENT_FLOORS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentFloor {
    pub path: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(bevy::prelude::Resource))]
#[serde(default)]
pub struct EditorPreferences {
    pub tile_size: u32,
    pub history_capacity: usize,
    /// Suggested file name for saved floors
    pub export_file_name: String,
    /// Newest first
    pub recent_floors: Vec<RecentFloor>,
    pub auto_open_last_floor: bool,
    pub last_tileset_path: Option<PathBuf>,
    pub last_enemy_sheet_path: Option<PathBuf>,
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            history_capacity: MAX_UNDO,
            export_file_name: "map.json".to_string(),
            recent_floors: Vec::new(),
            auto_open_last_floor: false,
            last_tileset_path: None,
            last_enemy_sheet_path: None,
        }
    }
}

impl EditorPreferences {
    /// Move `path` to the front of the recent list
    pub fn add_recent_floor(&mut self, path: PathBuf, name: String) {
        let path = path.to_string_lossy().to_string();
        self.recent_floors.retain(|r| r.path != path);
        self.recent_floors.insert(0, RecentFloor { path, name });
        self.recent_floors.truncate(MAX_RECENT_FLOORS);
    }

    pub fn remove_recent_floor(&mut self, path: &str) {
        self.recent_floors.retain(|r| r.path != path);
    }

    pub fn clear_recent_floors(&mut self) {
        self.recent_floors.clear();
    }

    /// Floor to reopen on startup, if enabled
    pub fn last_floor(&self) -> Option<PathBuf> {
        if !self.auto_open_last_floor {
            return None;
        }
        self.recent_floors.first().map(|r| PathBuf::from(&r.path))
    }
}
