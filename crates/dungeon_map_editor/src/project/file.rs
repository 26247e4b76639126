//! Floor and image file operations

use std::path::Path;

use dungeon_map_core::{FloorFileError, SpriteSheetInfo, TilesetInfo};

use crate::EditorSession;

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Floor(#[from] FloorFileError),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("No file path set")]
    NoPath,
}

impl EditorSession {
    /// Load a floor file from disk
    pub fn load_floor(&mut self, path: &Path) -> Result<(), ProjectError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                self.error_message = Some(format!("Could not read {}: {}", path.display(), e));
                return Err(e.into());
            }
        };

        self.import_floor_str(&content)?;
        self.floor_path = Some(path.to_path_buf());
        tracing::info!("Loaded floor from {:?}", path);
        Ok(())
    }

    /// Save the live grid to `path`
    pub fn save_floor(&mut self, path: &Path) -> Result<(), ProjectError> {
        let content = self.export_floor_json()?;
        std::fs::write(path, content)?;

        self.floor_path = Some(path.to_path_buf());
        self.dirty = false;
        tracing::info!("Saved floor to {:?}", path);
        Ok(())
    }

    /// Save to the path of the last load or save
    pub fn save_current(&mut self) -> Result<(), ProjectError> {
        match self.floor_path.clone() {
            Some(path) => self.save_floor(&path),
            None => Err(ProjectError::NoPath),
        }
    }

    /// Read the tileset image's dimensions and use it for painting and the palette
    pub fn load_tileset(&mut self, path: &Path) -> Result<TilesetInfo, ProjectError> {
        let info = TilesetInfo::from_image_path(path, self.tile_size)?;
        self.tileset = Some(info);
        Ok(info)
    }

    /// Read the enemy sprite sheet's dimensions for the enemy overlay
    pub fn load_enemy_sheet(&mut self, path: &Path) -> Result<SpriteSheetInfo, ProjectError> {
        let info = SpriteSheetInfo::from_image_path(path, self.tile_size)?;
        self.enemy_sheet = Some(info);
        Ok(info)
    }
}
