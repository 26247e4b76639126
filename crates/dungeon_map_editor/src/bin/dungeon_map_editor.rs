//! Standalone dungeon floor editor
//!
//! Run with: cargo run -p dungeon_map_editor --features native [-- <tileset.png> [enemies.png]]

use bevy::asset::{AssetPlugin, UnapprovedPathMode};
use bevy::image::{ImageFilterMode, ImageSamplerDescriptor};
use bevy::prelude::*;
use bevy::window::WindowResolution;
use dungeon_map_editor::plugin::{EditorPlugin, PendingRedraw};
use dungeon_map_editor::preferences::EditorPreferences;
use dungeon_map_editor::{EditorSession, Redraw};

fn main() {
    let mut args = std::env::args().skip(1);
    let mut plugin = EditorPlugin::new();
    if let Some(tileset) = args.next() {
        plugin = plugin.with_tileset(tileset);
    }
    if let Some(enemies) = args.next() {
        plugin = plugin.with_enemy_sheet(enemies);
    }

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Dungeon Map Editor".to_string(),
                        resolution: WindowResolution::new(1600, 900)
                            .with_scale_factor_override(1.0),
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin {
                    // Tiles are pixel art
                    default_sampler: ImageSamplerDescriptor {
                        mag_filter: ImageFilterMode::Nearest,
                        min_filter: ImageFilterMode::Nearest,
                        mipmap_filter: ImageFilterMode::Nearest,
                        ..default()
                    },
                })
                .set(AssetPlugin {
                    // Tilesets and sprite sheets are picked from anywhere on disk
                    unapproved_path_mode: UnapprovedPathMode::Allow,
                    ..default()
                }),
        )
        .add_plugins(plugin)
        .add_systems(Startup, auto_open_last_floor)
        .run();
}

/// System to reopen the last floor on startup if enabled in preferences
fn auto_open_last_floor(
    mut session: ResMut<EditorSession>,
    mut redraw: ResMut<PendingRedraw>,
    preferences: Res<EditorPreferences>,
) {
    let Some(path) = preferences.last_floor() else {
        return;
    };
    if !path.exists() {
        warn!("Last floor file not found: {:?}", path);
        return;
    }

    match session.load_floor(&path) {
        Ok(()) => {
            info!("Auto-opened last floor: {:?}", path);
            redraw.request(Redraw::All);
        }
        Err(e) => warn!("Failed to auto-open floor {:?}: {}", path, e),
    }
}
