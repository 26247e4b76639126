//! Bevy host for the editing session
//!
//! The map is laid out in world space with y flipped: map pixel `(px, py)`
//! sits at world `(px, -py)`. Each redraw replays a [`DrawList`] into
//! sprites and text tagged with [`MapDrawn`]; outlines are drawn with gizmos
//! every frame.

use std::path::PathBuf;

use bevy::math::Isometry2d;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use dungeon_map_core::{AnnotationKind, PassageTarget, SourceRect, PALETTE_COLUMNS};

use crate::commands::shortcuts::{
    action_for_press, actions_for_release, KeyInput, ShortcutAction, ShortcutKey,
};
use crate::preferences::EditorPreferences;
use crate::render::{
    render_viewport, DrawCommand, DrawLayer, DrawList, PixelRect, PixelViewport, Rgba,
};
use crate::tools::{PointerTracker, TilePos};
use crate::{EditMode, EditorConfig, EditorSession, Redraw};

/// Camera pan speed in pixels per second
const PAN_SPEED: f32 = 900.0;

/// Main editor plugin
///
/// # Example
///
/// ```rust,ignore
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(EditorPlugin::new().with_tileset("assets/tileset.png"))
///     .run();
/// ```
#[derive(Default)]
pub struct EditorPlugin {
    config: Option<EditorConfig>,
    tileset_path: Option<PathBuf>,
    enemy_sheet_path: Option<PathBuf>,
}

impl EditorPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config` instead of the one built from saved preferences
    pub fn with_config(mut self, config: EditorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Tileset image to paint with (overrides the last one used)
    pub fn with_tileset(mut self, path: impl Into<PathBuf>) -> Self {
        self.tileset_path = Some(path.into());
        self
    }

    /// Enemy sprite sheet (overrides the last one used)
    pub fn with_enemy_sheet(mut self, path: impl Into<PathBuf>) -> Self {
        self.enemy_sheet_path = Some(path.into());
        self
    }
}

impl Plugin for EditorPlugin {
    fn build(&self, app: &mut App) {
        let preferences = EditorPreferences::load();
        info!("Loaded editor preferences");

        let config = self
            .config
            .clone()
            .unwrap_or_else(|| EditorConfig::from_preferences(&preferences));
        let mut session = EditorSession::with_config(config);

        let tileset_path = self
            .tileset_path
            .clone()
            .or_else(|| preferences.last_tileset_path.clone());
        let enemy_sheet_path = self
            .enemy_sheet_path
            .clone()
            .or_else(|| preferences.last_enemy_sheet_path.clone());

        let mut images = MapImages::default();
        if let Some(path) = tileset_path {
            match session.load_tileset(&path) {
                Ok(_) => images.tileset_path = Some(path),
                Err(e) => warn!("Could not load tileset {:?}: {}", path, e),
            }
        }
        if let Some(path) = enemy_sheet_path {
            match session.load_enemy_sheet(&path) {
                Ok(_) => images.enemy_sheet_path = Some(path),
                Err(e) => warn!("Could not load enemy sheet {:?}: {}", path, e),
            }
        }

        app.insert_resource(session)
            .insert_resource(preferences)
            .insert_resource(images)
            .insert_resource(PendingRedraw(Redraw::All))
            .init_resource::<InteractionOutlines>()
            .init_resource::<PassageForm>()
            .add_systems(Startup, (setup_editor_camera, setup_hud, load_map_images))
            .add_systems(
                Update,
                (
                    handle_keyboard_shortcuts,
                    handle_value_keys,
                    handle_passage_form,
                    handle_viewport_input,
                    pan_camera,
                    sync_palette,
                    highlight_palette_selection,
                    sync_viewport,
                    draw_outlines,
                    update_hud,
                )
                    .chain(),
            );
    }
}

/// Layers waiting to be redrawn
#[derive(Resource, Default)]
pub struct PendingRedraw(pub Redraw);

impl PendingRedraw {
    pub fn request(&mut self, redraw: Redraw) {
        self.0 = self.0.merge(redraw);
    }
}

/// Image handles for the tileset and enemy sheet
#[derive(Resource, Default)]
pub struct MapImages {
    pub tileset_path: Option<PathBuf>,
    pub enemy_sheet_path: Option<PathBuf>,
    pub tileset: Option<Handle<Image>>,
    pub enemy_sheet: Option<Handle<Image>>,
    /// Palette panel needs rebuilding
    pub palette_stale: bool,
}

/// Outlines from the interaction layer, redrawn with gizmos each frame
#[derive(Resource, Default)]
pub struct InteractionOutlines(Vec<(PixelRect, Rgba)>);

/// Passage target being edited in the HUD
#[derive(Resource, Default)]
pub struct PassageForm {
    /// 0 = floor, 1 = x, 2 = y
    field: usize,
    /// Cell the form was opened for
    cell: Option<(u32, u32)>,
    target: Option<PassageTarget>,
}

/// Entity spawned from a draw command
#[derive(Component)]
pub struct MapDrawn(pub DrawLayer);

#[derive(Component)]
pub struct PaletteTile;

/// Yellow outline over the selected palette tile
#[derive(Component)]
pub struct PaletteHighlight;

#[derive(Component)]
pub struct HudText;

fn setup_editor_camera(mut commands: Commands, session: Res<EditorSession>) {
    // Start centered on the top-left screenful of the map
    let ts = session.tile_size as f32;
    commands.spawn((Camera2d, Transform::from_xyz(ts * 8.0, -ts * 6.0, 0.0)));
}

fn setup_hud(mut commands: Commands) {
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(8.0),
            top: Val::Px(8.0),
            ..default()
        },
        HudText,
    ));
}

fn load_map_images(asset_server: Res<AssetServer>, mut images: ResMut<MapImages>) {
    if let Some(path) = images.tileset_path.clone() {
        images.tileset = Some(asset_server.load(path));
        images.palette_stale = true;
    }
    if let Some(path) = images.enemy_sheet_path.clone() {
        images.enemy_sheet = Some(asset_server.load(path));
    }
}

fn shortcut_key(code: KeyCode) -> Option<ShortcutKey> {
    let key = match code {
        KeyCode::ControlLeft | KeyCode::ControlRight => ShortcutKey::Ctrl,
        KeyCode::Escape => ShortcutKey::Escape,
        KeyCode::KeyZ => ShortcutKey::Char('z'),
        KeyCode::KeyY => ShortcutKey::Char('y'),
        KeyCode::KeyC => ShortcutKey::Char('c'),
        KeyCode::KeyV => ShortcutKey::Char('v'),
        KeyCode::KeyS => ShortcutKey::Char('s'),
        KeyCode::KeyO => ShortcutKey::Char('o'),
        KeyCode::KeyR => ShortcutKey::Char('r'),
        KeyCode::KeyT => ShortcutKey::Char('t'),
        KeyCode::KeyE => ShortcutKey::Char('e'),
        _ => return None,
    };
    Some(key)
}

/// System to map keyboard input to shortcut actions
pub fn handle_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut session: ResMut<EditorSession>,
    mut preferences: ResMut<EditorPreferences>,
    mut redraw: ResMut<PendingRedraw>,
) {
    let ctrl = keyboard.pressed(KeyCode::ControlLeft) || keyboard.pressed(KeyCode::ControlRight);
    let shift = keyboard.pressed(KeyCode::ShiftLeft) || keyboard.pressed(KeyCode::ShiftRight);

    let mut actions = Vec::new();
    for code in keyboard.get_just_pressed() {
        if let Some(key) = shortcut_key(*code) {
            actions.extend(action_for_press(KeyInput { key, ctrl, shift }));
        }
    }
    for code in keyboard.get_just_released() {
        if let Some(key) = shortcut_key(*code) {
            actions.extend(actions_for_release(KeyInput { key, ctrl, shift }));
        }
    }

    for action in actions {
        match action {
            ShortcutAction::Save => save_floor(&mut session, &mut preferences, shift),
            ShortcutAction::Open => {
                if open_floor(&mut session, &mut preferences) {
                    redraw.request(Redraw::All);
                }
            }
            other => redraw.request(session.apply_shortcut(other)),
        }
    }
}

fn remember_floor(preferences: &mut EditorPreferences, path: PathBuf) {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    preferences.add_recent_floor(path, name);
    if let Err(e) = preferences.save() {
        error!("Failed to save preferences: {}", e);
    }
}

/// Save to the current file, or ask for one with `save_as` or when none is set
fn save_floor(session: &mut EditorSession, preferences: &mut EditorPreferences, save_as: bool) {
    let path = match session.floor_path.clone() {
        Some(path) if !save_as => Some(path),
        _ => pick_save_path(&preferences.export_file_name),
    };
    let Some(path) = path else {
        return;
    };

    match session.save_floor(&path) {
        Ok(()) => remember_floor(preferences, path),
        Err(e) => {
            error!("Failed to save floor: {}", e);
            session.error_message = Some(format!("Failed to save floor: {}", e));
        }
    }
}

fn open_floor(session: &mut EditorSession, preferences: &mut EditorPreferences) -> bool {
    let Some(path) = pick_open_path() else {
        return false;
    };
    match session.load_floor(&path) {
        Ok(()) => {
            remember_floor(preferences, path);
            true
        }
        Err(e) => {
            error!("Failed to load floor: {}", e);
            preferences.remove_recent_floor(&path.to_string_lossy());
            false
        }
    }
}

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
fn pick_save_path(file_name: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("Floor", &["json"])
        .set_file_name(file_name)
        .save_file()
}

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
fn pick_open_path() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("Floor", &["json"])
        .pick_file()
}

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
fn pick_image_path() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("Image", &["png", "jpg", "jpeg", "bmp"])
        .pick_file()
}

#[cfg(not(all(feature = "native", not(target_arch = "wasm32"))))]
fn pick_save_path(_file_name: &str) -> Option<PathBuf> {
    warn!("File dialogs need the `native` feature");
    None
}

#[cfg(not(all(feature = "native", not(target_arch = "wasm32"))))]
fn pick_open_path() -> Option<PathBuf> {
    warn!("File dialogs need the `native` feature");
    None
}

#[cfg(not(all(feature = "native", not(target_arch = "wasm32"))))]
fn pick_image_path() -> Option<PathBuf> {
    warn!("File dialogs need the `native` feature");
    None
}

/// Bracket keys step the value the current mode paints with; F2 and F3
/// load a tileset and an enemy sheet.
fn handle_value_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    asset_server: Res<AssetServer>,
    mut session: ResMut<EditorSession>,
    mut preferences: ResMut<EditorPreferences>,
    mut images: ResMut<MapImages>,
    mut redraw: ResMut<PendingRedraw>,
) {
    let step: i64 = if keyboard.just_pressed(KeyCode::BracketRight) {
        1
    } else if keyboard.just_pressed(KeyCode::BracketLeft) {
        -1
    } else {
        0
    };

    if step != 0 {
        match session.mode {
            EditMode::Normal => {
                let count = session.tileset.map_or(u32::MAX, |t| t.tile_count.max(1));
                let next = (session.selected_tile as i64 + step).rem_euclid(count as i64);
                session.selected_tile = next as u32;
            }
            EditMode::Room => {
                session.selected_room = (session.selected_room as i64 + step).max(1) as u32;
            }
            EditMode::SpecialTile => {
                let kinds = AnnotationKind::ALL;
                let current = kinds
                    .iter()
                    .position(|k| *k == session.selected_kind)
                    .unwrap_or(0) as i64;
                let next = (current + step).rem_euclid(kinds.len() as i64) as usize;
                session.selected_kind = kinds[next];
            }
            EditMode::Enemy => {
                let count = session
                    .enemy_sheet
                    .map_or(u32::MAX, |s| s.frame_count.max(1));
                let next = (session.selected_enemy as i64 + step).rem_euclid(count as i64);
                session.selected_enemy = next as u32;
            }
        }
    }

    if keyboard.just_pressed(KeyCode::F2) {
        if let Some(path) = pick_image_path() {
            match session.load_tileset(&path) {
                Ok(_) => {
                    images.tileset = Some(asset_server.load(path.clone()));
                    images.tileset_path = Some(path.clone());
                    images.palette_stale = true;
                    preferences.last_tileset_path = Some(path);
                    if let Err(e) = preferences.save() {
                        error!("Failed to save preferences: {}", e);
                    }
                    redraw.request(Redraw::All);
                }
                Err(e) => session.error_message = Some(format!("Failed to load tileset: {}", e)),
            }
        }
    }

    if keyboard.just_pressed(KeyCode::F3) {
        if let Some(path) = pick_image_path() {
            match session.load_enemy_sheet(&path) {
                Ok(_) => {
                    images.enemy_sheet = Some(asset_server.load(path.clone()));
                    images.enemy_sheet_path = Some(path.clone());
                    preferences.last_enemy_sheet_path = Some(path);
                    if let Err(e) = preferences.save() {
                        error!("Failed to save preferences: {}", e);
                    }
                    redraw.request(Redraw::Overlay);
                }
                Err(e) => {
                    session.error_message = Some(format!("Failed to load enemy sheet: {}", e))
                }
            }
        }
    }
}

/// Edit the pending passage target: Tab picks the field, +/- change it,
/// Enter confirms. Escape is handled as a shortcut.
fn handle_passage_form(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut session: ResMut<EditorSession>,
    mut form: ResMut<PassageForm>,
    mut redraw: ResMut<PendingRedraw>,
) {
    let Some(prompt) = session.pending_passage else {
        if form.cell.is_some() {
            *form = PassageForm::default();
        }
        return;
    };
    if form.cell != Some((prompt.x, prompt.y)) {
        *form = PassageForm {
            field: 0,
            cell: Some((prompt.x, prompt.y)),
            target: Some(prompt.current.unwrap_or(PassageTarget::new(0, 0, 0))),
        };
    }
    let Some(mut target) = form.target else {
        return;
    };

    if keyboard.just_pressed(KeyCode::Tab) {
        form.field = (form.field + 1) % 3;
    }
    if keyboard.just_pressed(KeyCode::Enter) || keyboard.just_pressed(KeyCode::NumpadEnter) {
        redraw.request(session.confirm_passage_target(target));
        *form = PassageForm::default();
        return;
    }

    let delta = if keyboard.just_pressed(KeyCode::Equal) || keyboard.just_pressed(KeyCode::NumpadAdd)
    {
        1
    } else if keyboard.just_pressed(KeyCode::Minus)
        || keyboard.just_pressed(KeyCode::NumpadSubtract)
    {
        -1
    } else {
        0
    };
    if delta == 0 {
        return;
    }
    match form.field {
        0 => target.floor += delta,
        1 => target.x += delta,
        _ => target.y += delta,
    }
    form.target = Some(target);
}

/// Map pixel area covered by a camera centered at `center` showing `size` pixels
fn viewport_from_camera(center: Vec2, size: Vec2) -> PixelViewport {
    let left = center.x - size.x / 2.0;
    let top = -center.y - size.y / 2.0;
    let scroll_x = left.max(0.0);
    let scroll_y = top.max(0.0);
    PixelViewport::new(
        scroll_x as u32,
        scroll_y as u32,
        (left + size.x - scroll_x).max(0.0).ceil() as u32,
        (top + size.y - scroll_y).max(0.0).ceil() as u32,
    )
}

fn palette_width(session: &EditorSession) -> f32 {
    match session.tileset {
        Some(_) => (PALETTE_COLUMNS * session.tile_size) as f32,
        None => 0.0,
    }
}

/// System to route mouse input to the session
fn handle_viewport_input(
    mut session: ResMut<EditorSession>,
    mut redraw: ResMut<PendingRedraw>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    camera_q: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    mut pointer: Local<PointerTracker>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Ok((camera, camera_transform)) = camera_q.single() else {
        return;
    };
    let pressed = mouse_buttons.just_pressed(MouseButton::Left);
    let released = mouse_buttons.just_released(MouseButton::Left);

    let Some(cursor_position) = window.cursor_position() else {
        redraw.request(track_pointer(&mut session, |s| {
            pointer.off_map(s, pressed, released)
        }));
        return;
    };

    let palette_left = window.width() - palette_width(&session);
    if cursor_position.x >= palette_left {
        redraw.request(track_pointer(&mut session, |s| {
            pointer.off_map(s, pressed, released)
        }));
        if pressed {
            let px = (cursor_position.x - palette_left) as u32;
            let py = cursor_position.y as u32;
            if let Some(index) = session.select_tile_from_palette(px, py) {
                debug!("Selected tile {}", index);
            }
        }
        return;
    }

    let Ok(world_pos) = camera.viewport_to_world_2d(camera_transform, cursor_position) else {
        return;
    };
    let pos = TilePos::from_pixels(world_pos.x, -world_pos.y, session.tile_size);
    redraw.request(track_pointer(&mut session, |s| {
        pointer.over_map(s, pos, pressed, released)
    }));
}

/// Run a pointer update without tripping change detection on idle frames
fn track_pointer(
    session: &mut ResMut<EditorSession>,
    update: impl FnOnce(&mut EditorSession) -> Redraw,
) -> Redraw {
    let redraw = update(session.bypass_change_detection());
    if redraw != Redraw::None {
        session.set_changed();
    }
    redraw
}

/// System to pan the camera with the arrow keys
fn pan_camera(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut camera_q: Query<&mut Transform, With<Camera2d>>,
) {
    let mut direction = Vec2::ZERO;
    if keyboard.pressed(KeyCode::ArrowLeft) {
        direction.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::ArrowRight) {
        direction.x += 1.0;
    }
    if keyboard.pressed(KeyCode::ArrowUp) {
        direction.y += 1.0;
    }
    if keyboard.pressed(KeyCode::ArrowDown) {
        direction.y -= 1.0;
    }
    if direction == Vec2::ZERO {
        return;
    }

    let delta = direction * PAN_SPEED * time.delta_secs();
    for mut transform in camera_q.iter_mut() {
        transform.translation.x += delta.x;
        transform.translation.y += delta.y;
    }
}

fn source_to_rect(source: SourceRect) -> Rect {
    let (x, y, w, h) = source;
    Rect::new(x as f32, y as f32, (x + w) as f32, (y + h) as f32)
}

fn to_color(color: Rgba) -> Color {
    Color::srgba(
        color.r as f32 / 255.0,
        color.g as f32 / 255.0,
        color.b as f32 / 255.0,
        color.a,
    )
}

/// World-space center and size of a map pixel rectangle
fn world_rect(rect: PixelRect) -> (Vec2, Vec2) {
    let (cx, cy) = rect.center();
    (
        Vec2::new(cx, -cy),
        Vec2::new(rect.width as f32, rect.height as f32),
    )
}

fn layer_z(layer: DrawLayer) -> f32 {
    match layer {
        DrawLayer::Base => 0.0,
        DrawLayer::Overlay => 1.0,
        DrawLayer::Interaction => 2.0,
    }
}

/// Rebuild the palette panel on the right edge of the window
fn sync_palette(
    mut commands: Commands,
    session: Res<EditorSession>,
    mut images: ResMut<MapImages>,
    existing: Query<Entity, With<PaletteTile>>,
) {
    if !images.palette_stale {
        return;
    }
    images.palette_stale = false;

    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    let (Some(tileset), Some(handle)) = (session.tileset, images.tileset.clone()) else {
        return;
    };
    let ts = session.tile_size;
    let width = palette_width(&session);

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                right: Val::Px(0.0),
                top: Val::Px(0.0),
                width: Val::Px(width),
                height: Val::Px(tileset.palette_height() as f32),
                ..default()
            },
            BackgroundColor(Color::srgb(0.1, 0.1, 0.1)),
            PaletteTile,
        ))
        .with_children(|parent| {
            for index in 0..tileset.tile_count {
                let Some(source) = tileset.source_rect(index) else {
                    continue;
                };
                let (px, py) = tileset.palette_position(index);
                parent.spawn((
                    ImageNode {
                        rect: Some(source_to_rect(source)),
                        ..ImageNode::new(handle.clone())
                    },
                    Node {
                        position_type: PositionType::Absolute,
                        left: Val::Px(px as f32),
                        top: Val::Px(py as f32),
                        width: Val::Px(ts as f32),
                        height: Val::Px(ts as f32),
                        ..default()
                    },
                ));
            }

            let highlight = tileset.palette_slot(session.selected_tile);
            let (px, py) = highlight.unwrap_or_default();
            parent.spawn((
                Node {
                    position_type: PositionType::Absolute,
                    left: Val::Px(px as f32),
                    top: Val::Px(py as f32),
                    width: Val::Px(ts as f32),
                    height: Val::Px(ts as f32),
                    border: UiRect::all(Val::Px(2.0)),
                    ..default()
                },
                BorderColor::all(Color::srgb(1.0, 1.0, 0.0)),
                if highlight.is_some() {
                    Visibility::Inherited
                } else {
                    Visibility::Hidden
                },
                PaletteHighlight,
            ));
        });
}

/// Move the palette outline to the selected tile
fn highlight_palette_selection(
    session: Res<EditorSession>,
    mut highlight: Query<(&mut Node, &mut Visibility), With<PaletteHighlight>>,
) {
    if !session.is_changed() {
        return;
    }
    let Some(tileset) = session.tileset else {
        return;
    };
    let Ok((mut node, mut visibility)) = highlight.single_mut() else {
        return;
    };

    let Some((px, py)) = tileset.palette_slot(session.selected_tile) else {
        visibility.set_if_neq(Visibility::Hidden);
        return;
    };
    let (left, top) = (Val::Px(px as f32), Val::Px(py as f32));
    if node.left != left || node.top != top {
        node.left = left;
        node.top = top;
    }
    visibility.set_if_neq(Visibility::Inherited);
}

/// System to redraw the visible part of the map when something changed
fn sync_viewport(
    mut commands: Commands,
    session: Res<EditorSession>,
    images: Res<MapImages>,
    mut redraw: ResMut<PendingRedraw>,
    mut outlines: ResMut<InteractionOutlines>,
    windows: Query<&Window, With<PrimaryWindow>>,
    camera_q: Query<&Transform, With<Camera2d>>,
    drawn: Query<(Entity, &MapDrawn)>,
    mut last_viewport: Local<Option<PixelViewport>>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Ok(camera) = camera_q.single() else {
        return;
    };

    let size = Vec2::new(window.width() - palette_width(&session), window.height());
    let center = camera.translation.truncate() - Vec2::new(palette_width(&session) / 2.0, 0.0);
    let viewport = viewport_from_camera(center, size.max(Vec2::ZERO));
    if *last_viewport != Some(viewport) {
        *last_viewport = Some(viewport);
        redraw.request(Redraw::All);
    }
    if redraw.0 == Redraw::None {
        return;
    }

    let mut list = DrawList::new();
    let stats = render_viewport(&session, viewport, redraw.0, &mut list);
    trace!(
        "Redraw {:?}: {} tiles, {} overlay cells",
        redraw.0,
        stats.tiles_drawn,
        stats.overlay_cells
    );
    redraw.0 = Redraw::None;

    for command in list.drain() {
        match command {
            DrawCommand::Clear { layer, .. } => {
                for (entity, marker) in drawn.iter() {
                    if marker.0 == layer {
                        commands.entity(entity).despawn();
                    }
                }
                if layer == DrawLayer::Interaction {
                    outlines.0.clear();
                }
            }
            DrawCommand::Tile { source, dest } => {
                let Some(image) = images.tileset.clone() else {
                    continue;
                };
                spawn_image(&mut commands, image, source, dest, DrawLayer::Base);
            }
            DrawCommand::Sprite { source, dest } => {
                let Some(image) = images.enemy_sheet.clone() else {
                    continue;
                };
                spawn_image(&mut commands, image, source, dest, DrawLayer::Overlay);
            }
            DrawCommand::Fill { layer, rect, color } => {
                let (center, size) = world_rect(rect);
                commands.spawn((
                    Sprite {
                        color: to_color(color),
                        custom_size: Some(size),
                        ..default()
                    },
                    Transform::from_xyz(center.x, center.y, layer_z(layer) + 0.1),
                    MapDrawn(layer),
                ));
            }
            DrawCommand::Stroke { rect, color, .. } => {
                outlines.0.push((rect, color));
            }
            DrawCommand::Text {
                layer,
                text,
                center,
                style,
            } => {
                commands.spawn((
                    Text2d::new(text),
                    TextFont {
                        font_size: style.size_px,
                        ..default()
                    },
                    TextColor(to_color(style.color)),
                    Transform::from_xyz(center.0, -center.1, layer_z(layer) + 0.5),
                    MapDrawn(layer),
                ));
            }
        }
    }
}

fn spawn_image(
    commands: &mut Commands,
    image: Handle<Image>,
    source: SourceRect,
    dest: PixelRect,
    layer: DrawLayer,
) {
    let (center, size) = world_rect(dest);
    commands.spawn((
        Sprite {
            image,
            rect: Some(source_to_rect(source)),
            custom_size: Some(size),
            ..default()
        },
        Transform::from_xyz(center.x, center.y, layer_z(layer) + 0.2),
        MapDrawn(layer),
    ));
}

fn draw_outlines(mut gizmos: Gizmos, outlines: Res<InteractionOutlines>) {
    for (rect, color) in &outlines.0 {
        let (center, size) = world_rect(*rect);
        gizmos.rect_2d(Isometry2d::from_translation(center), size, to_color(*color));
    }
}

fn update_hud(
    session: Res<EditorSession>,
    form: Res<PassageForm>,
    mut hud: Query<&mut Text, With<HudText>>,
) {
    if !session.is_changed() && !form.is_changed() {
        return;
    }
    let Ok(mut text) = hud.single_mut() else {
        return;
    };

    let value = match session.mode {
        EditMode::Normal => format!("tile {}", session.selected_tile),
        EditMode::Room => {
            let used: Vec<String> = session
                .grid()
                .room_ids()
                .iter()
                .map(u32::to_string)
                .collect();
            format!("room {} (in use: {})", session.selected_room, used.join(" "))
        }
        EditMode::SpecialTile => format!("kind {}", session.selected_kind),
        EditMode::Enemy => format!("enemy {}", session.selected_enemy),
    };
    let mut lines = vec![format!(
        "{}: {}{}",
        session.mode.label(),
        value,
        if session.dirty { " *" } else { "" }
    )];
    let history = session.history();
    lines.push(format!(
        "undo {} / redo {}",
        history.undo_len(),
        history.redo_len()
    ));
    if session.rect_selecting {
        lines.push("Copy: drag a rectangle".to_string());
    }
    if session.rect_pasting {
        lines.push("Paste: click to stamp".to_string());
    }
    if let (Some(prompt), Some(target)) = (session.pending_passage, form.target) {
        let fields = ["floor", "x", "y"];
        lines.push(format!(
            "Passage at {},{} -> F{} {},{} (editing {}; Tab, +/-, Enter, Esc)",
            prompt.x, prompt.y, target.floor, target.x, target.y, fields[form.field]
        ));
    }
    if let Some(error) = &session.error_message {
        lines.push(error.clone());
    }
    text.0 = lines.join("\n");
}
