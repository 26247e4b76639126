//! Viewport rendering
//!
//! Only the cells inside the visible rectangle are cleared and redrawn; the
//! full grid is never walked. Drawing goes through [`DrawSurface`], so the
//! same code drives the Bevy host and the [`DrawList`] recorder used in
//! tests.
//!
//! Layers, bottom to top:
//! 1. Base: one tileset blit per visible cell.
//! 2. Overlay: at most one annotation layer, picked from the edit mode.
//! 3. Interaction: hover highlight and the selection rectangle.

use dungeon_map_core::{AnnotationKind, Cell, SourceRect};

use crate::{EditMode, EditorSession, Redraw};

/// The visible part of the map, in map pixel space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelViewport {
    pub scroll_x: u32,
    pub scroll_y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelViewport {
    pub fn new(scroll_x: u32, scroll_y: u32, width: u32, height: u32) -> Self {
        Self {
            scroll_x,
            scroll_y,
            width,
            height,
        }
    }

    pub fn area(&self) -> PixelRect {
        PixelRect::new(self.scroll_x, self.scroll_y, self.width, self.height)
    }
}

/// Inclusive rectangle of tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl TileRect {
    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }

    pub fn cell_count(&self) -> usize {
        ((self.max_x - self.min_x + 1) as usize) * ((self.max_y - self.min_y + 1) as usize)
    }

    /// Cells row by row
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> {
        let (min_x, max_x) = (self.min_x, self.max_x);
        (self.min_y..=self.max_y).flat_map(move |y| (min_x..=max_x).map(move |x| (x, y)))
    }
}

/// Tiles touched by `viewport`, clamped to a `grid_width × grid_height` grid.
///
/// `None` when the viewport is empty or lies entirely past the grid.
pub fn visible_tiles(
    viewport: PixelViewport,
    tile_size: u32,
    grid_width: u32,
    grid_height: u32,
) -> Option<TileRect> {
    let ts = tile_size.max(1) as u64;
    let span = |scroll: u32, extent: u32, limit: u32| -> Option<(u32, u32)> {
        let start = scroll as u64 / ts;
        let end = (scroll as u64 + extent as u64).div_ceil(ts).min(limit as u64);
        if start < end {
            Some((start as u32, end as u32 - 1))
        } else {
            None
        }
    };

    let (min_x, max_x) = span(viewport.scroll_x, viewport.width, grid_width)?;
    let (min_y, max_y) = span(viewport.scroll_y, viewport.height, grid_height)?;
    Some(TileRect {
        min_x,
        min_y,
        max_x,
        max_y,
    })
}

/// Rectangle in map pixel space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Pixel area of the tile rectangle `rect`
    pub fn from_tiles(rect: TileRect, tile_size: u32) -> Self {
        Self {
            x: rect.min_x * tile_size,
            y: rect.min_y * tile_size,
            width: (rect.max_x - rect.min_x + 1) * tile_size,
            height: (rect.max_y - rect.min_y + 1) * tile_size,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 1.0);
    pub const RED: Rgba = Rgba::new(255, 0, 0, 1.0);
    pub const ROOM_FILL: Rgba = Rgba::new(0, 255, 0, 0.4);
    pub const SPECIAL_FILL: Rgba = Rgba::new(0, 0, 255, 0.4);
    pub const ENEMY_FILL: Rgba = Rgba::new(255, 0, 0, 0.4);
}

/// Centered text style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size_px: f32,
    pub color: Rgba,
}

impl TextStyle {
    pub const ROOM_LABEL: TextStyle = TextStyle {
        size_px: 20.0,
        color: Rgba::WHITE,
    };
    pub const SPECIAL_LABEL: TextStyle = TextStyle {
        size_px: 12.0,
        color: Rgba::WHITE,
    };
    pub const SUB_LABEL: TextStyle = TextStyle {
        size_px: 10.0,
        color: Rgba::WHITE,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DrawLayer {
    Base,
    Overlay,
    Interaction,
}

/// Drawing primitives provided by the host
pub trait DrawSurface {
    /// Erase `area` of one layer
    fn clear(&mut self, layer: DrawLayer, area: PixelRect);
    /// Blit `source` from the tileset image into `dest` on the base layer
    fn draw_tile(&mut self, source: SourceRect, dest: PixelRect);
    /// Blit `source` from the enemy sprite sheet into `dest` on the overlay layer
    fn draw_sprite(&mut self, source: SourceRect, dest: PixelRect);
    fn fill_rect(&mut self, layer: DrawLayer, rect: PixelRect, color: Rgba);
    fn stroke_rect(&mut self, layer: DrawLayer, rect: PixelRect, color: Rgba, line_width: f32);
    /// Draw `text` centered on `center`
    fn draw_text(&mut self, layer: DrawLayer, text: &str, center: (f32, f32), style: TextStyle);
}

/// Annotation layer drawn above the tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Rooms,
    SpecialTiles,
    Enemies,
}

impl Overlay {
    pub fn for_mode(mode: EditMode) -> Self {
        match mode {
            EditMode::Normal => Overlay::None,
            EditMode::Room => Overlay::Rooms,
            EditMode::SpecialTile => Overlay::SpecialTiles,
            EditMode::Enemy => Overlay::Enemies,
        }
    }
}

/// What one render pass touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub visible: Option<TileRect>,
    pub tiles_drawn: usize,
    pub overlay_cells: usize,
}

/// Redraw the layers `redraw` asks for, limited to `viewport`
pub fn render_viewport(
    session: &EditorSession,
    viewport: PixelViewport,
    redraw: Redraw,
    surface: &mut impl DrawSurface,
) -> RenderStats {
    let mut stats = RenderStats::default();
    if redraw == Redraw::None {
        return stats;
    }

    let grid = session.grid();
    let Some(visible) = visible_tiles(viewport, session.tile_size, grid.width(), grid.height())
    else {
        return stats;
    };
    stats.visible = Some(visible);
    let area = viewport.area();

    if redraw >= Redraw::All {
        surface.clear(DrawLayer::Base, area);
        stats.tiles_drawn = draw_base(session, visible, surface);
    }
    if redraw >= Redraw::Overlay {
        surface.clear(DrawLayer::Overlay, area);
        stats.overlay_cells = draw_overlay(session, visible, surface);
    }
    surface.clear(DrawLayer::Interaction, area);
    draw_interaction(session, visible, surface);

    stats
}

fn cell_rect(x: u32, y: u32, tile_size: u32) -> PixelRect {
    PixelRect::new(x * tile_size, y * tile_size, tile_size, tile_size)
}

fn draw_base(session: &EditorSession, visible: TileRect, surface: &mut impl DrawSurface) -> usize {
    let Some(tileset) = session.tileset else {
        return 0;
    };
    let grid = session.grid();
    let mut drawn = 0;

    for (x, y) in visible.cells() {
        let Ok(cell) = grid.get(x, y) else {
            continue;
        };
        if let Some(source) = tileset.source_rect(cell.tile_index) {
            surface.draw_tile(source, cell_rect(x, y, session.tile_size));
            drawn += 1;
        }
    }
    drawn
}

fn draw_overlay(
    session: &EditorSession,
    visible: TileRect,
    surface: &mut impl DrawSurface,
) -> usize {
    let overlay = Overlay::for_mode(session.mode);
    if overlay == Overlay::None {
        return 0;
    }

    let grid = session.grid();
    let mut drawn = 0;
    for (x, y) in visible.cells() {
        let Ok(cell) = grid.get(x, y) else {
            continue;
        };
        let rect = cell_rect(x, y, session.tile_size);
        let hit = match overlay {
            Overlay::Rooms => draw_room_badge(cell, rect, surface),
            Overlay::SpecialTiles => draw_special_label(cell, rect, surface),
            Overlay::Enemies => draw_enemy(session, cell, rect, surface),
            Overlay::None => false,
        };
        if hit {
            drawn += 1;
        }
    }
    drawn
}

fn draw_room_badge(cell: &Cell, rect: PixelRect, surface: &mut impl DrawSurface) -> bool {
    if cell.room_id == 0 {
        return false;
    }
    surface.fill_rect(DrawLayer::Overlay, rect, Rgba::ROOM_FILL);
    surface.draw_text(
        DrawLayer::Overlay,
        &cell.room_id.to_string(),
        rect.center(),
        TextStyle::ROOM_LABEL,
    );
    true
}

fn draw_special_label(cell: &Cell, rect: PixelRect, surface: &mut impl DrawSurface) -> bool {
    let Some(kind) = cell.annotation else {
        return false;
    };
    surface.fill_rect(DrawLayer::Overlay, rect, Rgba::SPECIAL_FILL);
    surface.draw_text(
        DrawLayer::Overlay,
        kind.label(),
        rect.center(),
        TextStyle::SPECIAL_LABEL,
    );

    if kind == AnnotationKind::Passage {
        if let Some(target) = cell.passage_target {
            let (cx, cy) = rect.center();
            surface.draw_text(
                DrawLayer::Overlay,
                &format!("F{} {},{}", target.floor, target.x, target.y),
                (cx, cy + rect.height as f32 * 0.3),
                TextStyle::SUB_LABEL,
            );
        }
    }
    true
}

fn draw_enemy(
    session: &EditorSession,
    cell: &Cell,
    rect: PixelRect,
    surface: &mut impl DrawSurface,
) -> bool {
    let Some(index) = cell.enemy_index else {
        return false;
    };
    surface.fill_rect(DrawLayer::Overlay, rect, Rgba::ENEMY_FILL);

    match session.enemy_sheet.and_then(|sheet| sheet.source_rect(index)) {
        Some(source) => surface.draw_sprite(source, rect),
        None => surface.draw_text(
            DrawLayer::Overlay,
            &format!("#{}", index),
            rect.center(),
            TextStyle::SPECIAL_LABEL,
        ),
    }
    true
}

fn draw_interaction(session: &EditorSession, visible: TileRect, surface: &mut impl DrawSurface) {
    if session.mode != EditMode::Normal {
        return;
    }
    let ts = session.tile_size;

    if session.rect_selecting {
        // Only drawn once the drag has both corners
        if session.selection.end.is_none() {
            return;
        }
        if let Some((min_x, min_y, max_x, max_y)) = session.selection.normalized() {
            let rect = TileRect {
                min_x,
                min_y,
                max_x,
                max_y,
            };
            surface.stroke_rect(
                DrawLayer::Interaction,
                PixelRect::from_tiles(rect, ts),
                Rgba::RED,
                2.0,
            );
        }
        return;
    }

    if session.rect_pasting {
        return;
    }
    if let Some((x, y)) = session.hover.filter(|(x, y)| visible.contains(*x, *y)) {
        surface.stroke_rect(DrawLayer::Interaction, cell_rect(x, y, ts), Rgba::RED, 2.0);
    }
}

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        layer: DrawLayer,
        area: PixelRect,
    },
    Tile {
        source: SourceRect,
        dest: PixelRect,
    },
    Sprite {
        source: SourceRect,
        dest: PixelRect,
    },
    Fill {
        layer: DrawLayer,
        rect: PixelRect,
        color: Rgba,
    },
    Stroke {
        layer: DrawLayer,
        rect: PixelRect,
        color: Rgba,
        line_width: f32,
    },
    Text {
        layer: DrawLayer,
        text: String,
        center: (f32, f32),
        style: TextStyle,
    },
}

impl DrawCommand {
    pub fn layer(&self) -> DrawLayer {
        match self {
            DrawCommand::Clear { layer, .. }
            | DrawCommand::Fill { layer, .. }
            | DrawCommand::Stroke { layer, .. }
            | DrawCommand::Text { layer, .. } => *layer,
            DrawCommand::Tile { .. } => DrawLayer::Base,
            DrawCommand::Sprite { .. } => DrawLayer::Overlay,
        }
    }
}

/// A surface that records every call, for deferred drawing and tests
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Hand the recorded commands over, leaving the list empty
    pub fn drain(&mut self) -> std::vec::Drain<'_, DrawCommand> {
        self.commands.drain(..)
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl DrawSurface for DrawList {
    fn clear(&mut self, layer: DrawLayer, area: PixelRect) {
        self.commands.push(DrawCommand::Clear { layer, area });
    }

    fn draw_tile(&mut self, source: SourceRect, dest: PixelRect) {
        self.commands.push(DrawCommand::Tile { source, dest });
    }

    fn draw_sprite(&mut self, source: SourceRect, dest: PixelRect) {
        self.commands.push(DrawCommand::Sprite { source, dest });
    }

    fn fill_rect(&mut self, layer: DrawLayer, rect: PixelRect, color: Rgba) {
        self.commands.push(DrawCommand::Fill { layer, rect, color });
    }

    fn stroke_rect(&mut self, layer: DrawLayer, rect: PixelRect, color: Rgba, line_width: f32) {
        self.commands.push(DrawCommand::Stroke {
            layer,
            rect,
            color,
            line_width,
        });
    }

    fn draw_text(&mut self, layer: DrawLayer, text: &str, center: (f32, f32), style: TextStyle) {
        self.commands.push(DrawCommand::Text {
            layer,
            text: text.to_string(),
            center,
            style,
        });
    }
}
