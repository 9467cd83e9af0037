//! Layer - one attached surface, converted to terminal cells

use ratatui::buffer::{Buffer, Cell};
use ratatui::layout::Rect;
use ratatui::style::Color;
use tessera_core::{Surface, TileGrid, WidgetId};

use crate::theme::to_terminal;

/// A single layer in the compositor
#[derive(Debug, Clone)]
pub struct Layer {
    /// The widget this layer mirrors
    pub id: WidgetId,
    /// Z-order (higher = in front)
    pub z_level: i32,
    /// Attachment order, breaks z-level ties
    pub seq: u64,
    /// Screen position and size
    pub bounds: Rect,
    /// Whether the layer is visible
    pub visible: bool,
    /// The layer's cells, in layer-local coordinates
    pub buffer: Buffer,
}

impl Layer {
    /// Mirror `surface` as layer `id`
    pub fn from_surface(id: WidgetId, surface: &Surface, seq: u64) -> Self {
        let mut layer = Self {
            id,
            z_level: 0,
            seq,
            bounds: Rect::default(),
            visible: true,
            buffer: Buffer::empty(Rect::default()),
        };
        layer.update(surface);
        layer
    }

    /// Take over the surface's tiles, position, depth and visibility
    pub fn update(&mut self, surface: &Surface) {
        let pos = surface.pos();
        let size = surface.size();
        self.z_level = surface.z_level();
        self.visible = !surface.hidden();
        self.bounds = Rect::new(
            to_u16(pos.col),
            to_u16(pos.row),
            to_u16(size.width),
            to_u16(size.height),
        );
        self.buffer = to_buffer(surface.tiles());
    }

    /// Check if a screen point is within this layer's bounds
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.bounds.x
            && x < self.bounds.x.saturating_add(self.bounds.width)
            && y >= self.bounds.y
            && y < self.bounds.y.saturating_add(self.bounds.height)
    }

    /// A space on the terminal's own background lets lower layers through
    pub fn is_hole(cell: &Cell) -> bool {
        cell.symbol() == " " && cell.bg == Color::Reset
    }
}

fn to_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// Convert a tile grid to a buffer anchored at the origin
fn to_buffer(tiles: &TileGrid) -> Buffer {
    let mut buffer = Buffer::empty(Rect::new(
        0,
        0,
        to_u16(tiles.width()),
        to_u16(tiles.height()),
    ));
    for (row, line) in tiles.rows().enumerate() {
        for (col, tile) in line.iter().enumerate() {
            if let Some(cell) = buffer.cell_mut((to_u16(col), to_u16(row))) {
                cell.set_char(tile.ch)
                    .set_fg(to_terminal(tile.fg))
                    .set_bg(to_terminal(tile.bg));
            }
        }
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{Color as TileColor, Size, Tile};

    #[test]
    fn test_blank_tiles_become_holes() {
        let mut grid = TileGrid::blank(Size::new(1, 2));
        grid.set(
            tessera_core::Pos::new(0, 1),
            Tile::new(' ', TileColor::WHITE, TileColor::BLACK),
        );
        let buffer = to_buffer(&grid);

        assert!(Layer::is_hole(&buffer[(0, 0)]));
        // an opaque space still covers what is below
        assert!(!Layer::is_hole(&buffer[(1, 0)]));
    }

    #[test]
    fn test_contains_uses_screen_bounds() {
        let surface = Surface::new(TileGrid::blank(Size::new(2, 3)));
        let layer = Layer::from_surface(WidgetId::from_raw(1), &surface, 0);

        assert!(layer.contains(0, 0));
        assert!(layer.contains(2, 1));
        assert!(!layer.contains(3, 0));
        assert!(!layer.contains(0, 2));
    }
}
