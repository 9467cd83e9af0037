//! Layered Compositor
//!
//! The terminal display backend. Every top-level surface of the scene is
//! mirrored as a [`Layer`]; [`TerminalCompositor::composite`] flattens the
//! visible layers into one output buffer in z order (back to front, ties
//! in attachment order).
//!
//! Cells holding a space on the terminal's default background are holes:
//! whatever is below shows through.

mod layer;

use std::collections::HashMap;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use tessera_core::{DisplayBackend, Surface, WidgetId};

pub use layer::Layer;

/// Display backend compositing into a ratatui [`Buffer`]
#[derive(Debug)]
pub struct TerminalCompositor {
    /// All layers by widget
    layers: HashMap<WidgetId, Layer>,
    /// Layers sorted by z-level for rendering
    render_order: Vec<WidgetId>,
    /// Next attachment sequence number
    next_seq: u64,
    /// Output buffer (composited result)
    output: Buffer,
    /// Total area
    area: Rect,
    /// Number of refreshes requested by the scene
    refreshes: usize,
}

impl TerminalCompositor {
    /// Create a new compositor for the given area
    pub fn new(area: Rect) -> Self {
        Self {
            layers: HashMap::new(),
            render_order: Vec::new(),
            next_seq: 0,
            output: Buffer::empty(area),
            area,
            refreshes: 0,
        }
    }

    /// Screen area
    pub const fn area(&self) -> Rect {
        self.area
    }

    /// Resize the screen; layers keep their positions and are clipped
    pub fn resize(&mut self, area: Rect) {
        self.area = area;
        self.output = Buffer::empty(area);
        tracing::debug!(width = area.width, height = area.height, "Compositor resized");
    }

    /// The layer mirroring `id`, if attached
    pub fn layer(&self, id: WidgetId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    /// Number of attached layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether no layer is attached
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number of refreshes requested so far
    pub const fn refresh_count(&self) -> usize {
        self.refreshes
    }

    /// Composite all visible layers into the output buffer
    pub fn composite(&mut self) -> &Buffer {
        self.output.reset();

        for id in &self.render_order {
            if let Some(layer) = self.layers.get(id) {
                if layer.visible {
                    Self::blit_layer(&mut self.output, self.area, layer);
                }
            }
        }

        &self.output
    }

    /// Blit a layer onto the output buffer, skipping holes
    fn blit_layer(output: &mut Buffer, area: Rect, layer: &Layer) {
        let lb = layer.bounds;

        for ly in 0..lb.height {
            for lx in 0..lb.width {
                let dst_x = lb.x.saturating_add(lx);
                let dst_y = lb.y.saturating_add(ly);
                if dst_x >= area.width || dst_y >= area.height {
                    continue;
                }

                let Some(src_cell) = layer.buffer.cell((lx, ly)) else {
                    continue;
                };
                if Layer::is_hole(src_cell) {
                    continue;
                }
                if let Some(dst_cell) = output.cell_mut((dst_x, dst_y)) {
                    *dst_cell = src_cell.clone();
                }
            }
        }
    }

    /// Find the topmost visible layer at a screen position
    pub fn layer_at(&self, x: u16, y: u16) -> Option<WidgetId> {
        self.render_order.iter().rev().copied().find(|id| {
            self.layers
                .get(id)
                .is_some_and(|layer| layer.visible && layer.contains(x, y))
        })
    }

    /// Update render order based on z-levels
    fn update_render_order(&mut self) {
        self.render_order = self.layers.keys().copied().collect();
        let layers = &self.layers;
        self.render_order.sort_by_key(|id| {
            layers
                .get(id)
                .map_or((0, 0), |layer| (layer.z_level, layer.seq))
        });
    }
}

impl DisplayBackend for TerminalCompositor {
    fn add_surface(&mut self, id: WidgetId, surface: &Surface) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.layers.insert(id, Layer::from_surface(id, surface, seq));
        self.update_render_order();
        tracing::debug!(widget = %id, layers = self.layers.len(), "Layer added");
    }

    fn update_surface(&mut self, id: WidgetId, surface: &Surface) {
        let Some(layer) = self.layers.get_mut(&id) else {
            tracing::warn!(widget = %id, "Update for a surface that was never added");
            return;
        };
        let z_changed = layer.z_level != surface.z_level();
        layer.update(surface);
        if z_changed {
            self.update_render_order();
        }
        tracing::trace!(widget = %id, "Layer updated");
    }

    fn remove_surface(&mut self, id: WidgetId) {
        if self.layers.remove(&id).is_some() {
            self.update_render_order();
            tracing::debug!(widget = %id, "Layer removed");
        }
    }

    fn refresh(&mut self) {
        self.refreshes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{Color, Pos, Scene, Size, Tile, TileGrid};

    fn scene() -> Scene<TerminalCompositor> {
        Scene::new(TerminalCompositor::new(Rect::new(0, 0, 10, 5)))
    }

    fn filled(h: usize, w: usize, ch: char) -> TileGrid {
        TileGrid::filled(Size::new(h, w), Tile::new(ch, Color::WHITE, Color::BLACK))
    }

    fn symbol(buffer: &Buffer, x: u16, y: u16) -> &str {
        buffer[(x, y)].symbol()
    }

    #[test]
    fn test_higher_z_level_wins() {
        let mut scene = scene();
        let low = scene.create_widget(filled(2, 2, 'L'));
        let high = scene.create_widget(filled(2, 2, 'H'));
        scene.attach(high, Pos::new(1, 1), 2).unwrap();
        scene.attach(low, Pos::ORIGIN, 1).unwrap();

        let out = scene.backend_mut().composite().clone();
        assert_eq!(symbol(&out, 0, 0), "L");
        assert_eq!(symbol(&out, 1, 1), "H");
        assert_eq!(scene.backend().layer_at(1, 1), Some(high));
        assert_eq!(scene.backend().layer_at(0, 0), Some(low));
        assert_eq!(scene.backend().layer_at(9, 4), None);
    }

    #[test]
    fn test_holes_show_lower_layers() {
        let mut scene = scene();
        let under = scene.create_widget(filled(1, 3, 'u'));
        let mut over_tiles = TileGrid::blank(Size::new(1, 3));
        over_tiles.set(Pos::new(0, 1), Tile::new('o', Color::WHITE, Color::BLACK));
        let over = scene.create_widget(over_tiles);
        scene.attach(under, Pos::ORIGIN, 0).unwrap();
        scene.attach(over, Pos::ORIGIN, 1).unwrap();

        let out = scene.backend_mut().composite();
        assert_eq!(symbol(out, 0, 0), "u");
        assert_eq!(symbol(out, 1, 0), "o");
        assert_eq!(symbol(out, 2, 0), "u");
    }

    #[test]
    fn test_hidden_and_removed_layers_are_skipped() {
        let mut scene = scene();
        let id = scene.create_widget(filled(1, 1, 'x'));
        scene.attach(id, Pos::new(2, 3), 0).unwrap();
        assert_eq!(symbol(scene.backend_mut().composite(), 3, 2), "x");

        scene.set_hidden(id, true).unwrap();
        assert_eq!(symbol(scene.backend_mut().composite(), 3, 2), " ");
        assert_eq!(scene.backend().layer_at(3, 2), None);

        scene.detach(id).unwrap();
        assert!(scene.backend().is_empty());
    }

    #[test]
    fn test_layers_are_clipped_to_the_screen() {
        let mut scene = scene();
        let wide = scene.create_widget(filled(2, 8, 'w'));
        scene.attach(wide, Pos::new(4, 6), 0).unwrap();

        let out = scene.backend_mut().composite();
        assert_eq!(symbol(out, 9, 4), "w");
        assert_eq!(out.area, Rect::new(0, 0, 10, 5));
    }

    #[test]
    fn test_resize_keeps_layers() {
        let mut scene = scene();
        let id = scene.create_widget(filled(1, 1, 'k'));
        scene.attach(id, Pos::new(6, 12), 0).unwrap();
        assert_eq!(scene.backend_mut().composite().area.width, 10);

        scene.backend_mut().resize(Rect::new(0, 0, 20, 10));
        let out = scene.backend_mut().composite();
        assert_eq!(symbol(out, 12, 6), "k");
        assert_eq!(scene.backend().len(), 1);
    }
}
