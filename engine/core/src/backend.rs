//! Display Backends
//!
//! A backend receives the flattened buffers of top-level surfaces and puts
//! them on a screen. The engine only ever talks to it through
//! [`DisplayBackend`]; glyph rendering, color resolution and the physical
//! writes are the backend's business.
//!
//! [`HeadlessBackend`] is the in-memory implementation used by tests and by
//! hosts that want the composited grid without a terminal.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

use crate::scene::WidgetId;
use crate::surface::Surface;
use crate::tile::{Pos, Size, TileGrid};

/// Process-unique identity of a backend instance
///
/// Surfaces record the backend they are attached to by id. Assigning an id
/// that does not belong to the scene's backend is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerminalId(u32);

impl TerminalId {
    /// Allocate a new unique id
    #[must_use]
    pub fn new() -> Self {
        static COUNTER: AtomicU32 = AtomicU32::new(1);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    /// Create an id from a raw value (for testing or deserialization)
    #[must_use]
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw numeric value
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl Default for TerminalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TerminalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "terminal-{}", self.0)
    }
}

/// Receiver of top-level surface buffers
///
/// Called only for surfaces whose parent is the backend itself. Each
/// surface is composited independently at its screen position and z-level.
pub trait DisplayBackend {
    /// A surface was attached
    fn add_surface(&mut self, id: WidgetId, surface: &Surface);

    /// An attached surface has a new buffer, position or visibility
    fn update_surface(&mut self, id: WidgetId, surface: &Surface);

    /// A surface was detached
    fn remove_surface(&mut self, id: WidgetId);

    /// Flush pending output, if the backend buffers it
    fn refresh(&mut self) {}
}

#[derive(Debug, Clone)]
struct Layer {
    tiles: TileGrid,
    pos: Pos,
    z_level: i32,
    hidden: bool,
    /// Attachment order, breaks z-level ties
    seq: u64,
}

impl Layer {
    fn from_surface(surface: &Surface, seq: u64) -> Self {
        Self {
            tiles: surface.tiles().clone(),
            pos: surface.pos(),
            z_level: surface.z_level(),
            hidden: surface.hidden(),
            seq,
        }
    }
}

/// In-memory backend
///
/// Keeps a copy of every attached surface and counts update calls, so tests
/// can assert both what is on screen and how often it was pushed.
#[derive(Debug, Clone)]
pub struct HeadlessBackend {
    size: Size,
    layers: HashMap<WidgetId, Layer>,
    updates: HashMap<WidgetId, usize>,
    next_seq: u64,
    refreshes: usize,
}

impl HeadlessBackend {
    /// A screen of `size` cells
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size,
            layers: HashMap::new(),
            updates: HashMap::new(),
            next_seq: 0,
            refreshes: 0,
        }
    }

    /// Screen dimensions
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Whether `id` is currently attached
    #[must_use]
    pub fn contains(&self, id: WidgetId) -> bool {
        self.layers.contains_key(&id)
    }

    /// Number of `update_surface` calls received for `id`
    #[must_use]
    pub fn update_count(&self, id: WidgetId) -> usize {
        self.updates.get(&id).copied().unwrap_or(0)
    }

    /// Number of `refresh` calls received
    #[must_use]
    pub const fn refresh_count(&self) -> usize {
        self.refreshes
    }

    /// The last buffer received for `id`
    #[must_use]
    pub fn surface_tiles(&self, id: WidgetId) -> Option<&TileGrid> {
        self.layers.get(&id).map(|l| &l.tiles)
    }

    /// Composite every visible surface into one screen-sized grid
    ///
    /// Lower z-levels are painted first; equal z-levels paint in
    /// attachment order.
    #[must_use]
    pub fn snapshot(&self) -> TileGrid {
        let mut order: Vec<&Layer> = self.layers.values().filter(|l| !l.hidden).collect();
        order.sort_by_key(|l| (l.z_level, l.seq));

        let mut screen = TileGrid::blank(self.size);
        for layer in order {
            screen.blit(&layer.tiles, layer.pos);
        }
        screen
    }
}

impl DisplayBackend for HeadlessBackend {
    fn add_surface(&mut self, id: WidgetId, surface: &Surface) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.layers.insert(id, Layer::from_surface(surface, seq));
        tracing::trace!(widget = %id, "Headless backend: surface added");
    }

    fn update_surface(&mut self, id: WidgetId, surface: &Surface) {
        *self.updates.entry(id).or_insert(0) += 1;
        if let Some(layer) = self.layers.get_mut(&id) {
            let seq = layer.seq;
            *layer = Layer::from_surface(surface, seq);
        }
    }

    fn remove_surface(&mut self, id: WidgetId) {
        self.layers.remove(&id);
    }

    fn refresh(&mut self) {
        self.refreshes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_ids_are_unique() {
        let a = TerminalId::new();
        let b = TerminalId::new();
        assert_ne!(a, b);
        assert!(a.to_string().starts_with("terminal-"));
    }

    #[test]
    fn test_empty_snapshot_is_blank() {
        let backend = HeadlessBackend::new(Size::new(2, 3));
        assert_eq!(backend.snapshot(), TileGrid::blank(Size::new(2, 3)));
        assert_eq!(backend.update_count(WidgetId::from_raw(1)), 0);
    }
}
