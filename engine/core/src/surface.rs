//! Surfaces
//!
//! The drawable part of every widget: one fixed-size tile grid plus the
//! placement data a parent layout or the backend needs. Parent and terminal
//! are non-owning ids into the scene; the scene validates them on
//! assignment, so the setters here are crate-private.

use std::fmt;

use crate::backend::TerminalId;
use crate::scene::WidgetId;
use crate::tile::{Pos, Size, TileGrid};

/// Who owns a surface's placement
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Parent {
    /// A layout-like widget in the same scene
    Layout(WidgetId),
    /// The scene's display backend (top-level surface)
    Terminal(TerminalId),
}

impl fmt::Display for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout(id) => write!(f, "{id}"),
            Self::Terminal(id) => write!(f, "{id}"),
        }
    }
}

/// A tile grid with placement metadata
#[derive(Debug, Clone)]
pub struct Surface {
    tiles: TileGrid,
    z_level: i32,
    pos: Pos,
    hidden: bool,
    parent: Option<Parent>,
    terminal: Option<TerminalId>,
}

impl Surface {
    /// A detached surface showing `tiles`
    #[must_use]
    pub fn new(tiles: TileGrid) -> Self {
        Self {
            tiles,
            z_level: 0,
            pos: Pos::ORIGIN,
            hidden: false,
            parent: None,
            terminal: None,
        }
    }

    /// `(height, width)` of the grid; never changes
    #[must_use]
    pub const fn size(&self) -> Size {
        self.tiles.size()
    }

    /// The current buffer
    #[must_use]
    pub const fn tiles(&self) -> &TileGrid {
        &self.tiles
    }

    pub(crate) fn tiles_mut(&mut self) -> &mut TileGrid {
        &mut self.tiles
    }

    /// Backend ordering hint; higher is drawn later
    #[must_use]
    pub const fn z_level(&self) -> i32 {
        self.z_level
    }

    /// Screen position (only meaningful for top-level surfaces)
    #[must_use]
    pub const fn pos(&self) -> Pos {
        self.pos
    }

    /// Whether parents and backends skip this surface
    #[must_use]
    pub const fn hidden(&self) -> bool {
        self.hidden
    }

    /// Owning layout or backend
    #[must_use]
    pub const fn parent(&self) -> Option<Parent> {
        self.parent
    }

    /// Backend this surface is (transitively) attached to
    #[must_use]
    pub const fn terminal(&self) -> Option<TerminalId> {
        self.terminal
    }

    /// The owning layout, if the parent is a layout
    #[must_use]
    pub const fn parent_layout(&self) -> Option<WidgetId> {
        match self.parent {
            Some(Parent::Layout(id)) => Some(id),
            _ => None,
        }
    }

    /// Whether the backend owns this surface directly
    #[must_use]
    pub const fn is_top_level(&self) -> bool {
        matches!(self.parent, Some(Parent::Terminal(_)))
    }

    pub(crate) fn set_z_level(&mut self, z_level: i32) {
        self.z_level = z_level;
    }

    pub(crate) fn set_pos(&mut self, pos: Pos) {
        self.pos = pos;
    }

    pub(crate) fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Parent>) {
        self.parent = parent;
    }

    pub(crate) fn set_terminal(&mut self, terminal: Option<TerminalId>) {
        self.terminal = terminal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_surface_is_detached() {
        let surface = Surface::new(TileGrid::blank(Size::new(2, 5)));
        assert_eq!(surface.size(), Size::new(2, 5));
        assert_eq!(surface.parent(), None);
        assert_eq!(surface.terminal(), None);
        assert!(!surface.is_top_level());
        assert!(!surface.hidden());
    }

    #[test]
    fn test_parent_display() {
        assert_eq!(Parent::Layout(WidgetId::from_raw(3)).to_string(), "widget-3");
        assert_eq!(
            Parent::Terminal(TerminalId::from_raw(1)).to_string(),
            "terminal-1"
        );
    }
}
