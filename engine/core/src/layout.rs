//! Layout Compositor
//!
//! A layout owns an ordered list of child widgets and flattens them into its
//! own buffer with the painter's algorithm: children are pasted oldest
//! first at their offsets, so later children cover earlier ones. Child 0 is
//! the background, created from the layout's initial buffer.
//!
//! Recompositing is lazy. Structural changes and content changes of
//! descendants only set `needs_redraw`; the buffer is rebuilt on the next
//! tick boundary.

use std::collections::HashMap;

use crate::backend::DisplayBackend;
use crate::error::{LayoutError, Result};
use crate::scene::{Renderable, Scene, TileSource, WidgetId, WidgetKind};
use crate::surface::{Parent, Surface};
use crate::tile::{Pos, Tile, TileGrid};

/// Child registry and redraw flag of a layout-like widget
#[derive(Debug, Clone, Default)]
pub struct LayoutState {
    /// Paint order; index 0 is the background
    children: Vec<WidgetId>,
    positions: HashMap<WidgetId, Pos>,
    needs_redraw: bool,
}

impl LayoutState {
    pub(crate) fn with_background(background: WidgetId) -> Self {
        let mut positions = HashMap::new();
        positions.insert(background, Pos::ORIGIN);
        Self {
            children: vec![background],
            positions,
            needs_redraw: true,
        }
    }

    /// Children in paint order, background first
    #[must_use]
    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    /// The background child
    #[must_use]
    pub fn background(&self) -> Option<WidgetId> {
        self.children.first().copied()
    }

    /// Offset of `child`, if it is a member
    #[must_use]
    pub fn position_of(&self, child: WidgetId) -> Option<Pos> {
        self.positions.get(&child).copied()
    }

    /// Whether `child` is a member
    #[must_use]
    pub fn contains(&self, child: WidgetId) -> bool {
        self.positions.contains_key(&child)
    }

    /// Index of `child` in paint order
    #[must_use]
    pub fn index_of(&self, child: WidgetId) -> Option<usize> {
        self.children.iter().position(|c| *c == child)
    }

    fn push(&mut self, child: WidgetId, pos: Pos) {
        self.children.push(child);
        self.positions.insert(child, pos);
        self.needs_redraw = true;
    }

    fn remove(&mut self, child: WidgetId) {
        self.children.retain(|c| *c != child);
        self.positions.remove(&child);
        self.needs_redraw = true;
    }

    fn replace_background(&mut self, background: WidgetId) -> Option<WidgetId> {
        let old = self.children.first().copied();
        if let Some(old) = old {
            self.positions.remove(&old);
            self.children[0] = background;
        } else {
            self.children.push(background);
        }
        self.positions.insert(background, Pos::ORIGIN);
        self.needs_redraw = true;
        old
    }

    /// Paint every visible child onto `canvas`, oldest first
    pub(crate) fn compose(&self, canvas: &mut TileGrid, source: &dyn TileSource) {
        canvas.fill(Tile::blank());
        for child in &self.children {
            let Some(surface) = source.surface_of(*child) else {
                continue;
            };
            if surface.hidden() {
                continue;
            }
            let pos = self.positions.get(child).copied().unwrap_or_default();
            canvas.blit(surface.tiles(), pos);
        }
    }

    /// Topmost visible non-background child covering `pos`
    fn hit(&self, pos: Pos, source: &dyn TileSource) -> Option<WidgetId> {
        self.children.iter().skip(1).rev().copied().find(|child| {
            let Some(surface) = source.surface_of(*child) else {
                return false;
            };
            let offset = self.positions.get(child).copied().unwrap_or_default();
            let size = surface.size();
            !surface.hidden()
                && pos.row >= offset.row
                && pos.col >= offset.col
                && pos.row < offset.row + size.height
                && pos.col < offset.col + size.width
        })
    }
}

impl Renderable for LayoutState {
    fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    fn invalidate(&mut self) {
        self.needs_redraw = true;
    }

    fn rebuild(&mut self, target: &mut TileGrid, source: &dyn TileSource) {
        self.compose(target, source);
        self.needs_redraw = false;
    }
}

impl<B: DisplayBackend> Scene<B> {
    /// Create a layout whose background shows `tiles`
    ///
    /// The background is a separate plain widget, child 0 of the layout.
    pub fn create_layout(&mut self, tiles: TileGrid) -> WidgetId {
        let id = self.allocate_id();
        let background = self.create_widget(tiles.clone());
        self.set_parent_unchecked(background, id);
        self.insert_widget(
            id,
            Surface::new(tiles),
            WidgetKind::Layout(LayoutState::with_background(background)),
        );
        id
    }

    pub(crate) fn set_parent_unchecked(&mut self, child: WidgetId, layout: WidgetId) {
        if let Some(widget) = self.widgets.get_mut(&child) {
            widget.surface.set_parent(Some(Parent::Layout(layout)));
        }
    }

    /// The layout that actually holds children for `id`
    ///
    /// Input-scrollable wrappers forward child operations to their viewport.
    fn content_layout(&self, id: WidgetId) -> std::result::Result<WidgetId, LayoutError> {
        match &self.get(id)?.kind {
            WidgetKind::InputScrollable(wrapper) => Ok(wrapper.viewport()),
            kind if kind.is_layout() => Ok(id),
            _ => Err(LayoutError::NotALayout(id)),
        }
    }

    fn layout_state(&self, id: WidgetId) -> std::result::Result<&LayoutState, LayoutError> {
        self.get(id)?.kind.layout().ok_or(LayoutError::NotALayout(id))
    }

    fn layout_state_mut(
        &mut self,
        id: WidgetId,
    ) -> std::result::Result<&mut LayoutState, LayoutError> {
        self.get_mut(id)?
            .kind
            .layout_mut()
            .ok_or(LayoutError::NotALayout(id))
    }

    /// Menus keep the children they were built with
    fn check_editable(&self, layout: WidgetId) -> std::result::Result<(), LayoutError> {
        match self.get(layout)?.kind {
            WidgetKind::Menu(_) => Err(LayoutError::FixedChildren(layout)),
            _ => Ok(()),
        }
    }

    /// Check that `child` of its current size may sit at `pos` in `layout`
    fn check_bounds(
        &self,
        layout: WidgetId,
        child: WidgetId,
        pos: Pos,
    ) -> std::result::Result<(), LayoutError> {
        let layout_size = self.get(layout)?.canvas_size();
        let child_size = self.get(child)?.surface.size();
        if child_size.height > layout_size.height || child_size.width > layout_size.width {
            return Err(LayoutError::ChildTooLarge {
                layout,
                layout_size,
                child,
                child_size,
            });
        }
        if !layout_size.fits(child_size, pos) {
            return Err(LayoutError::OutOfBounds {
                layout,
                layout_size,
                child,
                pos,
            });
        }
        Ok(())
    }

    /// Add `child` to `layout` with its top-left corner at `pos`
    ///
    /// The child is painted above every existing child and inherits the
    /// layout's backend.
    ///
    /// # Errors
    ///
    /// - [`LayoutError::NotALayout`] if `layout` cannot hold children
    /// - [`LayoutError::UnknownWidget`] if either id does not exist
    /// - [`LayoutError::SelfContainment`] if `child` is `layout` or one of
    ///   its ancestors
    /// - [`LayoutError::DuplicateChild`] if `child` is already a member
    /// - [`LayoutError::AlreadyParented`] if `child` belongs elsewhere
    /// - [`LayoutError::ChildTooLarge`] / [`LayoutError::OutOfBounds`] if
    ///   the child rectangle would leave the layout
    /// - [`LayoutError::FixedChildren`] if `layout` is a menu
    pub fn add_child(&mut self, layout: WidgetId, child: WidgetId, pos: Pos) -> Result<()> {
        let target = self.content_layout(layout)?;
        self.check_editable(target)?;
        self.add_child_to(target, child, pos)
    }

    pub(crate) fn add_child_to(
        &mut self,
        layout: WidgetId,
        child: WidgetId,
        pos: Pos,
    ) -> Result<()> {
        let state = self.layout_state(layout)?;
        let child_widget = self.get(child)?;
        if child == layout || self.is_descendant(layout, child) {
            return Err(LayoutError::SelfContainment(layout).into());
        }
        if state.contains(child) {
            return Err(LayoutError::DuplicateChild { layout, child }.into());
        }
        if let Some(parent) = child_widget.surface.parent() {
            return Err(LayoutError::AlreadyParented { child, parent }.into());
        }
        self.check_bounds(layout, child, pos)?;

        let terminal = self.get(layout)?.surface.terminal();
        self.layout_state_mut(layout)?.push(child, pos);
        self.set_parent_unchecked(child, layout);
        self.propagate_terminal(child, terminal);
        self.invalidate_ancestors(layout);

        tracing::debug!(layout = %layout, child = %child, pos = %pos, "Child added");
        Ok(())
    }

    /// Remove `child` from `layout`, clearing its parent and backend
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotAChild`] if `child` is not a member;
    /// [`LayoutError::BackgroundFixed`] for the background;
    /// [`LayoutError::FixedChildren`] if `layout` is a menu.
    pub fn remove_child(&mut self, layout: WidgetId, child: WidgetId) -> Result<()> {
        let layout = self.content_layout(layout)?;
        self.check_editable(layout)?;
        let state = self.layout_state(layout)?;
        if !state.contains(child) {
            return Err(LayoutError::NotAChild { layout, child }.into());
        }
        if state.background() == Some(child) {
            return Err(LayoutError::BackgroundFixed(layout).into());
        }

        self.layout_state_mut(layout)?.remove(child);
        if let Some(widget) = self.widgets.get_mut(&child) {
            widget.surface.set_parent(None);
        }
        self.propagate_terminal(child, None);
        self.invalidate_ancestors(layout);

        tracing::debug!(layout = %layout, child = %child, "Child removed");
        Ok(())
    }

    /// Move `child` to a new offset inside `layout`
    ///
    /// Bounds are validated exactly as in [`Scene::add_child`].
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotAChild`], [`LayoutError::BackgroundFixed`] when
    /// moving the background away from the origin, or a bounds error.
    pub fn move_child(&mut self, layout: WidgetId, child: WidgetId, pos: Pos) -> Result<()> {
        let layout = self.content_layout(layout)?;
        let state = self.layout_state(layout)?;
        if !state.contains(child) {
            return Err(LayoutError::NotAChild { layout, child }.into());
        }
        if state.background() == Some(child) && pos != Pos::ORIGIN {
            return Err(LayoutError::BackgroundFixed(layout).into());
        }
        self.check_bounds(layout, child, pos)?;

        let state = self.layout_state_mut(layout)?;
        state.positions.insert(child, pos);
        state.needs_redraw = true;
        self.invalidate_ancestors(layout);

        tracing::debug!(layout = %layout, child = %child, pos = %pos, "Child moved");
        Ok(())
    }

    /// Replace the background of `layout` with `background`
    ///
    /// The previous background is released (no parent, no backend) and
    /// returned.
    ///
    /// # Errors
    ///
    /// [`LayoutError::BackgroundSize`] unless `background` exactly covers the
    /// layout's canvas; the same membership errors as
    /// [`Scene::add_child`].
    pub fn set_background(&mut self, layout: WidgetId, background: WidgetId) -> Result<WidgetId> {
        let layout = self.content_layout(layout)?;
        let state = self.layout_state(layout)?;
        let widget = self.get(background)?;
        if background == layout || self.is_descendant(layout, background) {
            return Err(LayoutError::SelfContainment(layout).into());
        }
        if state.contains(background) {
            return Err(LayoutError::DuplicateChild {
                layout,
                child: background,
            }
            .into());
        }
        if let Some(parent) = widget.surface.parent() {
            return Err(LayoutError::AlreadyParented {
                child: background,
                parent,
            }
            .into());
        }
        let expected = self.get(layout)?.canvas_size();
        let found = widget.surface.size();
        if expected != found {
            return Err(LayoutError::BackgroundSize {
                layout,
                expected,
                found,
            }
            .into());
        }

        let terminal = self.get(layout)?.surface.terminal();
        let old = self.layout_state_mut(layout)?.replace_background(background);
        self.set_parent_unchecked(background, layout);
        self.propagate_terminal(background, terminal);
        if let Some(old) = old {
            if let Some(widget) = self.widgets.get_mut(&old) {
                widget.surface.set_parent(None);
            }
            self.propagate_terminal(old, None);
        }
        self.invalidate_ancestors(layout);

        tracing::debug!(layout = %layout, background = %background, "Background replaced");
        Ok(old.unwrap_or(background))
    }

    /// The background child of `layout`
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotALayout`] if `layout` cannot hold children.
    pub fn background(&self, layout: WidgetId) -> Result<WidgetId> {
        let layout = self.content_layout(layout)?;
        Ok(self
            .layout_state(layout)?
            .background()
            .ok_or(LayoutError::NotALayout(layout))?)
    }

    /// Children of `layout` in paint order
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotALayout`] if `layout` cannot hold children.
    pub fn children(&self, layout: WidgetId) -> Result<&[WidgetId]> {
        let layout = self.content_layout(layout)?;
        Ok(self.layout_state(layout)?.children())
    }

    /// Offset of `child` inside `layout`
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotAChild`] if `child` is not a member.
    pub fn child_pos(&self, layout: WidgetId, child: WidgetId) -> Result<Pos> {
        let layout = self.content_layout(layout)?;
        Ok(self
            .layout_state(layout)?
            .position_of(child)
            .ok_or(LayoutError::NotAChild { layout, child })?)
    }

    /// Topmost visible child covering `pos` (in layout coordinates)
    ///
    /// Falls back to the background when `include_background` is set and no
    /// other child covers `pos`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotALayout`] if `layout` cannot hold children.
    pub fn get_child_on_pos(
        &self,
        layout: WidgetId,
        pos: Pos,
        include_background: bool,
    ) -> Result<Option<WidgetId>> {
        let layout = self.content_layout(layout)?;
        let state = self.layout_state(layout)?;
        let hit = state.hit(pos, &self.widgets);
        if hit.is_some() || !include_background {
            return Ok(hit);
        }
        let canvas = self.get(layout)?.canvas_size();
        Ok(state.background().filter(|_| canvas.contains(pos)))
    }

    /// Whether `id` will rebuild on the next tick boundary
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotALayout`] if `id` is not a composite widget.
    pub fn needs_redraw(&self, id: WidgetId) -> Result<bool> {
        Ok(self
            .get(id)?
            .kind
            .renderable()
            .ok_or(LayoutError::NotALayout(id))?
            .needs_redraw())
    }

    /// Force `id` and its ancestors to rebuild on the next tick boundary
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotALayout`] if `id` is not a composite widget.
    pub fn mark_needs_redraw(&mut self, id: WidgetId) -> Result<()> {
        if !self.get(id)?.kind.is_layout() {
            return Err(LayoutError::NotALayout(id).into());
        }
        self.invalidate_with_ancestors(id);
        Ok(())
    }

    /// Rebuild `id` and its dirty descendants now
    ///
    /// A top-level widget that was rebuilt is pushed to the backend. Returns
    /// whether `id` was rebuilt.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownWidget`] if `id` does not exist.
    pub fn recomposite(&mut self, id: WidgetId) -> Result<bool> {
        self.get(id)?;
        let rebuilt = self.recomposite_tree(id);
        if rebuilt {
            self.push_to_backend(id);
        }
        Ok(rebuilt)
    }
}
