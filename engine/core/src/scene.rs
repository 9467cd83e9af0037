//! Scene Arena
//!
//! A [`Scene`] owns every widget and exactly one display backend. Widgets
//! refer to each other by [`WidgetId`]; parents, children and terminals are
//! ids, never references, so the tree can be mutated freely from event
//! handlers without shared ownership.
//!
//! # Redraw model
//!
//! Composite widgets (layouts, viewports, menus) implement [`Renderable`].
//! Any structural or content change marks the affected layout and every
//! ancestor as needing a redraw. On a tick boundary the subscribed root
//! rebuilds its subtree children-first, so nested layouts are always fresh
//! before their parents read them, and a root owned by the backend pushes
//! its new buffer with a single update call.
//!
//! ```text
//!   content_changed(child)
//!          │
//!          ▼
//!   parent.needs_redraw = true ──► grandparent.needs_redraw = true ──► ...
//!
//!   TickBoundary(root)
//!          │
//!          ▼
//!   rebuild(leaves) ──► rebuild(parents) ──► rebuild(root) ──► backend.update(root)
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::animation::AnimationState;
use crate::backend::{DisplayBackend, TerminalId};
use crate::config::EngineConfig;
use crate::counters::{FpsCounterState, PointerPosState};
use crate::error::{LayoutError, Result, TypeConstraintError};
use crate::events::{Event, ServiceEvent};
use crate::label::{InputFieldState, LabelState};
use crate::layout::LayoutState;
use crate::menu::{MenuItemState, MenuState};
use crate::scrollbar::ScrollBarState;
use crate::surface::{Parent, Surface};
use crate::switching::SwitchingState;
use crate::tile::{Delta, Pos, Size, TileGrid};
use crate::viewport::{InputScrollState, ViewportState};

// =============================================================================
// Identity
// =============================================================================

/// Handle to a widget inside a [`Scene`]
///
/// Ids are allocated by the scene from a monotonically increasing counter and
/// are never reused within one scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WidgetId(u32);

impl WidgetId {
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

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "widget-{}", self.0)
    }
}

// =============================================================================
// Rendering Capability
// =============================================================================

/// Read access to the surfaces of other widgets during a rebuild
pub trait TileSource {
    /// The surface of `id`, if it exists
    fn surface_of(&self, id: WidgetId) -> Option<&Surface>;
}

impl TileSource for HashMap<WidgetId, Widget> {
    fn surface_of(&self, id: WidgetId) -> Option<&Surface> {
        self.get(&id).map(|w| &w.surface)
    }
}

/// A widget whose buffer is derived from other widgets
///
/// The tick-boundary step asks every renderable in a subtree whether it is
/// dirty and rebuilds the ones that are. `rebuild` must clear the flag and
/// must only read from `source`.
pub trait Renderable {
    /// Whether the buffer is stale
    fn needs_redraw(&self) -> bool;

    /// Mark the buffer stale
    fn invalidate(&mut self);

    /// Recompute `target` from the current child buffers
    fn rebuild(&mut self, target: &mut TileGrid, source: &dyn TileSource);
}

// =============================================================================
// Widgets
// =============================================================================

/// Every widget variant the engine knows about
#[derive(Debug)]
pub enum WidgetKind {
    /// A bare surface; its handler is a no-op
    Plain,
    /// Compositor of child surfaces
    Layout(LayoutState),
    /// Layout over an oversized backing buffer with a movable view
    Viewport(ViewportState),
    /// Viewport wrapper that scrolls on arrow keys and owns scroll bars
    InputScrollable(InputScrollState),
    /// Scroll position indicator
    ScrollBar(ScrollBarState),
    /// Shows one of several named, same-shaped images
    Switching(SwitchingState),
    /// Frame-by-frame animation playback
    Animation(AnimationState),
    /// Fixed-size justified text
    Label(LabelState),
    /// Single-line keyboard entry
    InputField(InputFieldState),
    /// Boxed label with an action
    MenuItem(MenuItemState),
    /// Keyboard and pointer navigable list of menu items
    Menu(MenuState),
    /// Frame rate readout
    FpsCounter(FpsCounterState),
    /// Pointer position readout
    PointerPos(PointerPosState),
}

impl WidgetKind {
    /// Short kind name, used in errors and logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Plain => "plain widget",
            Self::Layout(_) => "layout",
            Self::Viewport(_) => "viewport",
            Self::InputScrollable(_) => "input scrollable",
            Self::ScrollBar(_) => "scroll bar",
            Self::Switching(_) => "switching widget",
            Self::Animation(_) => "animation widget",
            Self::Label(_) => "label",
            Self::InputField(_) => "input field",
            Self::MenuItem(_) => "menu item",
            Self::Menu(_) => "menu",
            Self::FpsCounter(_) => "fps counter",
            Self::PointerPos(_) => "pointer position widget",
        }
    }

    /// The child registry, for every layout-like variant
    #[must_use]
    pub fn layout(&self) -> Option<&LayoutState> {
        match self {
            Self::Layout(layout) => Some(layout),
            Self::Viewport(viewport) => Some(viewport.layout()),
            Self::InputScrollable(wrapper) => Some(wrapper.layout()),
            Self::Menu(menu) => Some(menu.layout()),
            _ => None,
        }
    }

    pub(crate) fn layout_mut(&mut self) -> Option<&mut LayoutState> {
        match self {
            Self::Layout(layout) => Some(layout),
            Self::Viewport(viewport) => Some(viewport.layout_mut()),
            Self::InputScrollable(wrapper) => Some(wrapper.layout_mut()),
            Self::Menu(menu) => Some(menu.layout_mut()),
            _ => None,
        }
    }

    /// Whether this widget can hold children
    #[must_use]
    pub fn is_layout(&self) -> bool {
        self.layout().is_some()
    }

    pub(crate) fn renderable(&self) -> Option<&dyn Renderable> {
        match self {
            Self::Layout(layout) => Some(layout),
            Self::Viewport(viewport) => Some(viewport),
            Self::InputScrollable(wrapper) => Some(wrapper.layout()),
            Self::Menu(menu) => Some(menu.layout()),
            _ => None,
        }
    }

    pub(crate) fn renderable_mut(&mut self) -> Option<&mut dyn Renderable> {
        match self {
            Self::Layout(layout) => Some(layout),
            Self::Viewport(viewport) => Some(viewport),
            Self::InputScrollable(wrapper) => Some(wrapper.layout_mut()),
            Self::Menu(menu) => Some(menu.layout_mut()),
            _ => None,
        }
    }
}

/// A surface plus its behavior
#[derive(Debug)]
pub struct Widget {
    pub(crate) surface: Surface,
    pub(crate) kind: WidgetKind,
}

impl Widget {
    /// The drawable part
    #[must_use]
    pub const fn surface(&self) -> &Surface {
        &self.surface
    }

    /// The behavior part
    #[must_use]
    pub const fn kind(&self) -> &WidgetKind {
        &self.kind
    }

    /// Area children must fit into: the backing buffer for viewports, the
    /// surface itself otherwise
    #[must_use]
    pub fn canvas_size(&self) -> Size {
        match &self.kind {
            WidgetKind::Viewport(viewport) => viewport.backing().size(),
            _ => self.surface.size(),
        }
    }
}

/// Which handler an event goes to
#[derive(Clone, Copy)]
enum Route {
    Ignore,
    Layout,
    InputScrollable,
    Animation,
    InputField,
    Menu,
    FpsCounter,
    PointerPos,
}

// =============================================================================
// Scene
// =============================================================================

/// Arena of widgets attached to one display backend
pub struct Scene<B: DisplayBackend> {
    pub(crate) widgets: HashMap<WidgetId, Widget>,
    next_id: u32,
    terminal: TerminalId,
    pub(crate) backend: B,
    config: EngineConfig,
}

impl<B: DisplayBackend> fmt::Debug for Scene<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("widgets", &self.widgets.len())
            .field("terminal", &self.terminal)
            .finish_non_exhaustive()
    }
}

impl<B: DisplayBackend> Scene<B> {
    /// An empty scene with default configuration
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, EngineConfig::default())
    }

    /// An empty scene using `config` for widget defaults
    pub fn with_config(backend: B, config: EngineConfig) -> Self {
        Self {
            widgets: HashMap::new(),
            next_id: 1,
            terminal: TerminalId::new(),
            backend,
            config,
        }
    }

    /// Identity of this scene's backend
    #[must_use]
    pub const fn terminal_id(&self) -> TerminalId {
        self.terminal
    }

    /// The backend
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend (resizing, flushing)
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Widget defaults in effect
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether `id` names a widget of this scene
    #[must_use]
    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(&id)
    }

    /// Number of widgets
    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Whether the scene has no widgets
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Look up a widget
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownWidget`] if `id` does not exist.
    pub fn widget(&self, id: WidgetId) -> Result<&Widget> {
        Ok(self.get(id)?)
    }

    pub(crate) fn get(&self, id: WidgetId) -> std::result::Result<&Widget, LayoutError> {
        self.widgets.get(&id).ok_or(LayoutError::UnknownWidget(id))
    }

    pub(crate) fn get_mut(
        &mut self,
        id: WidgetId,
    ) -> std::result::Result<&mut Widget, LayoutError> {
        self.widgets
            .get_mut(&id)
            .ok_or(LayoutError::UnknownWidget(id))
    }

    pub(crate) fn allocate_id(&mut self) -> WidgetId {
        let id = WidgetId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn insert_widget(&mut self, id: WidgetId, surface: Surface, kind: WidgetKind) {
        tracing::trace!(widget = %id, kind = kind.name(), "Widget created");
        self.widgets.insert(id, Widget { surface, kind });
    }

    pub(crate) fn spawn(&mut self, tiles: TileGrid, kind: WidgetKind) -> WidgetId {
        let id = self.allocate_id();
        self.insert_widget(id, Surface::new(tiles), kind);
        id
    }

    // =========================================================================
    // Surface Operations
    // =========================================================================

    /// Create a plain widget showing `tiles`
    pub fn create_widget(&mut self, tiles: TileGrid) -> WidgetId {
        self.spawn(tiles, WidgetKind::Plain)
    }

    /// The surface of `id`
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownWidget`] if `id` does not exist.
    pub fn surface(&self, id: WidgetId) -> Result<&Surface> {
        Ok(&self.get(id)?.surface)
    }

    /// `(height, width)` of `id`
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownWidget`] if `id` does not exist.
    pub fn size(&self, id: WidgetId) -> Result<Size> {
        Ok(self.get(id)?.surface.size())
    }

    /// Current buffer of `id`
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownWidget`] if `id` does not exist.
    pub fn tiles(&self, id: WidgetId) -> Result<&TileGrid> {
        Ok(self.get(id)?.surface.tiles())
    }

    /// Edit the buffer of `id` in place
    ///
    /// Call [`Scene::content_changed`] afterwards so parents and the backend
    /// pick up the edit. Buffers of composite widgets are overwritten on
    /// their next rebuild.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownWidget`] if `id` does not exist.
    pub fn tiles_mut(&mut self, id: WidgetId) -> Result<&mut TileGrid> {
        Ok(self.get_mut(id)?.surface.tiles_mut())
    }

    /// Report that the buffer of `id` changed
    ///
    /// Parent layouts are marked for redraw; a top-level surface is pushed
    /// to the backend immediately.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownWidget`] if `id` does not exist.
    pub fn content_changed(&mut self, id: WidgetId) -> Result<()> {
        let top_level = self.get(id)?.surface.is_top_level();
        self.invalidate_ancestors(id);
        if top_level {
            self.push_to_backend(id);
        }
        Ok(())
    }

    /// Show or hide `id`
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownWidget`] if `id` does not exist.
    pub fn set_hidden(&mut self, id: WidgetId, hidden: bool) -> Result<()> {
        self.get_mut(id)?.surface.set_hidden(hidden);
        self.content_changed(id)
    }

    /// Change the backend ordering hint of `id`
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownWidget`] if `id` does not exist.
    pub fn set_z_level(&mut self, id: WidgetId, z_level: i32) -> Result<()> {
        let widget = self.get_mut(id)?;
        widget.surface.set_z_level(z_level);
        if widget.surface.is_top_level() {
            self.push_to_backend(id);
        }
        Ok(())
    }

    /// Set or clear the backend of `id` and, recursively, of its children
    ///
    /// # Errors
    ///
    /// [`TypeConstraintError::UnknownTerminal`] for any id other than this
    /// scene's backend; [`LayoutError::UnknownWidget`] if `id` does not exist.
    pub fn set_terminal(&mut self, id: WidgetId, terminal: Option<TerminalId>) -> Result<()> {
        if let Some(terminal) = terminal {
            if terminal != self.terminal {
                return Err(TypeConstraintError::UnknownTerminal(terminal).into());
            }
        }
        self.get(id)?;
        self.propagate_terminal(id, terminal);
        Ok(())
    }

    /// Low-level assignment of the parent back-reference
    ///
    /// Does not register `id` with the parent; use [`Scene::add_child`] or
    /// [`Scene::attach`] for that.
    ///
    /// # Errors
    ///
    /// [`TypeConstraintError::InvalidParent`] unless the parent is a
    /// layout-like widget other than `id`;
    /// [`TypeConstraintError::UnknownTerminal`] for a foreign backend.
    pub fn set_parent(&mut self, id: WidgetId, parent: Option<Parent>) -> Result<()> {
        match parent {
            Some(Parent::Layout(layout)) => {
                let valid = layout != id
                    && self
                        .widgets
                        .get(&layout)
                        .is_some_and(|w| w.kind.is_layout());
                if !valid {
                    return Err(TypeConstraintError::InvalidParent(layout).into());
                }
            }
            Some(Parent::Terminal(terminal)) if terminal != self.terminal => {
                return Err(TypeConstraintError::UnknownTerminal(terminal).into());
            }
            _ => {}
        }
        self.get_mut(id)?.surface.set_parent(parent);
        Ok(())
    }

    /// Hand `id` to the backend as a top-level surface
    ///
    /// Composite widgets are rebuilt first so the backend receives a current
    /// buffer.
    ///
    /// # Errors
    ///
    /// [`LayoutError::AlreadyParented`] if `id` already has a parent.
    pub fn attach(&mut self, id: WidgetId, pos: Pos, z_level: i32) -> Result<()> {
        let terminal = self.terminal;
        let widget = self.get_mut(id)?;
        if let Some(parent) = widget.surface.parent() {
            return Err(LayoutError::AlreadyParented { child: id, parent }.into());
        }
        widget.surface.set_pos(pos);
        widget.surface.set_z_level(z_level);
        widget.surface.set_parent(Some(Parent::Terminal(terminal)));

        self.propagate_terminal(id, Some(terminal));
        self.recomposite_tree(id);
        if let Some(widget) = self.widgets.get(&id) {
            self.backend.add_surface(id, &widget.surface);
        }
        tracing::debug!(widget = %id, pos = %pos, z_level, "Attached to backend");
        Ok(())
    }

    /// Remove a top-level surface from the backend
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotAttached`] unless `id` is owned by the backend.
    pub fn detach(&mut self, id: WidgetId) -> Result<()> {
        let widget = self.get_mut(id)?;
        if !widget.surface.is_top_level() {
            return Err(LayoutError::NotAttached(id).into());
        }
        widget.surface.set_parent(None);
        self.propagate_terminal(id, None);
        self.backend.remove_surface(id);
        tracing::debug!(widget = %id, "Detached from backend");
        Ok(())
    }

    /// Replace every character of `id` with a space, keeping colors
    ///
    /// A top-level surface is refreshed on the backend with exactly one
    /// update; a nested one marks its parents for redraw.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownWidget`] if `id` does not exist.
    pub fn wipe(&mut self, id: WidgetId) -> Result<()> {
        self.get_mut(id)?.surface.tiles_mut().clear_chars();
        self.content_changed(id)
    }

    /// Screen position of the top-left cell of `id`
    ///
    /// Offsets are summed up to the root. Scrolled viewports shift their
    /// children; positions are clamped at the screen origin.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownWidget`] if `id` or an ancestor does not exist.
    pub fn absolute_pos(&self, id: WidgetId) -> Result<Pos> {
        let offset = self.screen_offset(id)?;
        Ok(Pos::new(
            offset.rows.max(0).unsigned_abs(),
            offset.cols.max(0).unsigned_abs(),
        ))
    }

    /// Signed screen offset of the top-left cell of `id`
    ///
    /// Negative when a scrolled viewport moved the widget above or left of
    /// the screen origin.
    pub(crate) fn screen_offset(&self, id: WidgetId) -> Result<Delta> {
        let (mut row, mut col) = (0isize, 0isize);
        let mut current = id;
        loop {
            let widget = self.get(current)?;
            match widget.surface.parent() {
                Some(Parent::Layout(parent)) => {
                    let parent_widget = self.get(parent)?;
                    let offset = parent_widget
                        .kind
                        .layout()
                        .and_then(|l| l.position_of(current))
                        .unwrap_or_default();
                    row += to_isize(offset.row);
                    col += to_isize(offset.col);
                    if let WidgetKind::Viewport(viewport) = &parent_widget.kind {
                        row -= to_isize(viewport.view_pos().row);
                        col -= to_isize(viewport.view_pos().col);
                    }
                    current = parent;
                }
                Some(Parent::Terminal(_)) => {
                    row += to_isize(widget.surface.pos().row);
                    col += to_isize(widget.surface.pos().col);
                    break;
                }
                None => break,
            }
        }
        Ok(Delta::new(row, col))
    }

    /// Layout ancestors of `id`, nearest first
    #[must_use]
    pub fn ancestors(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut out = Vec::new();
        let mut current = self.widgets.get(&id).and_then(|w| w.surface.parent_layout());
        while let Some(parent) = current {
            out.push(parent);
            current = self
                .widgets
                .get(&parent)
                .and_then(|w| w.surface.parent_layout());
        }
        out
    }

    /// Whether `node` sits somewhere below `ancestor`
    #[must_use]
    pub fn is_descendant(&self, node: WidgetId, ancestor: WidgetId) -> bool {
        self.ancestors(node).contains(&ancestor)
    }

    // =========================================================================
    // Redraw Plumbing
    // =========================================================================

    pub(crate) fn propagate_terminal(&mut self, id: WidgetId, terminal: Option<TerminalId>) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(widget) = self.widgets.get_mut(&current) {
                widget.surface.set_terminal(terminal);
                if let Some(layout) = widget.kind.layout() {
                    stack.extend_from_slice(layout.children());
                }
            }
        }
    }

    /// Mark every layout above `id` as needing a redraw
    pub(crate) fn invalidate_ancestors(&mut self, id: WidgetId) {
        let mut current = self.widgets.get(&id).and_then(|w| w.surface.parent_layout());
        while let Some(parent) = current {
            let Some(widget) = self.widgets.get_mut(&parent) else {
                break;
            };
            if let Some(renderable) = widget.kind.renderable_mut() {
                renderable.invalidate();
            }
            current = widget.surface.parent_layout();
        }
    }

    /// Mark `id` itself and every ancestor as needing a redraw
    pub(crate) fn invalidate_with_ancestors(&mut self, id: WidgetId) {
        if let Some(renderable) = self
            .widgets
            .get_mut(&id)
            .and_then(|w| w.kind.renderable_mut())
        {
            renderable.invalidate();
        }
        self.invalidate_ancestors(id);
    }

    pub(crate) fn push_to_backend(&mut self, id: WidgetId) {
        if let Some(widget) = self.widgets.get(&id) {
            if widget.surface.is_top_level() {
                tracing::trace!(widget = %id, "Pushing buffer to backend");
                self.backend.update_surface(id, &widget.surface);
            }
        }
    }

    /// Rebuild every dirty renderable in the subtree, children first
    ///
    /// Returns whether `id` itself was rebuilt.
    pub(crate) fn recomposite_tree(&mut self, id: WidgetId) -> bool {
        let children: Vec<WidgetId> = self
            .widgets
            .get(&id)
            .and_then(|w| w.kind.layout())
            .map(|l| l.children().to_vec())
            .unwrap_or_default();
        for child in children {
            self.recomposite_tree(child);
        }

        // Take the node out so it can read its siblings while writing itself
        let Some(mut widget) = self.widgets.remove(&id) else {
            return false;
        };
        let rebuilt = match widget.kind.renderable_mut() {
            Some(renderable) if renderable.needs_redraw() => {
                renderable.rebuild(widget.surface.tiles_mut(), &self.widgets);
                true
            }
            _ => false,
        };
        self.widgets.insert(id, widget);

        if rebuilt {
            tracing::trace!(widget = %id, "Recomposited");
        }
        rebuilt
    }

    /// Recomposite every top-level surface that needs it
    ///
    /// Hosts that do not subscribe their roots to tick-boundary events can
    /// call this once per frame instead. Returns how many roots were pushed.
    pub fn refresh_all(&mut self) -> usize {
        let mut roots: Vec<WidgetId> = self
            .widgets
            .iter()
            .filter(|(_, w)| w.surface.is_top_level())
            .map(|(id, _)| *id)
            .collect();
        roots.sort_unstable();

        let mut pushed = 0;
        for root in roots {
            if self.recomposite_tree(root) {
                self.push_to_backend(root);
                pushed += 1;
            }
        }
        self.backend.refresh();
        pushed
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Deliver one event to `id` and collect whatever it emits
    ///
    /// Widgets without input behavior accept every event and return nothing.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownWidget`] if `id` does not exist, or whatever
    /// the widget's own handling fails with.
    pub fn handle_event(&mut self, id: WidgetId, event: &Event) -> Result<Vec<Event>> {
        let route = match &self.get(id)?.kind {
            WidgetKind::Layout(_) | WidgetKind::Viewport(_) => Route::Layout,
            WidgetKind::InputScrollable(_) => Route::InputScrollable,
            WidgetKind::Animation(_) => Route::Animation,
            WidgetKind::InputField(_) => Route::InputField,
            WidgetKind::Menu(_) => Route::Menu,
            WidgetKind::FpsCounter(_) => Route::FpsCounter,
            WidgetKind::PointerPos(_) => Route::PointerPos,
            WidgetKind::Plain
            | WidgetKind::ScrollBar(_)
            | WidgetKind::Switching(_)
            | WidgetKind::Label(_)
            | WidgetKind::MenuItem(_) => Route::Ignore,
        };

        match route {
            Route::Ignore => Ok(Vec::new()),
            Route::Layout => self.layout_event(id, event),
            Route::InputScrollable => self.input_scrollable_event(id, event),
            Route::Animation => self.animation_event(id, event),
            Route::InputField => self.input_field_event(id, event),
            Route::Menu => self.menu_event(id, event),
            Route::FpsCounter => self.fps_counter_event(id, event),
            Route::PointerPos => self.pointer_pos_event(id, event),
        }
    }

    /// Shared layout behavior: rebuild on tick boundaries, redraw when a
    /// descendant reports new content
    pub(crate) fn layout_event(&mut self, id: WidgetId, event: &Event) -> Result<Vec<Event>> {
        match event {
            Event::Service(ServiceEvent::TickBoundary) => {
                self.recomposite(id)?;
            }
            Event::ContentUpdated { source } if self.is_descendant(*source, id) => {
                self.invalidate_ancestors(*source);
            }
            _ => {}
        }
        Ok(Vec::new())
    }
}

fn to_isize(value: usize) -> isize {
    isize::try_from(value).unwrap_or(isize::MAX)
}
