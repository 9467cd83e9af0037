//! Scrollable Viewports
//!
//! A viewport is a layout whose children are composited into an oversized
//! backing buffer. Its own surface is a window of `view_size` onto that
//! buffer, always exactly `backing[view_pos .. view_pos + view_size]`.
//! Scrolling only moves the window; the backing buffer is rebuilt through
//! the normal layout algorithm when children change.
//!
//! [`InputScrollState`] wraps a viewport in an outer layout that scrolls on
//! arrow keys and keeps optional scroll bars in sync.

use crate::backend::DisplayBackend;
use crate::error::{LayoutError, Result, ScrollTarget, StateError};
use crate::events::{Event, Key};
use crate::layout::LayoutState;
use crate::scene::{Renderable, Scene, TileSource, WidgetId, WidgetKind};
use crate::scrollbar::Orientation;
use crate::surface::Surface;
use crate::tile::{Delta, Pos, Size, TileGrid};

/// Backing buffer and view window of a viewport
#[derive(Debug, Clone)]
pub struct ViewportState {
    layout: LayoutState,
    backing: TileGrid,
    view_pos: Pos,
}

impl ViewportState {
    /// Child registry; the canvas is the backing buffer
    #[must_use]
    pub fn layout(&self) -> &LayoutState {
        &self.layout
    }

    pub(crate) fn layout_mut(&mut self) -> &mut LayoutState {
        &mut self.layout
    }

    /// Full logical buffer
    #[must_use]
    pub fn backing(&self) -> &TileGrid {
        &self.backing
    }

    /// Top-left corner of the view inside the backing buffer
    #[must_use]
    pub const fn view_pos(&self) -> Pos {
        self.view_pos
    }
}

impl Renderable for ViewportState {
    fn needs_redraw(&self) -> bool {
        self.layout.needs_redraw()
    }

    fn invalidate(&mut self) {
        self.layout.invalidate();
    }

    fn rebuild(&mut self, target: &mut TileGrid, source: &dyn TileSource) {
        self.layout.rebuild(&mut self.backing, source);
        if let Err(e) = self.backing.slice_into(self.view_pos, target) {
            // view_pos is validated on every scroll, so this means a bug
            tracing::warn!(error = %e, "Viewport slice failed");
        }
    }
}

/// Which scroll bars an input-scrollable wrapper carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollBars {
    /// Vertical bar along the right edge
    pub right: bool,
    /// Horizontal bar along the bottom edge
    pub bottom: bool,
}

impl ScrollBars {
    /// No bars
    pub const NONE: ScrollBars = ScrollBars {
        right: false,
        bottom: false,
    };
    /// Both bars
    pub const BOTH: ScrollBars = ScrollBars {
        right: true,
        bottom: true,
    };
}

/// Outer layout of an input-scrollable viewport
#[derive(Debug, Clone)]
pub struct InputScrollState {
    layout: LayoutState,
    viewport: WidgetId,
    right_bar: Option<WidgetId>,
    bottom_bar: Option<WidgetId>,
}

impl InputScrollState {
    /// Layout holding the viewport and the bars
    #[must_use]
    pub fn layout(&self) -> &LayoutState {
        &self.layout
    }

    pub(crate) fn layout_mut(&mut self) -> &mut LayoutState {
        &mut self.layout
    }

    /// The wrapped viewport
    #[must_use]
    pub const fn viewport(&self) -> WidgetId {
        self.viewport
    }

    /// Vertical bar, if any
    #[must_use]
    pub const fn right_bar(&self) -> Option<WidgetId> {
        self.right_bar
    }

    /// Horizontal bar, if any
    #[must_use]
    pub const fn bottom_bar(&self) -> Option<WidgetId> {
        self.bottom_bar
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let r = part as f64 / whole as f64;
        r.clamp(0.0, 1.0)
    }
}

impl<B: DisplayBackend> Scene<B> {
    /// Create a viewport showing `view_size` cells of `backing` from
    /// `view_pos`
    ///
    /// `backing` also becomes the background child, so the viewport behaves
    /// like a layout of the full logical size.
    ///
    /// # Errors
    ///
    /// [`LayoutError::InvalidViewSize`] unless `0 < view_size <= backing`;
    /// [`LayoutError::RegionOutOfBounds`] if the view would leave the
    /// backing buffer.
    pub fn create_viewport(
        &mut self,
        backing: TileGrid,
        view_pos: Pos,
        view_size: Size,
    ) -> Result<WidgetId> {
        let backing_size = backing.size();
        if view_size.height == 0
            || view_size.width == 0
            || view_size.height > backing_size.height
            || view_size.width > backing_size.width
        {
            return Err(LayoutError::InvalidViewSize {
                view: view_size,
                backing: backing_size,
            }
            .into());
        }
        let view = backing.slice(view_pos, view_size)?;

        let id = self.allocate_id();
        let background = self.create_widget(backing.clone());
        self.set_parent_unchecked(background, id);
        self.insert_widget(
            id,
            Surface::new(view),
            WidgetKind::Viewport(ViewportState {
                layout: LayoutState::with_background(background),
                backing,
                view_pos,
            }),
        );
        tracing::debug!(viewport = %id, backing = %backing_size, view = %view_size, "Viewport created");
        Ok(id)
    }

    /// Create a viewport wrapped in an arrow-key scrolling layout
    ///
    /// The outer widget is `view_size` plus one column for a right bar and
    /// one row for a bottom bar. Child operations on the wrapper
    /// ([`Scene::add_child`] and friends) go to the inner viewport.
    ///
    /// # Errors
    ///
    /// Same as [`Scene::create_viewport`].
    pub fn create_input_scrollable(
        &mut self,
        backing: TileGrid,
        view_pos: Pos,
        view_size: Size,
        bars: ScrollBars,
    ) -> Result<WidgetId> {
        let viewport = self.create_viewport(backing, view_pos, view_size)?;

        let outer_size = Size::new(
            view_size.height + usize::from(bars.bottom),
            view_size.width + usize::from(bars.right),
        );
        let id = self.allocate_id();
        let background = self.create_widget(TileGrid::blank(outer_size));
        self.set_parent_unchecked(background, id);
        self.insert_widget(
            id,
            Surface::new(TileGrid::blank(outer_size)),
            WidgetKind::InputScrollable(InputScrollState {
                layout: LayoutState::with_background(background),
                viewport,
                right_bar: None,
                bottom_bar: None,
            }),
        );
        self.add_child_to(id, viewport, Pos::ORIGIN)?;

        let right_bar = if bars.right {
            let bar = self.create_scroll_bar(Orientation::Vertical, view_size.height);
            self.add_child_to(id, bar, Pos::new(0, view_size.width))?;
            Some(bar)
        } else {
            None
        };
        let bottom_bar = if bars.bottom {
            let bar = self.create_scroll_bar(Orientation::Horizontal, view_size.width);
            self.add_child_to(id, bar, Pos::new(view_size.height, 0))?;
            Some(bar)
        } else {
            None
        };
        if let WidgetKind::InputScrollable(state) = &mut self.get_mut(id)?.kind {
            state.right_bar = right_bar;
            state.bottom_bar = bottom_bar;
        }
        self.refresh_scroll_bars(id)?;
        Ok(id)
    }

    /// Resolve `id` to `(viewport, wrapper)`
    fn viewport_target(
        &self,
        id: WidgetId,
    ) -> std::result::Result<(WidgetId, Option<WidgetId>), StateError> {
        match self.widgets.get(&id).map(|w| &w.kind) {
            Some(WidgetKind::Viewport(_)) => Ok((id, None)),
            Some(WidgetKind::InputScrollable(wrapper)) => Ok((wrapper.viewport, Some(id))),
            _ => Err(StateError::WrongKind {
                id,
                expected: "viewport",
            }),
        }
    }

    fn viewport_state(&self, id: WidgetId) -> std::result::Result<&ViewportState, StateError> {
        let (viewport, _) = self.viewport_target(id)?;
        match self.widgets.get(&viewport).map(|w| &w.kind) {
            Some(WidgetKind::Viewport(state)) => Ok(state),
            _ => Err(StateError::WrongKind {
                id,
                expected: "viewport",
            }),
        }
    }

    /// Move the view so its top-left corner is at `pos`
    ///
    /// Accepts a viewport or an input-scrollable wrapper; the wrapper's bars
    /// are refreshed on success.
    ///
    /// # Errors
    ///
    /// [`StateError::ScrollOutOfBounds`] if the view would leave the backing
    /// buffer; nothing changes in that case.
    pub fn scroll_to(&mut self, id: WidgetId, pos: Pos) -> Result<()> {
        let (viewport, wrapper) = self.viewport_target(id)?;
        let widget = self.get_mut(viewport)?;
        let view = widget.surface.size();
        let crate::scene::Widget { surface, kind } = widget;
        let WidgetKind::Viewport(state) = kind else {
            return Err(StateError::WrongKind {
                id,
                expected: "viewport",
            }
            .into());
        };
        let backing = state.backing.size();
        if !backing.fits(view, pos) {
            return Err(StateError::ScrollOutOfBounds {
                viewport,
                target: ScrollTarget::Pos(pos),
                view,
                backing,
            }
            .into());
        }

        state.view_pos = pos;
        state.backing.slice_into(pos, surface.tiles_mut())?;
        tracing::trace!(viewport = %viewport, pos = %pos, "Scrolled");

        self.content_changed(viewport)?;
        if let Some(wrapper) = wrapper {
            self.refresh_scroll_bars(wrapper)?;
        }
        Ok(())
    }

    /// Move the view by a signed delta
    ///
    /// # Errors
    ///
    /// [`StateError::ScrollOutOfBounds`] if the target leaves the backing
    /// buffer, including targets that would go negative.
    pub fn scroll_by(&mut self, id: WidgetId, delta: Delta) -> Result<()> {
        let state = self.viewport_state(id)?;
        let current = state.view_pos;
        let Some(target) = current.checked_add(delta) else {
            let (viewport, _) = self.viewport_target(id)?;
            return Err(StateError::ScrollOutOfBounds {
                viewport,
                target: ScrollTarget::Delta {
                    rows: delta.rows,
                    cols: delta.cols,
                },
                view: self.get(viewport)?.surface.size(),
                backing: state.backing.size(),
            }
            .into());
        };
        self.scroll_to(id, target)
    }

    /// Current view position
    ///
    /// # Errors
    ///
    /// [`StateError::WrongKind`] unless `id` is a viewport or wrapper.
    pub fn view_pos(&self, id: WidgetId) -> Result<Pos> {
        Ok(self.viewport_state(id)?.view_pos)
    }

    /// View dimensions
    ///
    /// # Errors
    ///
    /// [`StateError::WrongKind`] unless `id` is a viewport or wrapper.
    pub fn view_size(&self, id: WidgetId) -> Result<Size> {
        let (viewport, _) = self.viewport_target(id)?;
        Ok(self.get(viewport)?.surface.size())
    }

    /// The full backing buffer as last composited
    ///
    /// # Errors
    ///
    /// [`StateError::WrongKind`] unless `id` is a viewport or wrapper.
    pub fn backing_tiles(&self, id: WidgetId) -> Result<&TileGrid> {
        Ok(&self.viewport_state(id)?.backing)
    }

    /// Point the wrapper's bars at the current view
    fn refresh_scroll_bars(&mut self, wrapper: WidgetId) -> Result<()> {
        let (right, bottom, viewport) = match &self.get(wrapper)?.kind {
            WidgetKind::InputScrollable(state) => {
                (state.right_bar, state.bottom_bar, state.viewport)
            }
            _ => return Ok(()),
        };
        let state = self.viewport_state(viewport)?;
        let pos = state.view_pos;
        let backing = state.backing.size();
        let view = self.get(viewport)?.surface.size();

        if let Some(bar) = right {
            self.show_scroll_pos(
                bar,
                ratio(pos.row, backing.height),
                ratio(view.height, backing.height),
            )?;
        }
        if let Some(bar) = bottom {
            self.show_scroll_pos(
                bar,
                ratio(pos.col, backing.width),
                ratio(view.width, backing.width),
            )?;
        }
        Ok(())
    }

    /// Arrow keys scroll by one cell where there is room; Home returns to
    /// the origin. Everything else gets the plain layout behavior.
    pub(crate) fn input_scrollable_event(
        &mut self,
        id: WidgetId,
        event: &Event,
    ) -> Result<Vec<Event>> {
        let Event::KeyDown(key) = event else {
            return self.layout_event(id, event);
        };
        let pos = self.view_pos(id)?;
        let view = self.view_size(id)?;
        let backing = self.backing_tiles(id)?.size();

        let target = match key {
            Key::Up if pos.row > 0 => Some(Pos::new(pos.row - 1, pos.col)),
            Key::Down if pos.row + view.height < backing.height => {
                Some(Pos::new(pos.row + 1, pos.col))
            }
            Key::Left if pos.col > 0 => Some(Pos::new(pos.row, pos.col - 1)),
            Key::Right if pos.col + view.width < backing.width => {
                Some(Pos::new(pos.row, pos.col + 1))
            }
            Key::Home if pos != Pos::ORIGIN => Some(Pos::ORIGIN),
            _ => None,
        };
        if let Some(target) = target {
            self.scroll_to(id, target)?;
        }
        Ok(Vec::new())
    }
}
