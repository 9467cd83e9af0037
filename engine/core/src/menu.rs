//! Menus
//!
//! A [`MenuItemState`] is a boxed label with an action. A [`MenuState`] is a
//! layout of items stacked inside a double frame, with an optional header in
//! the top border, and a small state machine:
//!
//! - exactly one item is highlighted at any time
//! - Up/W and Down/S move the highlight by one, clamped to the items
//! - Space/Enter run the highlighted item's action
//! - pointer movement over an item highlights it
//! - keyboard transitions closer together than the input delay are dropped
//!
//! Children are `[background, item 1 ..= item N, header?]`, so the
//! navigable child indices are `1..=N`.

use std::fmt;
use std::time::Duration;

use crate::backend::DisplayBackend;
use crate::error::{LayoutError, Result, StateError, TypeConstraintError};
use crate::events::{Event, Key};
use crate::label::LabelStyle;
use crate::layout::LayoutState;
use crate::scene::{Scene, WidgetId, WidgetKind};
use crate::surface::Surface;
use crate::tile::{BoxStyle, Color, Pos, Size, Tile, TileGrid};

/// Callback run when a menu item is activated
pub type MenuAction = Box<dyn FnMut() -> Vec<Event>>;

// =============================================================================
// Menu Item
// =============================================================================

/// Colors of a menu item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItemStyle {
    /// Frame and text color when not highlighted
    pub color: Color,
    /// Frame and text color when highlighted
    pub highlight_color: Color,
    /// Cell background
    pub bg: Color,
}

impl Default for MenuItemStyle {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            highlight_color: Color::GREEN,
            bg: Color::BLACK,
        }
    }
}

/// Label, action and highlight of a menu item
pub struct MenuItemState {
    label: String,
    action: MenuAction,
    style: MenuItemStyle,
    highlighted: bool,
}

impl MenuItemState {
    /// The item's text
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the item is drawn in its highlight color
    #[must_use]
    pub const fn highlighted(&self) -> bool {
        self.highlighted
    }
}

impl fmt::Debug for MenuItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItemState")
            .field("label", &self.label)
            .field("style", &self.style)
            .field("highlighted", &self.highlighted)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Menu
// =============================================================================

/// Everything about a menu except its items
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuOptions {
    /// Text centered in the top border
    pub header: Option<String>,
    /// Frame and header color
    pub color: Option<Color>,
    /// Background color
    pub bg: Option<Color>,
    /// Sound played when the highlight moves
    pub switch_sound: Option<String>,
    /// Sound played when an item is activated
    pub activate_sound: Option<String>,
    /// Minimum time between keyboard transitions; configured default if unset
    pub input_delay: Option<Duration>,
}

/// Navigation state of a menu
#[derive(Debug, Clone)]
pub struct MenuState {
    layout: LayoutState,
    item_count: usize,
    current_highlight: usize,
    input_delay: Duration,
    current_delay: Duration,
    switch_sound: Option<String>,
    activate_sound: Option<String>,
}

impl MenuState {
    /// Child registry
    #[must_use]
    pub fn layout(&self) -> &LayoutState {
        &self.layout
    }

    pub(crate) fn layout_mut(&mut self) -> &mut LayoutState {
        &mut self.layout
    }

    /// Child index of the highlighted item
    #[must_use]
    pub const fn current_highlight(&self) -> usize {
        self.current_highlight
    }

    /// Number of items
    #[must_use]
    pub const fn item_count(&self) -> usize {
        self.item_count
    }

    /// Whether `index` is a navigable child index
    const fn navigable(&self, index: usize) -> bool {
        index >= 1 && index <= self.item_count
    }

    /// The item at navigable child `index`
    fn item_at(&self, index: usize) -> std::result::Result<WidgetId, StateError> {
        self.layout
            .children()
            .get(index)
            .copied()
            .filter(|_| self.navigable(index))
            .ok_or(StateError::InvalidHighlight {
                index,
                min: 1,
                max: self.item_count,
            })
    }
}

/// Menu key, after mapping letters to their arrow equivalents
enum MenuKey {
    Up,
    Down,
    Activate,
}

fn menu_key(key: Key) -> Option<MenuKey> {
    match key {
        Key::Up | Key::Char('w' | 'W') => Some(MenuKey::Up),
        Key::Down | Key::Char('s' | 'S') => Some(MenuKey::Down),
        Key::Space | Key::Enter => Some(MenuKey::Activate),
        _ => None,
    }
}

impl<B: DisplayBackend> Scene<B> {
    /// Create a menu item: `label` in a single-line box, running `action`
    /// when activated
    pub fn create_menu_item(
        &mut self,
        label: &str,
        action: MenuAction,
        style: MenuItemStyle,
    ) -> WidgetId {
        let width = label.chars().count() + 2;
        let mut tiles = TileGrid::boxed(Size::new(3, width), BoxStyle::Single, style.color, style.bg);
        for (i, ch) in label.chars().enumerate() {
            tiles.set(Pos::new(1, i + 1), Tile::new(ch, style.color, style.bg));
        }
        self.spawn(
            tiles,
            WidgetKind::MenuItem(MenuItemState {
                label: label.to_string(),
                action,
                style,
                highlighted: false,
            }),
        )
    }

    /// Run the action of a menu item and return what it emits
    ///
    /// # Errors
    ///
    /// [`TypeConstraintError::NotAMenuItem`] unless `id` is a menu item.
    pub fn activate_item(&mut self, id: WidgetId) -> Result<Vec<Event>> {
        match &mut self.get_mut(id)?.kind {
            WidgetKind::MenuItem(item) => {
                tracing::debug!(item = %id, label = %item.label, "Menu item activated");
                Ok((item.action)())
            }
            _ => Err(TypeConstraintError::NotAMenuItem(id).into()),
        }
    }

    fn set_item_highlight(&mut self, id: WidgetId, highlighted: bool) -> Result<()> {
        let widget = self.get_mut(id)?;
        let WidgetKind::MenuItem(item) = &mut widget.kind else {
            return Err(TypeConstraintError::NotAMenuItem(id).into());
        };
        item.highlighted = highlighted;
        let color = if highlighted {
            item.style.highlight_color
        } else {
            item.style.color
        };
        widget.surface.tiles_mut().set_fg(color);
        self.content_changed(id)
    }

    /// Build a menu around `items`, highlighting the first one
    ///
    /// The menu is `3 * items + 4` rows by `widest item + 4` columns; items
    /// are stacked from `(2, 2)`.
    ///
    /// # Errors
    ///
    /// - [`LayoutError::EmptyMenu`] without items
    /// - [`TypeConstraintError::NotAMenuItem`] if any id is not a menu item
    /// - [`LayoutError::AlreadyParented`] if any item belongs elsewhere
    /// - [`LayoutError::HeaderTooLong`] if the header is wider than the
    ///   frame interior
    pub fn create_menu(&mut self, items: &[WidgetId], options: MenuOptions) -> Result<WidgetId> {
        if items.is_empty() {
            return Err(LayoutError::EmptyMenu.into());
        }
        let mut widest = 0;
        for (i, item) in items.iter().enumerate() {
            let widget = self.get(*item)?;
            if !matches!(widget.kind, WidgetKind::MenuItem(_)) {
                return Err(TypeConstraintError::NotAMenuItem(*item).into());
            }
            if let Some(parent) = widget.surface.parent() {
                return Err(LayoutError::AlreadyParented {
                    child: *item,
                    parent,
                }
                .into());
            }
            if items[..i].contains(item) {
                return Err(LayoutError::DuplicateChild {
                    layout: *item,
                    child: *item,
                }
                .into());
            }
            widest = widest.max(widget.surface.size().width);
        }
        let size = Size::new(items.len() * 3 + 4, widest + 4);
        if let Some(header) = &options.header {
            let len = header.chars().count();
            if len > size.width - 2 {
                return Err(LayoutError::HeaderTooLong {
                    len,
                    max: size.width - 2,
                }
                .into());
            }
        }

        let color = options.color.unwrap_or(Color::WHITE);
        let bg = options.bg.unwrap_or(Color::BLACK);
        let frame = TileGrid::boxed(size, BoxStyle::Double, color, bg);
        let input_delay = options
            .input_delay
            .unwrap_or_else(|| self.config().menu.input_delay());

        let id = self.allocate_id();
        let background = self.create_widget(frame.clone());
        self.set_parent_unchecked(background, id);
        self.insert_widget(
            id,
            Surface::new(frame),
            WidgetKind::Menu(MenuState {
                layout: LayoutState::with_background(background),
                item_count: items.len(),
                current_highlight: 1,
                input_delay,
                // the first key press is never delayed
                current_delay: input_delay,
                switch_sound: options.switch_sound,
                activate_sound: options.activate_sound,
            }),
        );

        for (i, item) in items.iter().enumerate() {
            self.add_child_to(id, *item, Pos::new(2 + 3 * i, 2))?;
        }
        if let Some(header) = &options.header {
            let label = self.create_label(
                header,
                LabelStyle {
                    fg: color,
                    bg,
                    ..LabelStyle::default()
                },
            )?;
            let col = (size.width - header.chars().count()) / 2;
            self.add_child_to(id, label, Pos::new(0, col))?;
        }
        self.set_item_highlight(items[0], true)?;

        tracing::debug!(menu = %id, items = items.len(), "Menu created");
        Ok(id)
    }

    fn menu_state(&self, id: WidgetId) -> std::result::Result<&MenuState, StateError> {
        match self.widgets.get(&id).map(|w| &w.kind) {
            Some(WidgetKind::Menu(state)) => Ok(state),
            _ => Err(StateError::WrongKind { id, expected: "menu" }),
        }
    }

    fn menu_state_mut(&mut self, id: WidgetId) -> std::result::Result<&mut MenuState, StateError> {
        match self.widgets.get_mut(&id).map(|w| &mut w.kind) {
            Some(WidgetKind::Menu(state)) => Ok(state),
            _ => Err(StateError::WrongKind { id, expected: "menu" }),
        }
    }

    /// Child index of the highlighted item
    ///
    /// # Errors
    ///
    /// [`StateError::WrongKind`] unless `id` is a menu.
    pub fn current_highlight(&self, id: WidgetId) -> Result<usize> {
        Ok(self.menu_state(id)?.current_highlight)
    }

    /// Move the highlight to child `index`
    ///
    /// # Errors
    ///
    /// [`StateError::InvalidHighlight`] if `index` is not a navigable item;
    /// the highlight does not move.
    pub fn set_current_highlight(&mut self, id: WidgetId, index: usize) -> Result<()> {
        let state = self.menu_state(id)?;
        if !state.navigable(index) {
            return Err(StateError::InvalidHighlight {
                index,
                min: 1,
                max: state.item_count,
            }
            .into());
        }
        let previous = state.current_highlight;
        let old_item = state.item_at(previous)?;
        let new_item = state.item_at(index)?;
        for item in [old_item, new_item] {
            if !matches!(self.get(item)?.kind, WidgetKind::MenuItem(_)) {
                return Err(TypeConstraintError::NotAMenuItem(item).into());
            }
        }

        self.set_item_highlight(old_item, false)?;
        self.set_item_highlight(new_item, true)?;
        self.menu_state_mut(id)?.current_highlight = index;
        self.mark_needs_redraw(id)?;
        tracing::trace!(menu = %id, from = previous, to = index, "Highlight moved");
        Ok(())
    }

    pub(crate) fn menu_event(&mut self, id: WidgetId, event: &Event) -> Result<Vec<Event>> {
        match event {
            Event::Tick(dt) => {
                let state = self.menu_state_mut(id)?;
                if state.current_delay < state.input_delay {
                    state.current_delay += *dt;
                }
                Ok(Vec::new())
            }
            Event::KeyDown(key) => {
                let Some(action) = menu_key(*key) else {
                    return Ok(Vec::new());
                };
                let state = self.menu_state_mut(id)?;
                if state.current_delay < state.input_delay {
                    return Ok(Vec::new());
                }
                state.current_delay = Duration::ZERO;
                self.menu_key_event(id, &action)
            }
            Event::MiscInput(input) => {
                let Some(pointer) = input.pointer_pos() else {
                    return Ok(Vec::new());
                };
                self.menu_pointer_event(id, pointer)
            }
            _ => self.layout_event(id, event),
        }
    }

    fn menu_key_event(&mut self, id: WidgetId, action: &MenuKey) -> Result<Vec<Event>> {
        let state = self.menu_state(id)?;
        let current = state.current_highlight;
        let last = state.item_count;
        let switch_sound = state.switch_sound.clone();
        let activate_sound = state.activate_sound.clone();

        let target = match action {
            MenuKey::Up => current.saturating_sub(1).max(1),
            MenuKey::Down => (current + 1).min(last),
            MenuKey::Activate => {
                let item = state.item_at(current)?;
                let mut out = self.activate_item(item)?;
                out.extend(activate_sound.map(Event::PlaySound));
                return Ok(out);
            }
        };
        if target == current {
            return Ok(Vec::new());
        }
        self.set_current_highlight(id, target)?;
        Ok(switch_sound.map(Event::PlaySound).into_iter().collect())
    }

    fn menu_pointer_event(&mut self, id: WidgetId, pointer: Pos) -> Result<Vec<Event>> {
        let origin = self.screen_offset(id)?;
        let size = self.size(id)?;
        let row = isize::try_from(pointer.row)
            .unwrap_or(isize::MAX)
            .saturating_sub(origin.rows);
        let col = isize::try_from(pointer.col)
            .unwrap_or(isize::MAX)
            .saturating_sub(origin.cols);
        let (Ok(row), Ok(col)) = (usize::try_from(row), usize::try_from(col)) else {
            return Ok(Vec::new());
        };
        let local = Pos::new(row, col);
        if !size.contains(local) {
            return Ok(Vec::new());
        }
        let Some(child) = self.get_child_on_pos(id, local, false)? else {
            return Ok(Vec::new());
        };

        let state = self.menu_state(id)?;
        let Some(index) = state.layout.index_of(child) else {
            return Ok(Vec::new());
        };
        // the header is a child too, but not a navigable one
        if !state.navigable(index) || index == state.current_highlight {
            return Ok(Vec::new());
        }
        let switch_sound = state.switch_sound.clone();
        self.set_current_highlight(id, index)?;
        Ok(switch_sound.map(Event::PlaySound).into_iter().collect())
    }
}
