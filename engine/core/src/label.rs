//! Text Widgets
//!
//! [`LabelState`] renders justified, word-wrapped text into a fixed area.
//! [`InputFieldState`] is a one-line label that edits its text from key
//! events and submits it on Enter.

use serde::{Deserialize, Serialize};

use crate::backend::DisplayBackend;
use crate::error::{Result, StateError};
use crate::events::{Event, Key};
use crate::scene::{Scene, WidgetId, WidgetKind};
use crate::tile::{Color, Pos, Size, Tile, TileGrid};

// =============================================================================
// Label
// =============================================================================

/// Horizontal placement of each line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Justify {
    /// Flush left
    #[default]
    Left,
    /// Flush right
    Right,
    /// Centered, extra space on the right
    Center,
}

/// Appearance of a label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelStyle {
    /// Fixed area; `None` sizes the label to the text
    pub size: Option<Size>,
    /// Line placement
    pub justify: Justify,
    /// Text color
    pub fg: Color,
    /// Cell background
    pub bg: Color,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            size: None,
            justify: Justify::Left,
            fg: Color::WHITE,
            bg: Color::transparent(),
        }
    }
}

/// Text and style of a label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelState {
    text: String,
    justify: Justify,
    fg: Color,
    bg: Color,
}

impl LabelState {
    /// The text as given (before wrapping)
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Size that fits `text` without wrapping
fn natural_size(text: &str) -> Size {
    let lines: Vec<&str> = text.split('\n').collect();
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    Size::new(lines.len(), width)
}

/// Wrap and justify `text` into a grid of `size`
pub(crate) fn render_text(
    text: &str,
    size: Size,
    justify: Justify,
    fg: Color,
    bg: Color,
) -> std::result::Result<TileGrid, StateError> {
    let width = size.width.max(1);
    let lines: Vec<String> = text
        .split('\n')
        .flat_map(|paragraph| {
            if paragraph.is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(paragraph, width)
                    .into_iter()
                    .map(|line| line.into_owned())
                    .collect()
            }
        })
        .collect();
    if lines.len() > size.height {
        return Err(StateError::TextOverflow {
            needed: lines.len(),
            available: size.height,
        });
    }

    let mut grid = TileGrid::filled(size, Tile::new(' ', fg, bg));
    for (row, line) in lines.iter().enumerate() {
        let len = line.chars().count().min(size.width);
        let spare = size.width - len;
        let start = match justify {
            Justify::Left => 0,
            Justify::Right => spare,
            Justify::Center => spare / 2,
        };
        for (i, ch) in line.chars().take(len).enumerate() {
            grid.set(Pos::new(row, start + i), Tile::new(ch, fg, bg));
        }
    }
    Ok(grid)
}

impl<B: DisplayBackend> Scene<B> {
    /// Create a label
    ///
    /// Without a fixed size the label is exactly as large as the text, one
    /// row per line.
    ///
    /// # Errors
    ///
    /// [`StateError::TextOverflow`] if the wrapped text needs more rows than
    /// a fixed size provides.
    pub fn create_label(&mut self, text: &str, style: LabelStyle) -> Result<WidgetId> {
        let size = style.size.unwrap_or_else(|| natural_size(text));
        let tiles = render_text(text, size, style.justify, style.fg, style.bg)?;
        Ok(self.spawn(
            tiles,
            WidgetKind::Label(LabelState {
                text: text.to_string(),
                justify: style.justify,
                fg: style.fg,
                bg: style.bg,
            }),
        ))
    }

    /// Replace the text of a label, keeping its size
    ///
    /// # Errors
    ///
    /// [`StateError::TextOverflow`] if the text does not fit; the old text
    /// stays on display.
    pub fn set_label_text(&mut self, id: WidgetId, text: &str) -> Result<()> {
        let widget = self.get_mut(id)?;
        let size = widget.surface.size();
        let WidgetKind::Label(state) = &mut widget.kind else {
            return Err(StateError::WrongKind { id, expected: "label" }.into());
        };
        let tiles = render_text(text, size, state.justify, state.fg, state.bg)?;
        state.text = text.to_string();
        widget.surface.tiles_mut().copy_from(&tiles)?;
        self.content_changed(id)
    }

    /// Current text of a label or input field
    ///
    /// # Errors
    ///
    /// [`StateError::WrongKind`] for other widgets.
    pub fn text(&self, id: WidgetId) -> Result<&str> {
        match &self.get(id)?.kind {
            WidgetKind::Label(state) => Ok(&state.text),
            WidgetKind::InputField(state) => Ok(&state.text),
            _ => Err(StateError::WrongKind { id, expected: "label" }.into()),
        }
    }
}

// =============================================================================
// Input Field
// =============================================================================

/// What a shifted key types on a US layout
fn shifted(ch: char) -> char {
    match ch {
        '1' => '!',
        '2' => '@',
        '3' => '#',
        '4' => '$',
        '5' => '%',
        '6' => '^',
        '7' => '&',
        '8' => '*',
        '9' => '(',
        '0' => ')',
        '-' => '_',
        '=' => '+',
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        ';' => ':',
        '\'' => '"',
        '`' => '~',
        ',' => '<',
        '.' => '>',
        '/' => '?',
        c => c.to_ascii_uppercase(),
    }
}

/// Editing state of an input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFieldState {
    text: String,
    fg: Color,
    bg: Color,
    shift: bool,
    accepting: bool,
    finishing: bool,
}

impl InputFieldState {
    /// Text typed so far
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether key presses still edit the text
    #[must_use]
    pub const fn accepting(&self) -> bool {
        self.accepting
    }
}

impl<B: DisplayBackend> Scene<B> {
    /// Create an empty one-line input field `width` cells wide
    pub fn create_input_field(&mut self, width: usize, fg: Color, bg: Color) -> WidgetId {
        self.spawn(
            TileGrid::filled(Size::new(1, width), Tile::new(' ', fg, bg)),
            WidgetKind::InputField(InputFieldState {
                text: String::new(),
                fg,
                bg,
                shift: false,
                accepting: true,
                finishing: false,
            }),
        )
    }

    /// Stop accepting input; the next event delivered to the field makes it
    /// submit its text
    ///
    /// # Errors
    ///
    /// [`StateError::WrongKind`] unless `id` is an input field.
    pub fn finish_input(&mut self, id: WidgetId) -> Result<()> {
        let WidgetKind::InputField(state) = &mut self.get_mut(id)?.kind else {
            return Err(StateError::WrongKind {
                id,
                expected: "input field",
            }
            .into());
        };
        state.accepting = false;
        state.finishing = true;
        Ok(())
    }

    pub(crate) fn input_field_event(&mut self, id: WidgetId, event: &Event) -> Result<Vec<Event>> {
        let widget = self.get_mut(id)?;
        let width = widget.surface.size().width;
        let WidgetKind::InputField(state) = &mut widget.kind else {
            return Ok(Vec::new());
        };

        if state.finishing {
            state.finishing = false;
            return Ok(vec![Event::TextSubmitted {
                field: id,
                text: state.text.clone(),
            }]);
        }

        let mut candidate = state.text.clone();
        match event {
            Event::KeyUp(Key::Shift) => {
                state.shift = false;
                return Ok(Vec::new());
            }
            Event::KeyDown(Key::Shift) => {
                state.shift = true;
                return Ok(Vec::new());
            }
            Event::KeyDown(key) if state.accepting => match key {
                Key::Enter => {
                    state.accepting = false;
                    tracing::debug!(field = %id, "Input submitted");
                    return Ok(vec![Event::TextSubmitted {
                        field: id,
                        text: state.text.clone(),
                    }]);
                }
                Key::Backspace => {
                    candidate.pop();
                }
                other => match other.printable() {
                    Some(ch) if candidate.chars().count() < width => {
                        candidate.push(if state.shift { shifted(ch) } else { ch });
                    }
                    _ => return Ok(Vec::new()),
                },
            },
            _ => return Ok(Vec::new()),
        }

        // keys whose text no longer fits the row are dropped
        let Ok(tiles) = render_text(
            &candidate,
            Size::new(1, width),
            Justify::Left,
            state.fg,
            state.bg,
        ) else {
            tracing::trace!(field = %id, "Input key ignored: text would not fit");
            return Ok(Vec::new());
        };
        state.text = candidate;
        widget.surface.tiles_mut().copy_from(&tiles)?;
        self.content_changed(id)?;
        Ok(Vec::new())
    }
}
