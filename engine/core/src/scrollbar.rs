//! Scroll Bars
//!
//! A one-cell-thick strip that shows which part of a longer buffer is in
//! view. It does not handle events; its owner calls
//! [`Scene::show_scroll_pos`] after every scroll.

use serde::{Deserialize, Serialize};

use crate::backend::DisplayBackend;
use crate::error::{Result, StateError};
use crate::scene::{Scene, WidgetId, WidgetKind};
use crate::tile::{Color, Pos, Size, Tile, TileGrid};

/// Direction a bar runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// Top to bottom, one column wide
    Vertical,
    /// Left to right, one row high
    Horizontal,
}

/// Colors and glyph of a bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollBarState {
    orientation: Orientation,
    length: usize,
    track: Color,
    thumb: Color,
    glyph: char,
}

impl ScrollBarState {
    /// Direction of the bar
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Number of cells along the bar
    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    fn cell(&self, index: usize) -> Pos {
        match self.orientation {
            Orientation::Vertical => Pos::new(index, 0),
            Orientation::Horizontal => Pos::new(0, index),
        }
    }
}

fn check_ratio(name: &'static str, value: f64) -> std::result::Result<(), StateError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(StateError::InvalidRatio { name, value })
    }
}

/// `round(length * ratio)` with ties to even, clamped to `length`
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn scaled(length: usize, ratio: f64) -> usize {
    let cells = (length as f64 * ratio).round_ties_even();
    (cells.max(0.0) as usize).min(length)
}

impl<B: DisplayBackend> Scene<B> {
    /// Create a bar of `length` cells using the configured colors and glyph
    ///
    /// The bar starts with the whole track unlit.
    pub fn create_scroll_bar(&mut self, orientation: Orientation, length: usize) -> WidgetId {
        let style = self.config().scroll_bar.clone();
        let size = match orientation {
            Orientation::Vertical => Size::new(length, 1),
            Orientation::Horizontal => Size::new(1, length),
        };
        let tiles = TileGrid::filled(
            size,
            Tile::new(style.glyph, style.track, Color::transparent()),
        );
        self.spawn(
            tiles,
            WidgetKind::ScrollBar(ScrollBarState {
                orientation,
                length,
                track: style.track,
                thumb: style.thumb,
                glyph: style.glyph,
            }),
        )
    }

    /// Light `round(length * fill)` cells starting at
    /// `round(length * position)`
    ///
    /// Cells past the end of the bar are dropped.
    ///
    /// # Errors
    ///
    /// [`StateError::InvalidRatio`] if either argument is outside `[0, 1]`;
    /// [`StateError::WrongKind`] unless `id` is a scroll bar.
    pub fn show_scroll_pos(&mut self, id: WidgetId, position: f64, fill: f64) -> Result<()> {
        check_ratio("position", position)?;
        check_ratio("fill", fill)?;

        let widget = self.get_mut(id)?;
        let WidgetKind::ScrollBar(bar) = &widget.kind else {
            return Err(StateError::WrongKind {
                id,
                expected: "scroll bar",
            }
            .into());
        };
        let bar = *bar;
        let start = scaled(bar.length, position);
        let end = (start + scaled(bar.length, fill)).min(bar.length);

        let tiles = widget.surface.tiles_mut();
        for index in 0..bar.length {
            let color = if (start..end).contains(&index) {
                bar.thumb
            } else {
                bar.track
            };
            tiles.set(
                bar.cell(index),
                Tile::new(bar.glyph, color, Color::transparent()),
            );
        }
        self.content_changed(id)
    }
}
