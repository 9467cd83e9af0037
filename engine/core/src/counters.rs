//! Diagnostic Readouts
//!
//! Two small label-like widgets for debugging a running scene: a frame
//! rate counter averaged over recent ticks, and the last known pointer
//! position.

use std::collections::VecDeque;
use std::time::Duration;

use crate::backend::DisplayBackend;
use crate::error::{Result, StateError};
use crate::events::Event;
use crate::label::{render_text, Justify};
use crate::scene::{Scene, WidgetId, WidgetKind};
use crate::tile::{Color, Size};

/// Number of tick deltas the frame rate is averaged over
pub const FPS_SAMPLES: usize = 100;

const FPS_WIDTH: usize = 3;
const FPS_MAX: f64 = 999.0;
const POINTER_TEXT: &str = "000x000";

/// Recent tick deltas of an FPS counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FpsCounterState {
    samples: VecDeque<Duration>,
    fg: Color,
    bg: Color,
}

impl FpsCounterState {
    /// Ticks per second over the retained samples, if any time has passed
    #[must_use]
    pub fn fps(&self) -> Option<f64> {
        let total: Duration = self.samples.iter().sum();
        if total.is_zero() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let count = self.samples.len() as f64;
        Some(count / total.as_secs_f64())
    }

    fn push(&mut self, dt: Duration) {
        if self.samples.len() == FPS_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back(dt);
    }

    fn readout(&self) -> Option<String> {
        let fps = self.fps()?.round_ties_even().min(FPS_MAX);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let whole = fps as u32;
        Some(format!("{whole:0width$}", width = FPS_WIDTH))
    }
}

/// Colors of a pointer readout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerPosState {
    fg: Color,
    bg: Color,
}

impl<B: DisplayBackend> Scene<B> {
    /// Create a three-digit FPS readout, initially `"030"`
    ///
    /// # Errors
    ///
    /// Only if the readout cannot be rendered, which a three-cell label
    /// never triggers.
    pub fn create_fps_counter(&mut self, fg: Color, bg: Color) -> Result<WidgetId> {
        let tiles = render_text("030", Size::new(1, FPS_WIDTH), Justify::Left, fg, bg)?;
        Ok(self.spawn(
            tiles,
            WidgetKind::FpsCounter(FpsCounterState {
                samples: VecDeque::with_capacity(FPS_SAMPLES),
                fg,
                bg,
            }),
        ))
    }

    pub(crate) fn fps_counter_event(&mut self, id: WidgetId, event: &Event) -> Result<Vec<Event>> {
        let Event::Tick(dt) = event else {
            return Ok(Vec::new());
        };
        let widget = self.get_mut(id)?;
        let WidgetKind::FpsCounter(state) = &mut widget.kind else {
            return Err(StateError::WrongKind {
                id,
                expected: "fps counter",
            }
            .into());
        };
        state.push(*dt);
        let Some(text) = state.readout() else {
            return Ok(Vec::new());
        };
        let tiles = render_text(&text, widget.surface.size(), Justify::Left, state.fg, state.bg)?;
        widget.surface.tiles_mut().copy_from(&tiles)?;
        self.content_changed(id)?;
        Ok(Vec::new())
    }

    /// Create a pointer readout, initially `"000x000"`
    ///
    /// Shows column then row, each zero-padded to three digits.
    ///
    /// # Errors
    ///
    /// Only if the readout cannot be rendered.
    pub fn create_pointer_pos(&mut self, fg: Color, bg: Color) -> Result<WidgetId> {
        let size = Size::new(1, POINTER_TEXT.len());
        let tiles = render_text(POINTER_TEXT, size, Justify::Left, fg, bg)?;
        Ok(self.spawn(tiles, WidgetKind::PointerPos(PointerPosState { fg, bg })))
    }

    pub(crate) fn pointer_pos_event(&mut self, id: WidgetId, event: &Event) -> Result<Vec<Event>> {
        let Some(pointer) = (match event {
            Event::MiscInput(input) => input.pointer_pos(),
            _ => None,
        }) else {
            return Ok(Vec::new());
        };
        let widget = self.get_mut(id)?;
        let WidgetKind::PointerPos(state) = &widget.kind else {
            return Err(StateError::WrongKind {
                id,
                expected: "pointer position widget",
            }
            .into());
        };
        // wider coordinates are truncated rather than wrapped
        let text: String = format!("{:03}x{:03}", pointer.col, pointer.row)
            .chars()
            .take(POINTER_TEXT.len())
            .collect();
        let tiles = render_text(&text, widget.surface.size(), Justify::Left, state.fg, state.bg)?;
        widget.surface.tiles_mut().copy_from(&tiles)?;
        self.content_changed(id)?;
        Ok(Vec::new())
    }
}
