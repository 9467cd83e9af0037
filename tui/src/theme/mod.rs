//! Theme and Colors
//!
//! The demo palette, plus the one conversion the terminal needs: engine
//! colors are RGBA, ratatui colors are RGB or "whatever the terminal uses".
//! Fully transparent engine colors map to [`Color::Reset`] so the
//! terminal's own background shows through.

use ratatui::style::Color;
use tessera_core::Color as TileColor;

// ============================================================================
// Demo Palette
// ============================================================================

/// Panel background - deep slate
pub const PANEL_BG: TileColor = TileColor::rgb(24, 28, 40);

/// Panel frame - muted steel blue
pub const PANEL_FRAME: TileColor = TileColor::rgb(110, 140, 190);

/// Titles and headers - warm amber
pub const TITLE: TileColor = TileColor::rgb(255, 196, 92);

/// Body text - soft white
pub const TEXT: TileColor = TileColor::rgb(220, 220, 228);

/// Dim text for hints and readouts
pub const DIM: TileColor = TileColor::rgb(120, 120, 132);

/// Highlighted menu item
pub const HIGHLIGHT: TileColor = TileColor::rgb(120, 230, 120);

/// Spinner glyphs
pub const ACCENT: TileColor = TileColor::rgb(255, 127, 170);

/// "Night" variant of the badge
pub const NIGHT: TileColor = TileColor::rgb(150, 180, 255);

// ============================================================================
// Conversion
// ============================================================================

/// Convert an engine color to a terminal color
///
/// Alpha is all-or-nothing on a terminal: transparent becomes
/// [`Color::Reset`], anything else is drawn opaque.
#[must_use]
pub const fn to_terminal(color: TileColor) -> Color {
    if color.is_transparent() {
        Color::Reset
    } else {
        Color::Rgb(color.r, color.g, color.b)
    }
}
