//! Tile Buffers
//!
//! The atomic rendering unit of the engine. A `Tile` is one character cell
//! with a foreground and background color; a `TileGrid` is a fixed-size,
//! row-major grid of tiles owned by exactly one surface.
//!
//! Grids never change shape after construction. Everything that "replaces"
//! a grid (animation frames, switching images, scroll views) copies cells
//! into an existing grid of the same size.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// Surface-agnostic RGBA color
///
/// Backends map this to whatever they can display (true color, 256-color,
/// CSS). Alpha 0 means "nothing here"; backends may let lower z-levels show
/// through such cells.
///
/// # Examples
///
/// ```
/// use tessera_core::Color;
///
/// let red = Color::rgb(255, 0, 0);
/// assert_eq!(red.to_hex(), "#ff0000");
/// assert_eq!(Color::from_hex("#f00"), Some(red));
/// assert!(Color::transparent().is_transparent());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
    /// Alpha component (0=transparent, 255=opaque)
    pub a: u8,
}

impl Color {
    /// Opaque white
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Opaque black
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Mid gray, the default scroll bar track
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    /// Default highlight for menu items
    pub const GREEN: Color = Color::rgb(0, 200, 0);

    /// Create a fully opaque color from RGB components
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with explicit alpha channel
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a fully transparent color
    #[must_use]
    pub const fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Check if this color is fully transparent
    #[must_use]
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Convert to a CSS-style hex string (#RRGGBB or #RRGGBBAA)
    #[must_use]
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`
    ///
    /// Returns `None` for anything else.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !digits.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();

        match digits.len() {
            3 => {
                let mut out = [0u8; 3];
                for (i, c) in digits.chars().enumerate() {
                    let v = c.to_digit(16)? as u8;
                    out[i] = v * 17;
                }
                Some(Self::rgb(out[0], out[1], out[2]))
            }
            6 => Some(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            8 => Some(Self::rgba(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
                channel(&digits[6..8])?,
            )),
            _ => None,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::transparent()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A single character cell
///
/// Tiles have no identity; two tiles are the same tile when all three
/// fields are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    /// The character to display
    pub ch: char,
    /// Foreground (glyph) color
    pub fg: Color,
    /// Background (cell) color
    pub bg: Color,
}

impl Tile {
    /// Full block character, used for filled menu interiors
    pub const FULL_BLOCK: char = '\u{2588}';

    /// Create a tile
    #[must_use]
    pub const fn new(ch: char, fg: Color, bg: Color) -> Self {
        Self { ch, fg, bg }
    }

    /// A blank cell: a space over a transparent background
    #[must_use]
    pub const fn blank() -> Self {
        Self {
            ch: ' ',
            fg: Color::WHITE,
            bg: Color::transparent(),
        }
    }

    /// Whether backends may treat this cell as a hole in its layer
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.ch == ' ' && self.bg.is_transparent()
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::blank()
    }
}

/// A cell coordinate, `(row, col)`, in the space of the owning grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Pos {
    /// Row (y), counted from the top
    pub row: usize,
    /// Column (x), counted from the left
    pub col: usize,
}

impl Pos {
    /// The top-left corner
    pub const ORIGIN: Pos = Pos { row: 0, col: 0 };

    /// Create a position
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Offset by another position (component-wise sum)
    #[must_use]
    pub const fn offset(self, by: Pos) -> Pos {
        Pos {
            row: self.row + by.row,
            col: self.col + by.col,
        }
    }

    /// Apply a signed delta, `None` if either component goes negative
    #[must_use]
    pub fn checked_add(self, delta: Delta) -> Option<Pos> {
        Some(Pos {
            row: self.row.checked_add_signed(delta.rows)?,
            col: self.col.checked_add_signed(delta.cols)?,
        })
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A signed `(rows, cols)` shift, used for relative scrolling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Delta {
    /// Rows to move (positive = down)
    pub rows: isize,
    /// Columns to move (positive = right)
    pub cols: isize,
}

impl Delta {
    /// Create a delta
    #[must_use]
    pub const fn new(rows: isize, cols: isize) -> Self {
        Self { rows, cols }
    }
}

/// Grid dimensions, `(height, width)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    /// Number of rows
    pub height: usize,
    /// Number of columns
    pub width: usize,
}

impl Size {
    /// Create a size
    #[must_use]
    pub const fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Whether a cell lies inside a grid of this size
    #[must_use]
    pub const fn contains(&self, pos: Pos) -> bool {
        pos.row < self.height && pos.col < self.width
    }

    /// Whether a rectangle of `inner` size placed at `at` fits entirely inside
    #[must_use]
    pub const fn fits(&self, inner: Size, at: Pos) -> bool {
        inner.height <= self.height
            && inner.width <= self.width
            && at.row <= self.height - inner.height
            && at.col <= self.width - inner.width
    }

    /// Total cell count
    #[must_use]
    pub const fn area(&self) -> usize {
        self.height * self.width
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

/// Line style for [`TileGrid::boxed`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoxStyle {
    /// `┌─┐│└┘`
    Single,
    /// `╔═╗║╚╝`
    Double,
}

impl BoxStyle {
    /// Corner and edge glyphs: top-left, top-right, bottom-left,
    /// bottom-right, horizontal, vertical
    const fn glyphs(self) -> [char; 6] {
        match self {
            Self::Single => ['┌', '┐', '└', '┘', '─', '│'],
            Self::Double => ['╔', '╗', '╚', '╝', '═', '║'],
        }
    }
}

/// A fixed-size, row-major grid of tiles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    size: Size,
    cells: Vec<Tile>,
}

impl TileGrid {
    /// A grid of `size` where every cell is `tile`
    #[must_use]
    pub fn filled(size: Size, tile: Tile) -> Self {
        Self {
            size,
            cells: vec![tile; size.area()],
        }
    }

    /// A grid of blank tiles
    #[must_use]
    pub fn blank(size: Size) -> Self {
        Self::filled(size, Tile::blank())
    }

    /// Build from explicit rows
    ///
    /// # Errors
    ///
    /// [`LayoutError::RaggedGrid`] if rows differ in length.
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Result<Self, LayoutError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != width) {
            return Err(LayoutError::RaggedGrid);
        }
        Ok(Self {
            size: Size::new(height, width),
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Build from text lines, padding short lines with blanks
    ///
    /// Width is the longest line in characters.
    #[must_use]
    pub fn from_lines(lines: &[&str], fg: Color, bg: Color) -> Self {
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let mut grid = Self::filled(Size::new(lines.len(), width), Tile::new(' ', fg, bg));
        for (row, line) in lines.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                grid.cells[row * width + col].ch = ch;
            }
        }
        grid
    }

    /// A framed rectangle with the interior left blank
    #[must_use]
    pub fn boxed(size: Size, style: BoxStyle, fg: Color, bg: Color) -> Self {
        let mut grid = Self::filled(size, Tile::new(' ', fg, bg));
        if size.height == 0 || size.width == 0 {
            return grid;
        }
        let [tl, tr, bl, br, h, v] = style.glyphs();
        let last_row = size.height - 1;
        let last_col = size.width - 1;
        for col in 0..size.width {
            grid.cells[col].ch = h;
            grid.cells[last_row * size.width + col].ch = h;
        }
        for row in 0..size.height {
            grid.cells[row * size.width].ch = v;
            grid.cells[row * size.width + last_col].ch = v;
        }
        grid.cells[0].ch = tl;
        grid.cells[last_col].ch = tr;
        grid.cells[last_row * size.width].ch = bl;
        grid.cells[last_row * size.width + last_col].ch = br;
        grid
    }

    /// Grid dimensions
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Number of rows
    #[must_use]
    pub const fn height(&self) -> usize {
        self.size.height
    }

    /// Number of columns
    #[must_use]
    pub const fn width(&self) -> usize {
        self.size.width
    }

    fn index_of(&self, pos: Pos) -> Option<usize> {
        self.size
            .contains(pos)
            .then(|| pos.row * self.size.width + pos.col)
    }

    /// The tile at `pos`, if inside the grid
    #[must_use]
    pub fn get(&self, pos: Pos) -> Option<&Tile> {
        self.index_of(pos).map(|i| &self.cells[i])
    }

    /// Mutable access to the tile at `pos`
    pub fn get_mut(&mut self, pos: Pos) -> Option<&mut Tile> {
        self.index_of(pos).map(move |i| &mut self.cells[i])
    }

    /// Overwrite one cell; returns `false` when `pos` is outside the grid
    pub fn set(&mut self, pos: Pos, tile: Tile) -> bool {
        match self.index_of(pos) {
            Some(i) => {
                self.cells[i] = tile;
                true
            }
            None => false,
        }
    }

    /// Overwrite every cell
    pub fn fill(&mut self, tile: Tile) {
        self.cells.fill(tile);
    }

    /// Replace every character with a space, keeping colors
    pub fn clear_chars(&mut self) {
        for cell in &mut self.cells {
            cell.ch = ' ';
        }
    }

    /// Set the foreground color of every cell
    pub fn set_fg(&mut self, color: Color) {
        for cell in &mut self.cells {
            cell.fg = color;
        }
    }

    /// Iterate rows as slices
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        // chunks(0) panics; an empty grid simply has no rows
        self.cells.chunks(self.size.width.max(1)).take(self.size.height)
    }

    /// The characters of one row as a string (handy for tests and logs)
    #[must_use]
    pub fn row_text(&self, row: usize) -> String {
        self.rows()
            .nth(row)
            .map(|r| r.iter().map(|t| t.ch).collect())
            .unwrap_or_default()
    }

    /// Paste `src` with its top-left corner at `at`
    ///
    /// Every source cell overwrites the destination cell (no transparency).
    /// Cells falling outside this grid are clipped.
    pub fn blit(&mut self, src: &TileGrid, at: Pos) {
        if at.row >= self.size.height || at.col >= self.size.width {
            return;
        }
        let rows = src.height().min(self.size.height - at.row);
        let cols = src.width().min(self.size.width - at.col);
        for r in 0..rows {
            let dst_start = (at.row + r) * self.size.width + at.col;
            let src_start = r * src.width();
            self.cells[dst_start..dst_start + cols]
                .copy_from_slice(&src.cells[src_start..src_start + cols]);
        }
    }

    /// Copy out the rectangle of `size` starting at `origin`
    ///
    /// # Errors
    ///
    /// [`LayoutError::RegionOutOfBounds`] if the rectangle leaves the grid.
    pub fn slice(&self, origin: Pos, size: Size) -> Result<TileGrid, LayoutError> {
        let mut out = TileGrid::blank(size);
        self.slice_into(origin, &mut out)?;
        Ok(out)
    }

    /// Copy the rectangle starting at `origin` into `dst`, sized by `dst`
    ///
    /// # Errors
    ///
    /// [`LayoutError::RegionOutOfBounds`] if the rectangle leaves the grid.
    pub fn slice_into(&self, origin: Pos, dst: &mut TileGrid) -> Result<(), LayoutError> {
        if !self.size.fits(dst.size, origin) {
            return Err(LayoutError::RegionOutOfBounds {
                origin,
                size: dst.size,
                bounds: self.size,
            });
        }
        let width = dst.width();
        for r in 0..dst.height() {
            let src_start = (origin.row + r) * self.size.width + origin.col;
            dst.cells[r * width..(r + 1) * width]
                .copy_from_slice(&self.cells[src_start..src_start + width]);
        }
        Ok(())
    }

    /// Replace all cells with those of a same-shaped grid
    ///
    /// # Errors
    ///
    /// [`LayoutError::ShapeMismatch`] when the sizes differ; the grid is
    /// left unchanged.
    pub fn copy_from(&mut self, other: &TileGrid) -> Result<(), LayoutError> {
        if self.size != other.size {
            return Err(LayoutError::ShapeMismatch {
                expected: self.size,
                found: other.size,
            });
        }
        self.cells.copy_from_slice(&other.cells);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tile(ch: char) -> Tile {
        Tile::new(ch, Color::WHITE, Color::BLACK)
    }

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Color::from_hex("#ffffff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("#0f0"), Some(Color::rgb(0, 255, 0)));
        assert_eq!(
            Color::from_hex("#00000080"),
            Some(Color::rgba(0, 0, 0, 128))
        );
        assert_eq!(Color::from_hex("white"), None);
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let rows = vec![vec![tile('a'), tile('b')], vec![tile('c')]];
        assert_eq!(TileGrid::from_rows(rows), Err(LayoutError::RaggedGrid));
    }

    #[test]
    fn test_from_lines_pads() {
        let grid = TileGrid::from_lines(&["ab", "c"], Color::WHITE, Color::BLACK);
        assert_eq!(grid.size(), Size::new(2, 2));
        assert_eq!(grid.row_text(0), "ab");
        assert_eq!(grid.row_text(1), "c ");
    }

    #[test]
    fn test_blit_overwrites_and_clips() {
        let mut dst = TileGrid::filled(Size::new(3, 3), tile('.'));
        let src = TileGrid::filled(Size::new(2, 2), tile('#'));
        dst.blit(&src, Pos::new(2, 2));
        assert_eq!(dst.row_text(0), "...");
        assert_eq!(dst.row_text(1), "...");
        assert_eq!(dst.row_text(2), "..#");

        dst.blit(&src, Pos::new(0, 0));
        assert_eq!(dst.row_text(0), "##.");
        assert_eq!(dst.row_text(1), "##.");
    }

    #[test]
    fn test_blit_pastes_blank_cells_too() {
        let mut dst = TileGrid::filled(Size::new(1, 2), tile('x'));
        let src = TileGrid::blank(Size::new(1, 1));
        dst.blit(&src, Pos::ORIGIN);
        assert_eq!(dst.get(Pos::ORIGIN), Some(&Tile::blank()));
    }

    #[test]
    fn test_slice() {
        let grid = TileGrid::from_lines(&["abcd", "efgh", "ijkl"], Color::WHITE, Color::BLACK);
        let view = grid.slice(Pos::new(1, 1), Size::new(2, 2)).unwrap();
        assert_eq!(view.row_text(0), "fg");
        assert_eq!(view.row_text(1), "jk");

        assert!(matches!(
            grid.slice(Pos::new(2, 0), Size::new(2, 1)),
            Err(LayoutError::RegionOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_copy_from_requires_same_shape() {
        let mut a = TileGrid::blank(Size::new(2, 2));
        let b = TileGrid::blank(Size::new(2, 3));
        assert!(a.copy_from(&b).is_err());
        let c = TileGrid::filled(Size::new(2, 2), tile('z'));
        a.copy_from(&c).unwrap();
        assert_eq!(a, c);
    }

    #[test]
    fn test_boxed_corners() {
        let grid = TileGrid::boxed(Size::new(3, 4), BoxStyle::Double, Color::WHITE, Color::BLACK);
        assert_eq!(grid.row_text(0), "╔══╗");
        assert_eq!(grid.row_text(1), "║  ║");
        assert_eq!(grid.row_text(2), "╚══╝");
    }

    #[test]
    fn test_size_fits() {
        let outer = Size::new(10, 10);
        assert!(outer.fits(Size::new(3, 3), Pos::new(7, 7)));
        assert!(!outer.fits(Size::new(3, 3), Pos::new(8, 7)));
        assert!(!outer.fits(Size::new(11, 1), Pos::ORIGIN));
    }

    #[test]
    fn test_pos_checked_add() {
        let p = Pos::new(3, 0);
        assert_eq!(p.checked_add(Delta::new(-3, 2)), Some(Pos::new(0, 2)));
        assert_eq!(p.checked_add(Delta::new(0, -1)), None);
    }
}
