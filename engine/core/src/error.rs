//! Error Types
//!
//! Every fallible engine operation either applies completely or fails before
//! touching any state. Errors are split by what went wrong:
//!
//! - [`LayoutError`]: the widget tree would become malformed (child too large,
//!   out of bounds, duplicate, self-containment, bad view geometry)
//! - [`StateError`]: a request names a state the widget cannot be in (scroll
//!   target, highlight index, unknown animation or image key)
//! - [`TypeConstraintError`]: a back-reference or callback has the wrong kind
//! - [`AnimationError`]: an [`Animation`](crate::Animation) cannot be built
//!
//! [`EngineError`] wraps all of them so scene operations can share one
//! `Result` type.

use thiserror::Error;

use crate::backend::TerminalId;
use crate::scene::WidgetId;
use crate::surface::Parent;
use crate::tile::{Pos, Size};

// =============================================================================
// Structural Errors
// =============================================================================

/// The widget tree would become malformed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// No widget with this id exists in the scene
    #[error("unknown widget {0}")]
    UnknownWidget(WidgetId),

    /// The child is already a member of this layout
    #[error("{child} is already a child of {layout}")]
    DuplicateChild {
        /// The layout
        layout: WidgetId,
        /// The child
        child: WidgetId,
    },

    /// The child already has a parent layout
    #[error("{child} already belongs to {parent}")]
    AlreadyParented {
        /// The child
        child: WidgetId,
        /// Its current parent
        parent: Parent,
    },

    /// The child is larger than the layout in at least one dimension
    #[error("{child} ({child_size}) does not fit inside {layout} ({layout_size})")]
    ChildTooLarge {
        /// The layout
        layout: WidgetId,
        /// Layout dimensions
        layout_size: Size,
        /// The child
        child: WidgetId,
        /// Child dimensions
        child_size: Size,
    },

    /// The child rectangle would leave the layout
    #[error("{child} at {pos} exceeds the bounds of {layout} ({layout_size})")]
    OutOfBounds {
        /// The layout
        layout: WidgetId,
        /// Layout dimensions
        layout_size: Size,
        /// The child
        child: WidgetId,
        /// Requested offset
        pos: Pos,
    },

    /// The layout would contain itself, directly or through a descendant
    #[error("{0} cannot be placed inside itself")]
    SelfContainment(WidgetId),

    /// The widget is not a member of the layout
    #[error("{child} is not a child of {layout}")]
    NotAChild {
        /// The layout
        layout: WidgetId,
        /// The widget that was expected to be a child
        child: WidgetId,
    },

    /// Layout operation on a widget that cannot hold children
    #[error("{0} is not a layout")]
    NotALayout(WidgetId),

    /// The widget is not a top-level surface of the backend
    #[error("{0} is not attached to the backend")]
    NotAttached(WidgetId),

    /// The background may be replaced but never removed or moved
    #[error("the background of {0} cannot be removed or moved")]
    BackgroundFixed(WidgetId),

    /// A replacement background must cover the whole layout
    #[error("background for {layout} must be {expected}, got {found}")]
    BackgroundSize {
        /// The layout
        layout: WidgetId,
        /// Required size
        expected: Size,
        /// Offered size
        found: Size,
    },

    /// View size must be non-zero and no larger than the backing buffer
    #[error("view size {view} is invalid for backing buffer {backing}")]
    InvalidViewSize {
        /// Requested view size
        view: Size,
        /// Backing buffer size
        backing: Size,
    },

    /// A rectangle extends past the grid it is taken from
    #[error("region {size} at {origin} exceeds {bounds}")]
    RegionOutOfBounds {
        /// Top-left corner
        origin: Pos,
        /// Region size
        size: Size,
        /// Size of the grid being read
        bounds: Size,
    },

    /// Rows of a tile grid differ in length
    #[error("tile rows have different lengths")]
    RaggedGrid,

    /// Two grids that must match in shape do not
    #[error("shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch {
        /// Required size
        expected: Size,
        /// Offered size
        found: Size,
    },

    /// A menu needs at least one item
    #[error("a menu needs at least one item")]
    EmptyMenu,

    /// Menu items are fixed once the menu is built
    #[error("the items of menu {0} cannot be added or removed")]
    FixedChildren(WidgetId),

    /// The header label is wider than the menu interior
    #[error("menu header is {len} characters, at most {max} fit")]
    HeaderTooLong {
        /// Header length in characters
        len: usize,
        /// Maximum allowed length
        max: usize,
    },
}

// =============================================================================
// State Errors
// =============================================================================

/// A widget was asked to enter a state it cannot be in
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StateError {
    /// The requested view would leave the backing buffer
    #[error("cannot scroll {viewport} to {target}: view {view} must stay inside {backing}")]
    ScrollOutOfBounds {
        /// The viewport
        viewport: WidgetId,
        /// Requested position or relative move
        target: ScrollTarget,
        /// View size
        view: Size,
        /// Backing buffer size
        backing: Size,
    },

    /// Highlight index outside the navigable range
    #[error("highlight index {index} outside navigable range {min}..={max}")]
    InvalidHighlight {
        /// Requested index
        index: usize,
        /// First navigable child index
        min: usize,
        /// Last navigable child index
        max: usize,
    },

    /// No animation registered under this name
    #[error("unknown animation '{0}'")]
    UnknownAnimation(String),

    /// No image registered under this name
    #[error("unknown image '{0}'")]
    UnknownImage(String),

    /// Text does not fit in the fixed label area
    #[error("text needs {needed} rows but only {available} are available")]
    TextOverflow {
        /// Rows the wrapped text occupies
        needed: usize,
        /// Rows in the label
        available: usize,
    },

    /// A ratio argument outside `[0, 1]`
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidRatio {
        /// Argument name
        name: &'static str,
        /// Offered value
        value: f64,
    },

    /// The operation applies to a different widget kind
    #[error("{id} is not a {expected}")]
    WrongKind {
        /// The widget
        id: WidgetId,
        /// Kind the operation needs
        expected: &'static str,
    },
}

/// Where a rejected scroll was headed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    /// An absolute position
    Pos(Pos),
    /// A relative move that would go negative
    Delta {
        /// Row delta
        rows: isize,
        /// Column delta
        cols: isize,
    },
}

impl std::fmt::Display for ScrollTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pos(pos) => write!(f, "{pos}"),
            Self::Delta { rows, cols } => write!(f, "delta ({rows}, {cols})"),
        }
    }
}

// =============================================================================
// Type Constraint Errors
// =============================================================================

/// A back-reference or callback of the wrong kind was assigned
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeConstraintError {
    /// Only the scene's own backend may be set as `terminal`
    #[error("{0} is not the backend of this scene")]
    UnknownTerminal(TerminalId),

    /// Only a layout-like widget may be set as `parent`
    #[error("{0} cannot be a parent: it is not a layout")]
    InvalidParent(WidgetId),

    /// Menus can only be built from menu items
    #[error("{0} is not a menu item")]
    NotAMenuItem(WidgetId),
}

// =============================================================================
// Animation Errors
// =============================================================================

/// An animation could not be constructed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnimationError {
    /// An animation needs at least one frame
    #[error("an animation needs at least one frame")]
    Empty,

    /// Every frame must have the shape of the first
    #[error("frame {index} is {found}, expected {expected}")]
    ShapeMismatch {
        /// Offending frame index
        index: usize,
        /// Shape of frame 0
        expected: Size,
        /// Shape of the offending frame
        found: Size,
    },

    /// Frame rate must be finite and positive
    #[error("invalid frame rate {0}")]
    InvalidFrameRate(f64),
}

// =============================================================================
// Engine Error
// =============================================================================

/// Any error a scene operation can return
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Structural error
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// Invalid state transition
    #[error(transparent)]
    State(#[from] StateError),

    /// Wrong back-reference kind
    #[error(transparent)]
    TypeConstraint(#[from] TypeConstraintError),

    /// Bad animation data
    #[error(transparent)]
    Animation(#[from] AnimationError),
}

/// Result type for engine operations
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
