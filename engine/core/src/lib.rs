//! Tessera Core - Headless Layered Tile Compositing
//!
//! This crate is the engine behind tessera: a tree of tile surfaces that can
//! nest, overlap, scroll and animate, flattened on demand into one grid of
//! characters and colors for whatever display backend is attached.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         Display Backends                          │
//! │   ┌──────────────────────┐        ┌──────────────────────────┐   │
//! │   │  TerminalCompositor  │        │     HeadlessBackend      │   │
//! │   │  (tessera-tui)       │        │     (tests, tooling)     │   │
//! │   └──────────┬───────────┘        └────────────┬─────────────┘   │
//! │              └────────────── DisplayBackend ───┘                 │
//! └──────────────────────────────────┬───────────────────────────────┘
//!                                    │ add / update / remove surface
//! ┌──────────────────────────────────┼───────────────────────────────┐
//! │                           TESSERA CORE                            │
//! │  ┌───────────────────────────────┴─────────────────────────────┐ │
//! │  │                          Scene                               │ │
//! │  │  ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌────────────────┐ │ │
//! │  │  │ Layouts  │ │ Viewport │ │ Animation │ │ Menus, Labels, │ │ │
//! │  │  │          │ │ + Bars   │ │ Playback  │ │ Readouts       │ │ │
//! │  │  └──────────┘ └──────────┘ └───────────┘ └────────────────┘ │ │
//! │  └─────────────────────────────▲───────────────────────────────┘ │
//! │                                │ one event at a time             │
//! │  ┌─────────────────────────────┴───────────────────────────────┐ │
//! │  │            EventDispatcher  (+ Listeners)                    │ │
//! │  └─────────────────────────────────────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Scene`]: arena owning every widget and one display backend
//! - [`TileGrid`]: fixed-size grid of [`Tile`]s, the unit of drawing
//! - [`Animation`]: immutable frames plus frame rate
//! - [`EventDispatcher`]: per-kind subscriptions and the tick cycle
//! - [`EngineConfig`]: widget defaults loaded from TOML and environment
//!
//! # Quick Start
//!
//! ```
//! use std::time::Duration;
//! use tessera_core::{
//!     EventDispatcher, EventKind, HeadlessBackend, Pos, Scene, Size, TileGrid,
//! };
//!
//! let mut scene = Scene::new(HeadlessBackend::new(Size::new(24, 80)));
//! let root = scene.create_layout(TileGrid::blank(Size::new(24, 80)));
//! let label = scene.create_label("hello", Default::default()).unwrap();
//! scene.add_child(root, label, Pos::new(1, 2)).unwrap();
//! scene.attach(root, Pos::ORIGIN, 0).unwrap();
//!
//! let mut dispatcher = EventDispatcher::default();
//! dispatcher.subscribe(root, &[EventKind::Service, EventKind::ContentUpdated]);
//! dispatcher.run_tick(&mut scene, Duration::from_millis(33));
//!
//! assert_eq!(scene.backend().snapshot().row_text(1).trim(), "hello");
//! ```
//!
//! # Module Overview
//!
//! - [`tile`]: colors, tiles, positions and tile grids
//! - [`surface`]: per-widget buffer and placement
//! - [`scene`]: widget arena, ids, redraw propagation, event routing
//! - [`layout`]: child registry and painter's-algorithm compositing
//! - [`viewport`]: scrolling over an oversized backing grid
//! - [`scrollbar`]: scroll position indicators
//! - [`animation`]: frame data and playback
//! - [`switching`]: widgets flipping between named images
//! - [`label`]: justified text and single-line input
//! - [`menu`]: highlightable item lists
//! - [`counters`]: FPS and pointer readouts
//! - [`dispatcher`]: event queue and listeners
//! - [`backend`]: display backend trait and the headless backend
//! - [`config`]: configuration loading
//! - [`error`]: error types
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod backend;
pub mod config;
pub mod counters;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod label;
pub mod layout;
pub mod menu;
pub mod scene;
pub mod scrollbar;
pub mod surface;
pub mod switching;
pub mod tile;
pub mod viewport;

// Re-exports for convenience
pub use animation::{Animation, AnimationState, Playback};
pub use backend::{DisplayBackend, HeadlessBackend, TerminalId};
pub use error::{
    AnimationError, EngineError, LayoutError, Result, ScrollTarget, StateError,
    TypeConstraintError,
};
pub use events::{Event, EventKind, Key, MiscInput, ServiceEvent};
pub use scene::{Renderable, Scene, TileSource, Widget, WidgetId, WidgetKind};
pub use surface::{Parent, Surface};
pub use tile::{BoxStyle, Color, Delta, Pos, Size, Tile, TileGrid};

// Widget exports
pub use counters::{FpsCounterState, PointerPosState};
pub use label::{InputFieldState, Justify, LabelState, LabelStyle};
pub use layout::LayoutState;
pub use menu::{MenuAction, MenuItemState, MenuItemStyle, MenuOptions, MenuState};
pub use scrollbar::{Orientation, ScrollBarState};
pub use switching::SwitchingState;
pub use viewport::{InputScrollState, ScrollBars, ViewportState};

// Dispatcher exports
pub use dispatcher::{ClosingListener, EventDispatcher, Listener, ListenerId, LoggingListener};

// Config exports
pub use config::{
    apply_env, load_config_from_path, load_config_with_env, ConfigError, ConfigOverrides,
    ConfigSource, EngineConfig, EngineToml,
};
