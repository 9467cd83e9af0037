//! Tessera TUI - Terminal surface for the tessera compositor
//!
//! This crate puts a [`tessera_core::Scene`] on a real terminal and ships a
//! small demo binary, `tessera-demo`.
//!
//! # Architecture
//!
//! - **Compositor**: [`TerminalCompositor`], the display backend that
//!   flattens top-level surfaces into a ratatui buffer by z-level
//! - **Input**: crossterm key and pointer events mapped to engine events
//! - **App**: fixed-rate tokio loop driving the event dispatcher
//! - **Demo**: the showcase scene (menu, spinner, scroller, readouts)

pub mod app;
pub mod compositor;
pub mod demo;
pub mod input;
pub mod theme;

pub use app::{App, AppError};
pub use compositor::TerminalCompositor;
