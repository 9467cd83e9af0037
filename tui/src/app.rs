//! Main Application
//!
//! The App owns the scene, its terminal compositor and the event
//! dispatcher, and runs them at a fixed tick rate:
//! - Terminal events (keys, pointer, resize) are translated and queued
//! - Every tick runs one dispatcher cycle, then renders
//! - A `Shutdown` service event ends the loop
//!
//! Esc and Ctrl-C do not exit directly. They queue a window `Close`, so the
//! shutdown goes through the same listener path as the menu's Quit item.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{Event as TermEvent, EventStream, KeyCode, KeyEventKind};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use tessera_core::{EngineConfig, EngineError, Event, EventDispatcher, MiscInput, Scene};
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::IntervalStream;

use crate::compositor::TerminalCompositor;
use crate::demo::Demo;
use crate::input;

/// Errors that end the app
#[derive(Debug, Error)]
pub enum AppError {
    /// Drawing to or reading from the terminal failed
    #[error("terminal I/O failed: {0}")]
    Terminal(#[from] io::Error),

    /// The engine rejected an operation
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Main application state
pub struct App {
    /// Widgets and the compositor they are attached to
    scene: Scene<TerminalCompositor>,
    /// Event queue and subscriptions
    dispatcher: EventDispatcher,
    /// Handles into the demo scene
    demo: Demo,
    /// Time between ticks
    tick_interval: Duration,
    /// When the previous tick ran
    last_tick: Instant,
    /// Is the app still running?
    running: bool,
}

impl App {
    /// Create the app for a `width` x `height` terminal
    ///
    /// # Errors
    ///
    /// If the demo scene cannot be built.
    pub fn new(config: EngineConfig, width: u16, height: u16) -> Result<Self, AppError> {
        let tick_interval = config.terminal.tick_interval();
        let mut dispatcher = EventDispatcher::new(&config.dispatcher);
        let compositor = TerminalCompositor::new(Rect::new(0, 0, width, height));
        let mut scene = Scene::with_config(compositor, config);
        let demo = Demo::build(&mut scene, &mut dispatcher)?;

        tracing::info!(
            width,
            height,
            tick = ?tick_interval,
            "App initialized"
        );

        Ok(Self {
            scene,
            dispatcher,
            demo,
            tick_interval,
            last_tick: Instant::now(),
            running: true,
        })
    }

    /// The scene being displayed
    pub fn scene(&self) -> &Scene<TerminalCompositor> {
        &self.scene
    }

    /// Handles into the demo scene
    pub fn demo(&self) -> &Demo {
        &self.demo
    }

    /// Whether the loop should keep going
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Main event loop
    ///
    /// # Errors
    ///
    /// Terminal I/O failures and engine errors from input handling.
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut event_stream = EventStream::new();
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = IntervalStream::new(interval);

        // Render initial frame immediately so the user sees the scene
        self.render(terminal)?;
        self.last_tick = Instant::now();

        while self.running {
            tokio::select! {
                biased;

                maybe_event = event_stream.next() => match maybe_event {
                    Some(Ok(event)) => self.handle_terminal_event(&event)?,
                    Some(Err(error)) => {
                        tracing::warn!(%error, "Terminal event stream error");
                    }
                    None => {
                        tracing::info!("Terminal event stream closed");
                        self.running = false;
                    }
                },

                Some(_) = ticks.next() => {
                    let now = Instant::now();
                    let dt = now.duration_since(self.last_tick);
                    self.last_tick = now;
                    self.tick(dt);
                    self.render(terminal)?;
                }
            }
        }

        tracing::info!("App loop finished");
        Ok(())
    }

    /// Queue one terminal event
    ///
    /// # Errors
    ///
    /// If moving keyboard focus fails.
    pub fn handle_terminal_event(&mut self, event: &TermEvent) -> Result<(), AppError> {
        match event {
            TermEvent::Key(key) if input::is_quit(key) => {
                tracing::info!("Quit requested");
                self.dispatcher.add_event(Event::MiscInput(MiscInput::Close));
                return Ok(());
            }
            TermEvent::Key(key) if key.code == KeyCode::Tab && key.kind == KeyEventKind::Press => {
                self.demo.toggle_focus(&mut self.scene, &mut self.dispatcher)?;
            }
            TermEvent::Resize(width, height) => {
                self.scene
                    .backend_mut()
                    .resize(Rect::new(0, 0, *width, *height));
            }
            _ => {}
        }

        if let Some(event) = input::translate(event) {
            self.dispatcher.add_event(event);
        }
        Ok(())
    }

    /// Run one dispatcher cycle with `dt` elapsed
    pub fn tick(&mut self, dt: Duration) {
        self.dispatcher.run_tick(&mut self.scene, dt);

        if let Err(error) = self.demo.apply_commands(&mut self.scene) {
            tracing::warn!(%error, "Demo command failed");
        }
        // Roots nobody subscribed to the tick boundary still get rebuilt
        self.scene.refresh_all();

        if self.dispatcher.is_shutdown() {
            self.running = false;
        }
    }

    /// Render the composited scene
    ///
    /// # Errors
    ///
    /// If drawing to the terminal fails.
    pub fn render<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let output = self.scene.backend_mut().composite();

        terminal.draw(|frame| {
            let area = frame.area();
            let buf = frame.buffer_mut();

            for y in 0..area.height.min(output.area.height) {
                for x in 0..area.width.min(output.area.width) {
                    if let Some(cell) = output.cell((x, y)) {
                        buf[(x, y)] = cell.clone();
                    }
                }
            }
        })?;

        Ok(())
    }
}
