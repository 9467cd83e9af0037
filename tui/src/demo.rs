//! Demo Scene
//!
//! A small showcase wired onto any display backend: a framed panel with a
//! spinner and a day/night badge, a menu driving them, a scrollable text
//! area with bars, and FPS and pointer readouts along the top row.
//!
//! Menu actions emit `Custom` events named `demo.*`. A [`CommandListener`]
//! collects them and [`Demo::apply_commands`] carries them out between
//! ticks, since listeners cannot touch the scene themselves.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tessera_core::{
    BoxStyle, ClosingListener, DisplayBackend, Event, EventDispatcher, EventKind, Justify,
    LabelStyle, Listener, LoggingListener, MenuItemStyle, MenuOptions, MiscInput, Pos, Result,
    Scene, ScrollBars, Size, Tile, TileGrid, WidgetId,
};

use crate::theme;

/// Start the spinner
pub const CMD_START: &str = "demo.start";
/// Stop the spinner
pub const CMD_STOP: &str = "demo.stop";
/// Flip the badge between day and night
pub const CMD_THEME: &str = "demo.theme";

const PANEL_SIZE: Size = Size::new(7, 30);
const SCROLL_VIEW: Size = Size::new(8, 28);
const SCROLL_LINES: usize = 40;
const SCROLL_WIDTH: usize = 48;

/// Which widget receives arrow keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// The menu
    Menu,
    /// The scrollable text area
    Scroller,
}

impl Focus {
    fn label(self) -> &'static str {
        match self {
            Self::Menu => "focus: menu    (tab)",
            Self::Scroller => "focus: text    (tab)",
        }
    }
}

// ============================================================================
// Command Listener
// ============================================================================

/// Collects `demo.*` custom events for the app to act on
#[derive(Debug, Clone, Default)]
pub struct CommandListener {
    pending: Rc<RefCell<VecDeque<String>>>,
}

impl CommandListener {
    /// A listener writing into `pending`
    pub fn new(pending: Rc<RefCell<VecDeque<String>>>) -> Self {
        Self { pending }
    }
}

impl Listener for CommandListener {
    fn on_event(&mut self, event: &Event) -> Vec<Event> {
        if let Event::Custom { name, .. } = event {
            if name.starts_with("demo.") {
                self.pending.borrow_mut().push_back(name.clone());
            }
        }
        Vec::new()
    }
}

// ============================================================================
// Demo
// ============================================================================

/// Handles to the demo's widgets
#[derive(Debug)]
pub struct Demo {
    /// Framed panel holding title, spinner, badge and status
    pub panel: WidgetId,
    /// Cycling spinner animation
    pub spinner: WidgetId,
    /// Day/night switching badge
    pub badge: WidgetId,
    /// Focus hint inside the panel
    pub status: WidgetId,
    /// The main menu
    pub menu: WidgetId,
    /// Scrollable text area with bars
    pub scroller: WidgetId,
    /// FPS readout
    pub fps: WidgetId,
    /// Pointer readout
    pub pointer: WidgetId,
    focus: Focus,
    night: bool,
    commands: Rc<RefCell<VecDeque<String>>>,
}

impl Demo {
    /// Build the demo scene, attach it and subscribe everything
    ///
    /// # Errors
    ///
    /// Whatever widget construction fails with; the layout is fixed, so
    /// this only happens if the engine's own invariants are broken.
    pub fn build<B: DisplayBackend>(
        scene: &mut Scene<B>,
        dispatcher: &mut EventDispatcher,
    ) -> Result<Self> {
        let (panel, spinner, badge, status) = build_panel(scene)?;
        let menu = build_menu(scene)?;
        let scroller = scene.create_input_scrollable(
            scroll_text(),
            Pos::ORIGIN,
            SCROLL_VIEW,
            ScrollBars::BOTH,
        )?;
        let fps = scene.create_fps_counter(theme::DIM, theme::PANEL_BG)?;
        let pointer = scene.create_pointer_pos(theme::DIM, theme::PANEL_BG)?;

        scene.attach(menu, Pos::new(1, 2), 10)?;
        scene.attach(panel, Pos::new(1, 22), 5)?;
        scene.attach(scroller, Pos::new(9, 22), 5)?;
        scene.attach(fps, Pos::new(0, 2), 20)?;
        scene.attach(pointer, Pos::new(0, 8), 20)?;

        dispatcher.subscribe_all(menu);
        dispatcher.subscribe(spinner, &[EventKind::Tick]);
        dispatcher.subscribe(panel, &[EventKind::Service, EventKind::ContentUpdated]);
        dispatcher.subscribe(scroller, &[EventKind::Service, EventKind::ContentUpdated]);
        dispatcher.subscribe(fps, &[EventKind::Tick]);
        dispatcher.subscribe(pointer, &[EventKind::MiscInput]);

        let commands = Rc::new(RefCell::new(VecDeque::new()));
        dispatcher.add_listener(
            Box::new(CommandListener::new(Rc::clone(&commands))),
            &[EventKind::Custom],
        );
        dispatcher.add_listener(Box::new(ClosingListener::new()), &ClosingListener::KINDS);
        dispatcher.add_listener(
            Box::new(LoggingListener::new()),
            &[EventKind::Custom, EventKind::PlaySound],
        );

        tracing::info!(widgets = scene.len(), "Demo scene built");

        Ok(Self {
            panel,
            spinner,
            badge,
            status,
            menu,
            scroller,
            fps,
            pointer,
            focus: Focus::Menu,
            night: false,
            commands,
        })
    }

    /// Which widget currently receives arrow keys
    pub const fn focus(&self) -> Focus {
        self.focus
    }

    /// Move keyboard focus to the other widget
    ///
    /// # Errors
    ///
    /// If the status label cannot be rewritten.
    pub fn toggle_focus<B: DisplayBackend>(
        &mut self,
        scene: &mut Scene<B>,
        dispatcher: &mut EventDispatcher,
    ) -> Result<()> {
        self.focus = match self.focus {
            Focus::Menu => {
                dispatcher.unsubscribe(self.menu, &[EventKind::KeyDown]);
                dispatcher.subscribe(self.scroller, &[EventKind::KeyDown]);
                Focus::Scroller
            }
            Focus::Scroller => {
                dispatcher.unsubscribe(self.scroller, &[EventKind::KeyDown]);
                dispatcher.subscribe(self.menu, &[EventKind::KeyDown]);
                Focus::Menu
            }
        };
        tracing::debug!(focus = ?self.focus, "Focus moved");
        scene.set_label_text(self.status, self.focus.label())
    }

    /// Carry out the menu commands collected since the last call
    ///
    /// Returns how many were applied.
    ///
    /// # Errors
    ///
    /// The first failing command's error; later commands stay queued.
    pub fn apply_commands<B: DisplayBackend>(&mut self, scene: &mut Scene<B>) -> Result<usize> {
        let mut applied = 0;
        loop {
            let Some(command) = self.commands.borrow_mut().pop_front() else {
                break;
            };
            match command.as_str() {
                CMD_START => scene.start_animation(self.spinner)?,
                CMD_STOP => scene.stop_animation(self.spinner)?,
                CMD_THEME => {
                    self.night = !self.night;
                    let image = if self.night { "night" } else { "day" };
                    scene.switch_to_image(self.badge, image)?;
                }
                other => tracing::warn!(command = other, "Unknown demo command"),
            }
            applied += 1;
        }
        Ok(applied)
    }
}

// ============================================================================
// Construction
// ============================================================================

fn build_panel<B: DisplayBackend>(
    scene: &mut Scene<B>,
) -> Result<(WidgetId, WidgetId, WidgetId, WidgetId)> {
    let frame = TileGrid::boxed(PANEL_SIZE, BoxStyle::Single, theme::PANEL_FRAME, theme::PANEL_BG);
    let panel = scene.create_layout(frame);

    let title = scene.create_label(
        "tessera",
        LabelStyle {
            fg: theme::TITLE,
            bg: theme::PANEL_BG,
            ..LabelStyle::default()
        },
    )?;

    let glyphs: Vec<TileGrid> = ['|', '/', '-', '\\']
        .into_iter()
        .map(|ch| TileGrid::filled(Size::new(1, 1), Tile::new(ch, theme::ACCENT, theme::PANEL_BG)))
        .collect();
    let spin = scene.default_animation(glyphs)?;
    let spinner = scene.create_animation(spin, true);

    let badge = scene.create_switching(
        vec![
            (
                "day".to_string(),
                TileGrid::from_lines(&[" day "], theme::TITLE, theme::PANEL_BG),
            ),
            (
                "night".to_string(),
                TileGrid::from_lines(&["night"], theme::NIGHT, theme::PANEL_BG),
            ),
        ],
        "day",
    )?;

    let status = scene.create_label(
        Focus::Menu.label(),
        LabelStyle {
            size: Some(Size::new(1, PANEL_SIZE.width - 4)),
            justify: Justify::Left,
            fg: theme::DIM,
            bg: theme::PANEL_BG,
        },
    )?;

    scene.add_child(panel, title, Pos::new(1, 2))?;
    scene.add_child(panel, spinner, Pos::new(3, 2))?;
    scene.add_child(panel, badge, Pos::new(3, 4))?;
    scene.add_child(panel, status, Pos::new(5, 2))?;
    Ok((panel, spinner, badge, status))
}

fn build_menu<B: DisplayBackend>(scene: &mut Scene<B>) -> Result<WidgetId> {
    let style = MenuItemStyle {
        color: theme::TEXT,
        highlight_color: theme::HIGHLIGHT,
        bg: theme::PANEL_BG,
    };
    let items = [
        scene.create_menu_item("Start spinner", Box::new(|| vec![Event::custom(CMD_START)]), style),
        scene.create_menu_item("Stop spinner", Box::new(|| vec![Event::custom(CMD_STOP)]), style),
        scene.create_menu_item("Toggle theme", Box::new(|| vec![Event::custom(CMD_THEME)]), style),
        scene.create_menu_item(
            "Quit",
            Box::new(|| vec![Event::MiscInput(MiscInput::Close)]),
            style,
        ),
    ];
    scene.create_menu(
        &items,
        MenuOptions {
            header: Some("Demo".to_string()),
            color: Some(theme::PANEL_FRAME),
            bg: Some(theme::PANEL_BG),
            switch_sound: Some("switch".to_string()),
            activate_sound: Some("activate".to_string()),
            input_delay: None,
        },
    )
}

/// Numbered filler lines, wider and taller than the view
fn scroll_text() -> TileGrid {
    let lines: Vec<String> = (0..SCROLL_LINES)
        .map(|n| {
            let line = format!("{n:02} the quick brown fox jumps over the lazy dog");
            format!("{line:<width$}", width = SCROLL_WIDTH)
        })
        .collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    TileGrid::from_lines(&refs, theme::TEXT, theme::PANEL_BG)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tessera_core::{HeadlessBackend, Key};

    fn setup() -> (Scene<HeadlessBackend>, EventDispatcher, Demo) {
        let mut scene = Scene::new(HeadlessBackend::new(Size::new(24, 80)));
        let mut dispatcher = EventDispatcher::default();
        let demo = Demo::build(&mut scene, &mut dispatcher).unwrap();
        (scene, dispatcher, demo)
    }

    fn press(dispatcher: &mut EventDispatcher, scene: &mut Scene<HeadlessBackend>, key: Key) {
        dispatcher.add_event(Event::KeyDown(key));
        // longer than the menu's input delay
        dispatcher.run_tick(scene, Duration::from_millis(250));
    }

    #[test]
    fn test_build_attaches_top_level_widgets() {
        let (scene, _, demo) = setup();
        for id in [demo.menu, demo.panel, demo.scroller, demo.fps, demo.pointer] {
            assert!(scene.backend().contains(id));
        }
        assert_eq!(scene.current_highlight(demo.menu).unwrap(), 1);
        assert_eq!(demo.focus(), Focus::Menu);
    }

    #[test]
    fn test_menu_stop_command_stops_spinner() {
        let (mut scene, mut dispatcher, mut demo) = setup();
        press(&mut dispatcher, &mut scene, Key::Down);
        assert_eq!(scene.current_highlight(demo.menu).unwrap(), 2);

        dispatcher.run_tick(&mut scene, Duration::from_millis(250));
        press(&mut dispatcher, &mut scene, Key::Enter);
        assert_eq!(demo.apply_commands(&mut scene).unwrap(), 1);
        assert!(!scene.animation_playback(demo.spinner).unwrap().running());
    }

    #[test]
    fn test_tab_moves_arrow_keys_to_scroller() {
        let (mut scene, mut dispatcher, mut demo) = setup();
        demo.toggle_focus(&mut scene, &mut dispatcher).unwrap();
        assert_eq!(demo.focus(), Focus::Scroller);
        assert_eq!(scene.text(demo.status).unwrap().trim_end(), "focus: text    (tab)");

        press(&mut dispatcher, &mut scene, Key::Down);
        assert_eq!(scene.view_pos(demo.scroller).unwrap(), Pos::new(1, 0));
        assert_eq!(scene.current_highlight(demo.menu).unwrap(), 1);

        demo.toggle_focus(&mut scene, &mut dispatcher).unwrap();
        press(&mut dispatcher, &mut scene, Key::Down);
        assert_eq!(scene.view_pos(demo.scroller).unwrap(), Pos::new(1, 0));
        assert_eq!(scene.current_highlight(demo.menu).unwrap(), 2);
    }

    #[test]
    fn test_theme_command_switches_badge() {
        let (mut scene, _, mut demo) = setup();
        demo.commands.borrow_mut().push_back(CMD_THEME.to_string());
        demo.apply_commands(&mut scene).unwrap();
        assert_eq!(scene.tiles(demo.badge).unwrap().row_text(0), "night");
    }

    #[test]
    fn test_quit_item_shuts_down() {
        let (mut scene, mut dispatcher, demo) = setup();
        for _ in 0..3 {
            press(&mut dispatcher, &mut scene, Key::Down);
        }
        assert_eq!(scene.current_highlight(demo.menu).unwrap(), 4);

        dispatcher.run_tick(&mut scene, Duration::from_millis(250));
        press(&mut dispatcher, &mut scene, Key::Enter);
        assert!(!dispatcher.is_shutdown());
        dispatcher.run_tick(&mut scene, Duration::from_millis(33));
        dispatcher.run_tick(&mut scene, Duration::from_millis(33));
        assert!(dispatcher.is_shutdown());
    }
}
