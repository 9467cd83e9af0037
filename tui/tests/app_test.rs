//! App Integration Tests
//!
//! Drives the demo app headlessly: terminal events go in through
//! `handle_terminal_event`, ticks are run by hand and frames are rendered
//! into ratatui's `TestBackend`.

use std::time::Duration;

use crossterm::event::{Event as TermEvent, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use pretty_assertions::assert_eq;
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use tessera_core::{EngineConfig, Pos};
use tessera_tui::demo::Focus;
use tessera_tui::App;

fn app() -> App {
    App::new(EngineConfig::default(), 80, 24).unwrap()
}

fn key(code: KeyCode) -> TermEvent {
    TermEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn row_text(terminal: &Terminal<TestBackend>, y: u16) -> String {
    let buffer = terminal.backend().buffer();
    (0..buffer.area.width)
        .map(|x| buffer[(x, y)].symbol().to_string())
        .collect()
}

#[test]
fn test_first_frame_shows_demo() {
    let mut app = app();
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    app.render(&mut terminal).unwrap();

    // menu header centered in its top border
    assert!(row_text(&terminal, 1).contains("Demo"));
    // panel title
    assert!(row_text(&terminal, 2).contains("tessera"));
    // fps readout starts at its initial value
    assert_eq!(&row_text(&terminal, 0)[2..5], "030");
}

#[test]
fn test_pointer_motion_updates_readout() {
    let mut app = app();
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

    app.handle_terminal_event(&TermEvent::Mouse(MouseEvent {
        kind: MouseEventKind::Moved,
        column: 42,
        row: 7,
        modifiers: KeyModifiers::NONE,
    }))
    .unwrap();
    app.tick(Duration::from_millis(33));
    app.render(&mut terminal).unwrap();

    assert_eq!(&row_text(&terminal, 0)[8..15], "042x007");
}

#[test]
fn test_tab_then_arrows_scroll_text() {
    let mut app = app();
    app.handle_terminal_event(&key(KeyCode::Tab)).unwrap();
    assert_eq!(app.demo().focus(), Focus::Scroller);

    app.handle_terminal_event(&key(KeyCode::Down)).unwrap();
    app.handle_terminal_event(&key(KeyCode::Right)).unwrap();
    app.tick(Duration::from_millis(33));

    let scroller = app.demo().scroller;
    assert_eq!(app.scene().view_pos(scroller).unwrap(), Pos::new(1, 1));
}

#[test]
fn test_escape_shuts_down_after_countdown() {
    let mut app = app();
    app.handle_terminal_event(&key(KeyCode::Esc)).unwrap();
    app.tick(Duration::from_millis(33));
    assert!(app.is_running());

    app.tick(Duration::from_millis(33));
    assert!(!app.is_running());
}

#[test]
fn test_resize_clips_to_new_area() {
    let mut app = app();
    app.handle_terminal_event(&TermEvent::Resize(20, 5)).unwrap();

    let mut terminal = Terminal::new(TestBackend::new(20, 5)).unwrap();
    app.render(&mut terminal).unwrap();
    assert_eq!(app.scene().backend().area().width, 20);
    assert!(row_text(&terminal, 1).contains("Demo"));
}
