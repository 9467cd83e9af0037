//! Terminal Input Translation
//!
//! Maps crossterm events onto engine events. Keys the engine has no name
//! for are dropped; pointer motion (plain or while dragging) becomes a
//! `PointerMove`. Resizes are handled by the app, not translated.

use crossterm::event::{
    Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode,
    MouseEvent, MouseEventKind,
};
use tessera_core::{Event, Key, MiscInput};

/// Translate one terminal event
pub fn translate(event: &TermEvent) -> Option<Event> {
    match event {
        TermEvent::Key(key) => translate_key(key),
        TermEvent::Mouse(mouse) => translate_mouse(mouse),
        _ => None,
    }
}

fn translate_key(key: &KeyEvent) -> Option<Event> {
    let mapped = map_key_code(key.code)?;
    match key.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => Some(Event::KeyDown(mapped)),
        KeyEventKind::Release => Some(Event::KeyUp(mapped)),
    }
}

fn map_key_code(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Esc => Key::Escape,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Tab => Key::Tab,
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Modifier(ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift) => Key::Shift,
        _ => return None,
    };
    Some(key)
}

fn translate_mouse(mouse: &MouseEvent) -> Option<Event> {
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => {
            Some(Event::MiscInput(MiscInput::PointerMove {
                x: usize::from(mouse.column),
                y: usize::from(mouse.row),
            }))
        }
        _ => None,
    }
}

/// Whether a key press asks to leave the app (Esc or Ctrl-C)
pub fn is_quit(key: &KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    match key.code {
        KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseButton};

    fn key(code: KeyCode, kind: KeyEventKind) -> TermEvent {
        TermEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> TermEvent {
        TermEvent::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_key_press_and_release() {
        assert_eq!(
            translate(&key(KeyCode::Up, KeyEventKind::Press)),
            Some(Event::KeyDown(Key::Up))
        );
        assert_eq!(
            translate(&key(KeyCode::Char('w'), KeyEventKind::Release)),
            Some(Event::KeyUp(Key::Char('w')))
        );
        assert_eq!(
            translate(&key(KeyCode::Char(' '), KeyEventKind::Repeat)),
            Some(Event::KeyDown(Key::Space))
        );
    }

    #[test]
    fn test_unknown_keys_are_dropped() {
        assert_eq!(translate(&key(KeyCode::F(5), KeyEventKind::Press)), None);
        assert_eq!(translate(&key(KeyCode::PageUp, KeyEventKind::Press)), None);
    }

    #[test]
    fn test_pointer_motion_is_column_then_row() {
        assert_eq!(
            translate(&mouse(MouseEventKind::Moved, 12, 4)),
            Some(Event::MiscInput(MiscInput::PointerMove { x: 12, y: 4 }))
        );
        assert_eq!(
            translate(&mouse(MouseEventKind::Drag(MouseButton::Left), 1, 2)),
            Some(Event::MiscInput(MiscInput::PointerMove { x: 1, y: 2 }))
        );
        assert_eq!(translate(&mouse(MouseEventKind::ScrollUp, 1, 2)), None);
        assert_eq!(translate(&TermEvent::Resize(80, 24)), None);
    }

    #[test]
    fn test_quit_keys() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let plain_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);

        assert!(is_quit(&ctrl_c));
        assert!(is_quit(&esc));
        assert!(!is_quit(&plain_c));
    }
}
