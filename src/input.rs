//! Key bindings: arrows plus vim-style hjkl.

use crate::game::Command;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Game(Command),
    Pause,
    Restart,
    Quit,
    None,
}

/// Map key event to an action. Modified keys other than Shift are ignored, except Ctrl+C.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    match code {
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p' | 'P') => Action::Pause,
        KeyCode::Char('r' | 'R') => Action::Restart,
        KeyCode::Left | KeyCode::Char('h') => Action::Game(Command::MoveLeft),
        KeyCode::Right | KeyCode::Char('l') => Action::Game(Command::MoveRight),
        KeyCode::Up | KeyCode::Char('k') => Action::Game(Command::RotateCw),
        KeyCode::Down | KeyCode::Char('j') => Action::Game(Command::SoftDrop),
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_map_to_commands() {
        assert_eq!(key_to_action(key(KeyCode::Left)), Action::Game(Command::MoveLeft));
        assert_eq!(key_to_action(key(KeyCode::Right)), Action::Game(Command::MoveRight));
        assert_eq!(key_to_action(key(KeyCode::Up)), Action::Game(Command::RotateCw));
        assert_eq!(key_to_action(key(KeyCode::Down)), Action::Game(Command::SoftDrop));
    }

    #[test]
    fn vim_keys_match_arrows() {
        for (vim, arrow) in [
            ('h', KeyCode::Left),
            ('l', KeyCode::Right),
            ('k', KeyCode::Up),
            ('j', KeyCode::Down),
        ] {
            assert_eq!(key_to_action(key(KeyCode::Char(vim))), key_to_action(key(arrow)));
        }
    }

    #[test]
    fn control_keys() {
        assert_eq!(key_to_action(key(KeyCode::Esc)), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Char('p'))), Action::Pause);
        assert_eq!(key_to_action(key(KeyCode::Char('r'))), Action::Restart);
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Left, KeyModifiers::ALT)),
            Action::None
        );
    }
}
