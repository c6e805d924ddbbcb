//! Keyboard shortcut mapping

use crate::domain::Edge;
use crate::session::messages::Command;
use crate::session::state::EditorSession;

/// Keys the editor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Character(char),
    Named(Named),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Named {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Tab,
    Escape,
    Delete,
    Backspace,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub control: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        control: false,
        shift: false,
        alt: false,
    };
    pub const CTRL: Self = Self {
        control: true,
        shift: false,
        alt: false,
    };
    pub const SHIFT: Self = Self {
        control: false,
        shift: true,
        alt: false,
    };

    pub fn control(self) -> bool {
        self.control
    }

    pub fn shift(self) -> bool {
        self.shift
    }
}

/// Arrow nudge multiplier when Shift is held
const FAST_NUDGE: f32 = 10.0;

pub fn handle_key_event(
    session: &EditorSession,
    key: Key,
    modifiers: Modifiers,
) -> Option<Command> {
    let has_selection = !session.selection().is_empty();
    let step = if modifiers.shift() { FAST_NUDGE } else { 1.0 };

    match key {
        // Undo/redo shortcuts
        Key::Character(c)
            if c.eq_ignore_ascii_case(&'z') && modifiers.control() && !modifiers.shift() =>
        {
            Some(Command::undo())
        }
        Key::Character(c)
            if (c.eq_ignore_ascii_case(&'y') && modifiers.control())
                || (c.eq_ignore_ascii_case(&'z') && modifiers.control() && modifiers.shift()) =>
        {
            Some(Command::redo())
        }
        Key::Character(c) if c.eq_ignore_ascii_case(&'a') && modifiers.control() => {
            Some(Command::select_all())
        }
        Key::Named(Named::Escape) => Some(Command::cancel()),
        // Mode switches
        Key::Character('c') if !modifiers.control() => Some(Command::create_mode()),
        Key::Character('v') if !modifiers.control() => Some(Command::select_mode()),
        // Everything below acts on the selection
        _ if !has_selection => None,
        Key::Named(Named::Delete | Named::Backspace) => Some(Command::delete()),
        Key::Named(Named::ArrowLeft) => Some(Command::nudge(-step, 0.0)),
        Key::Named(Named::ArrowRight) => Some(Command::nudge(step, 0.0)),
        Key::Named(Named::ArrowUp) => Some(Command::nudge(0.0, -step)),
        Key::Named(Named::ArrowDown) => Some(Command::nudge(0.0, step)),
        Key::Named(Named::Tab) if modifiers.shift() => Some(Command::cycle_previous()),
        Key::Named(Named::Tab) => Some(Command::cycle_next()),
        // Border toggles
        Key::Character('t') if !modifiers.control() => Some(Command::toggle_edge(Edge::Top)),
        Key::Character('b') if !modifiers.control() => Some(Command::toggle_edge(Edge::Bottom)),
        Key::Character('l') if !modifiers.control() => Some(Command::toggle_edge(Edge::Left)),
        Key::Character('r') if !modifiers.control() => Some(Command::toggle_edge(Edge::Right)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::domain::{Bounds, CellData};

    fn session_with_selection() -> EditorSession {
        let mut session = EditorSession::new(EditorConfig::default());
        let id = session
            .create_cell(&CellData::from_bounds(Bounds::new(0.0, 0.0, 50.0, 50.0)))
            .unwrap();
        session.select(id);
        session
    }

    #[test]
    fn test_undo_redo_keys() {
        let session = EditorSession::new(EditorConfig::default());
        assert_eq!(
            handle_key_event(&session, Key::Character('z'), Modifiers::CTRL),
            Some(Command::undo())
        );
        let ctrl_shift = Modifiers {
            control: true,
            shift: true,
            alt: false,
        };
        assert_eq!(
            handle_key_event(&session, Key::Character('Z'), ctrl_shift),
            Some(Command::redo())
        );
        assert_eq!(
            handle_key_event(&session, Key::Character('y'), Modifiers::CTRL),
            Some(Command::redo())
        );
    }

    #[test]
    fn test_selection_keys_need_selection() {
        let empty = EditorSession::new(EditorConfig::default());
        assert_eq!(
            handle_key_event(&empty, Key::Named(Named::Delete), Modifiers::NONE),
            None
        );
        assert_eq!(
            handle_key_event(&empty, Key::Character('t'), Modifiers::NONE),
            None
        );

        let session = session_with_selection();
        assert_eq!(
            handle_key_event(&session, Key::Named(Named::Backspace), Modifiers::NONE),
            Some(Command::delete())
        );
        assert_eq!(
            handle_key_event(&session, Key::Character('t'), Modifiers::NONE),
            Some(Command::toggle_edge(Edge::Top))
        );
    }

    #[test]
    fn test_arrow_nudge_with_shift() {
        let session = session_with_selection();
        assert_eq!(
            handle_key_event(&session, Key::Named(Named::ArrowLeft), Modifiers::NONE),
            Some(Command::nudge(-1.0, 0.0))
        );
        assert_eq!(
            handle_key_event(&session, Key::Named(Named::ArrowDown), Modifiers::SHIFT),
            Some(Command::nudge(0.0, 10.0))
        );
    }

    #[test]
    fn test_tab_cycles_and_escape_cancels() {
        let session = session_with_selection();
        assert_eq!(
            handle_key_event(&session, Key::Named(Named::Tab), Modifiers::SHIFT),
            Some(Command::cycle_previous())
        );
        assert_eq!(
            handle_key_event(&session, Key::Named(Named::Escape), Modifiers::NONE),
            Some(Command::cancel())
        );
        assert_eq!(
            handle_key_event(&session, Key::Character('c'), Modifiers::NONE),
            Some(Command::create_mode())
        );
    }
}
