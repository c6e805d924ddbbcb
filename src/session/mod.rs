//! Editing session management
//!
//! This module contains:
//! - Session state and the history-wrapped mutation API
//! - Bounded undo/redo history
//! - Command types executed by the session
//! - Keyboard shortcut mapping

pub mod history;
pub mod messages;
pub mod shortcuts;
pub mod state;

pub use history::{History, HistoryMode};
pub use messages::{Command, CycleDirection, EditMsg, SelectionMsg};
pub use shortcuts::{Key, Modifiers, Named, handle_key_event};
pub use state::EditorSession;
