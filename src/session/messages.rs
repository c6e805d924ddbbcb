//! Command types executed by the editing session
//!
//! Keyboard shortcuts and host menus produce a [`Command`], which
//! `EditorSession::execute` applies. Sub-enums keep related actions together.

use crate::domain::Edge;
use crate::interaction::EditMode;

// ============================================================================
// Edit Commands
// ============================================================================

/// History-wrapped changes to the selected cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditMsg {
    /// Undo last change
    Undo,
    /// Redo undone change
    Redo,
    /// Remove all selected cells
    Delete,
    /// Move selected cells by a number of nudge steps
    Nudge(f32, f32),
    /// Flip one border flag on the selected cells
    ToggleEdge(Edge),
    /// Show or hide every border of the selected cells
    SetAllEdges(bool),
}

// ============================================================================
// Selection Commands
// ============================================================================

/// Direction of an overlap-group cycle step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleDirection {
    Next,
    Previous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMsg {
    /// Step through the overlap group of the selected cell
    CycleOverlap(CycleDirection),
    SelectAll,
    Clear,
}

// ============================================================================
// Top-level Command
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Edit(EditMsg),
    Selection(SelectionMsg),
    /// Switch between select and create mode
    SetMode(EditMode),
    /// Abort the active gesture, or clear the selection when idle
    Cancel,
}

impl Command {
    pub fn undo() -> Self {
        Self::Edit(EditMsg::Undo)
    }

    pub fn redo() -> Self {
        Self::Edit(EditMsg::Redo)
    }

    pub fn delete() -> Self {
        Self::Edit(EditMsg::Delete)
    }

    pub fn nudge(dx: f32, dy: f32) -> Self {
        Self::Edit(EditMsg::Nudge(dx, dy))
    }

    pub fn toggle_edge(edge: Edge) -> Self {
        Self::Edit(EditMsg::ToggleEdge(edge))
    }

    pub fn set_all_edges(visible: bool) -> Self {
        Self::Edit(EditMsg::SetAllEdges(visible))
    }

    pub fn cycle_next() -> Self {
        Self::Selection(SelectionMsg::CycleOverlap(CycleDirection::Next))
    }

    pub fn cycle_previous() -> Self {
        Self::Selection(SelectionMsg::CycleOverlap(CycleDirection::Previous))
    }

    pub fn select_all() -> Self {
        Self::Selection(SelectionMsg::SelectAll)
    }

    pub fn clear_selection() -> Self {
        Self::Selection(SelectionMsg::Clear)
    }

    pub fn select_mode() -> Self {
        Self::SetMode(EditMode::Select)
    }

    pub fn create_mode() -> Self {
        Self::SetMode(EditMode::Create)
    }

    pub fn cancel() -> Self {
        Self::Cancel
    }
}
