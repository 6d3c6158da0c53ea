//! Terminal input translation.
//!
//! Crossterm key and mouse events are mapped to viewer actions in this one
//! place; the rest of the CLI never sees raw key codes. Mouse clicks carry
//! terminal cell coordinates here - the view loop projects them onto the
//! composite using the preview pane geometry it knows about.

use crossterm::event::{
    Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

/// A viewer-level action decoded from a terminal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    /// Advance one frame.
    StepForward,
    /// Go back one frame.
    StepBackward,
    /// Left click at a terminal cell.
    Click { column: u16, row: u16 },
    /// Toggle between point and rectangle-average query modes.
    ToggleMode,
    /// Write a PNG snapshot of the current composite.
    Snapshot,
    /// Leave the viewer.
    Quit,
}

/// Translate one terminal event, if it maps to an action.
pub fn translate(event: &Event) -> Option<ViewerAction> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Right | KeyCode::Char('n') => Some(ViewerAction::StepForward),
            KeyCode::Left | KeyCode::Char('p') => Some(ViewerAction::StepBackward),
            KeyCode::Char('m') => Some(ViewerAction::ToggleMode),
            KeyCode::Char('s') => Some(ViewerAction::Snapshot),
            KeyCode::Char('q') | KeyCode::Esc => Some(ViewerAction::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(ViewerAction::Quit)
            }
            _ => None,
        },
        Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
            Some(ViewerAction::Click {
                column: mouse.column,
                row: mouse.row,
            })
        }
        _ => None,
    }
}
