//! Symbolic input events.
//!
//! The core consumes discrete symbolic events rather than platform key
//! codes; translating driver-specific input (terminal escape sequences,
//! window-system codes) into these events is the front end's job. No other
//! event affects session state.

/// A discrete input event driving the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Advance one frame.
    StepForward,
    /// Go back one frame.
    StepBackward,
    /// Pointer click at a display coordinate on the composite.
    PointerClick { x: u32, y: u32 },
    /// End the session.
    Quit,
}
