//! Terminal UI for the interactive viewer.
//!
//! - `preview` - half-block rendering of the composite into terminal cells
//! - `hud` - status pane: frame position, cache usage, selection, result

pub mod hud;
pub mod preview;

pub use hud::{HudModel, HudWidget};
pub use preview::PreviewWidget;
