//! Focus and hover trackers, and the [`InputContext`] that owns them.
//!
//! The trackers turn document focus and pointer events into component
//! state. Both recompute synchronously inside the event dispatch, so by the
//! time `Document::focus` or `Document::pointer_move` returns, every
//! `focused` / `has_focused` / `hovered` flag and every style binding hanging
//! off them is up to date.

pub mod context;
pub mod focus;
pub mod hover;

pub use context::{InputContext, TrackerConfig};
pub use focus::FocusTracker;
pub use hover::{HoverTracker, HoveredComponents};
