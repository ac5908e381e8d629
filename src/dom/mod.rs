//! Element tree: slotmap-backed arena, queries, hit-testing, focus chain,
//! and the shared [`Document`] handle.

pub mod document;
pub mod focus;
pub mod node;
pub mod query;
pub mod tree;

pub use document::{Document, FocusOrigin, WeakDocument};
pub use focus::FocusChain;
pub use node::{NodeData, NodeId};
pub use tree::Dom;
