//! # gilt-state
//!
//! Reactive state cells, declarative style binding, and focus/hover ancestry
//! tracking for gilt-tui element trees.
//!
//! Everything here is single-threaded and synchronous: a state change, the
//! class-list reconciliation it drives, and any focus or hover propagation
//! all finish before the triggering call returns.
//!
//! ## Core Systems
//!
//! - **[`reactive`]**: `State` / `ReadState` value cells, derived views,
//!   owners and subscriptions
//! - **[`dom`]**: slotmap element arena, hit-testing, focus chain, and the
//!   shared `Document`
//! - **[`component`]**: logical components and their capability traits
//! - **[`style`]**: style tag sheet, `StyleBinder`, raw class lists
//! - **[`tracker`]**: focus and hover trackers behind one `InputContext`
//! - **[`event`]**: input events (from crossterm), key bindings, document
//!   events, the async input pump
//! - **[`geometry`]**: Offset and Region primitives
//!
//! ## Example
//!
//! ```
//! use gilt_state::component::Component;
//! use gilt_state::dom::{Document, NodeData};
//! use gilt_state::reactive::State;
//! use gilt_state::style::StyleSheet;
//! use gilt_state::tracker::{InputContext, TrackerConfig};
//!
//! let doc = Document::new();
//! doc.set_style_sheet(StyleSheet::new().define("focus-ring", &["ring", "ring-accent"]));
//! let root = doc.insert_root(NodeData::new("Form"));
//! let input = doc.insert_child(root, NodeData::new("Input").editable(true)).unwrap();
//!
//! let form = Component::attach(&doc, root).unwrap();
//! Component::attach(&doc, input).unwrap();
//! form.style().bind(form.has_focused(), &["focus-ring"]);
//! let ctx = InputContext::listen(&doc, TrackerConfig::default()).unwrap();
//!
//! doc.focus(input);
//! assert!(form.classes().contains("ring"));
//! assert_eq!(ctx.focus().focused(), Some(input));
//!
//! let count = State::new(1);
//! let doubled = count.map(|n| n * 2);
//! count.set(4);
//! assert_eq!(doubled.get(), 8);
//! ```

// Foundation
pub mod error;
pub mod geometry;

// Reactivity
pub mod reactive;

// Element tree
pub mod component;
pub mod dom;
pub mod style;

// Input
pub mod event;
pub mod tracker;

pub use error::{BoxError, CallbackError, Error};
