//! Style tags, class binding, and inline properties.
//!
//! - [`StyleSheet`]: tag → class-name registry.
//! - [`StyleBinder`]: per-element active tag set, state bindings, inline
//!   properties.
//! - [`ClassList`]: raw class-name manipulation.

pub mod binder;
pub mod class_list;
pub mod sheet;

pub use binder::StyleBinder;
pub use class_list::ClassList;
pub use sheet::{ParseError, StyleSheet};
