//! Event system: input events, key bindings, document events, input pump.

pub mod binding;
pub mod document;
pub mod input;
pub mod pump;

pub use binding::{BindingAction, KeyBindingRegistry};
pub use document::{DocumentEvent, ListenerId};
pub use input::{InputEvent, Key, KeyEvent, Modifiers, MouseAction, MouseBtn, MouseEvent};
pub use pump::{pump, pump_until_idle, PumpStats};
