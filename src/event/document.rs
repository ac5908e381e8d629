//! Events a [`Document`](crate::dom::Document) dispatches to its listeners.
//!
//! Listeners are invoked after the document has released every internal
//! borrow, so a listener may freely read or mutate the document (including
//! moving focus, which dispatches again).

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::dom::node::NodeId;
use crate::geometry::Offset;

/// A focus or pointer change on the element tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
    /// The element received focus (or its focus visibility changed).
    FocusIn(NodeId),
    /// The element lost focus.
    FocusOut(NodeId),
    /// The pointer moved, or the tree under it changed. `None` means the
    /// pointer left the document.
    PointerMove(Option<Offset>),
}

impl DocumentEvent {
    /// Whether this is a focus-in or focus-out event.
    pub fn is_focus(&self) -> bool {
        matches!(self, DocumentEvent::FocusIn(_) | DocumentEvent::FocusOut(_))
    }
}

static NEXT_LISTENER: AtomicU64 = AtomicU64::new(1);

/// Handle identifying one registered document listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn next() -> Self {
        Self(NEXT_LISTENER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// A registered document listener.
pub(crate) type DocumentListener = Rc<dyn Fn(&DocumentEvent)>;
