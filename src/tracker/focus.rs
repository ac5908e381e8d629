//! Focus ancestry tracking.
//!
//! [`FocusTracker`] follows the element holding *visible* focus and mirrors
//! it into component state: the leaf's `focused` flag, and `has_focused` on
//! every component from the leaf up to the root. Each update recomputes from
//! the document (focus-in and focus-out are treated alike) and costs
//! O(depth).

use std::cell::{Cell, RefCell};

use crate::component::Component;
use crate::dom::{Document, NodeId, WeakDocument};
use crate::reactive::{ReadState, State};

#[derive(Debug, Clone)]
struct Focused {
    element: NodeId,
    component: Option<Component>,
    /// Components whose `has_focused` this focus raised, leaf first.
    chain: Vec<Component>,
}

/// Tracks the visibly focused element and its ancestor components.
#[derive(Debug)]
pub struct FocusTracker {
    document: WeakDocument,
    last: RefCell<Option<Focused>>,
    has_focus: State<bool>,
    clear_fragment: bool,
    updating: Cell<bool>,
    pending: Cell<bool>,
}

impl FocusTracker {
    pub(crate) fn new(document: &Document, clear_fragment: bool) -> Self {
        Self {
            document: document.downgrade(),
            last: RefCell::new(None),
            has_focus: State::new(false),
            clear_fragment,
            updating: Cell::new(false),
            pending: Cell::new(false),
        }
    }

    /// The element holding visible focus, as of the last update.
    pub fn focused(&self) -> Option<NodeId> {
        self.last.borrow().as_ref().map(|f| f.element)
    }

    /// The component attached to the focused element.
    pub fn focused_component(&self) -> Option<Component> {
        self.last.borrow().as_ref().and_then(|f| f.component.clone())
    }

    /// `true` while any element holds visible focus.
    pub fn has_focus(&self) -> &ReadState<bool> {
        &self.has_focus
    }

    /// Recompute from the document.
    ///
    /// Calls made while an update is running (a subscriber moved focus) are
    /// queued and replayed once the running update returns.
    pub fn update(&self) {
        if self.updating.replace(true) {
            self.pending.set(true);
            tracing::trace!("focus update queued");
            return;
        }
        loop {
            self.pending.set(false);
            match self.document.upgrade() {
                Some(document) => self.recompute(&document),
                None => tracing::debug!("document dropped; focus tracker idle"),
            }
            if !self.pending.get() {
                break;
            }
        }
        self.updating.set(false);
    }

    fn recompute(&self, document: &Document) {
        if self.clear_fragment {
            clear_stale_fragment(document);
        }

        let focused = document.focus_visible_element();
        let previous = self.last.borrow().clone();
        if focused == previous.as_ref().map(|f| f.element) {
            return;
        }
        tracing::debug!(from = ?previous.as_ref().map(|f| f.element), to = ?focused, "focus changed");

        if let Some(component) = previous.as_ref().and_then(|f| f.component.as_ref()) {
            component.focused().set(false);
        }
        let old_chain = previous.map(|f| f.chain).unwrap_or_default();

        let component = focused.and_then(|id| document.component(id));
        if let Some(component) = &component {
            component.focused().set(true);
        }
        let new_chain = component
            .as_ref()
            .map(Component::ancestor_components)
            .unwrap_or_default();

        for ancestor in &old_chain {
            if !new_chain.contains(ancestor) {
                ancestor.has_focused().set(false);
            }
        }
        for ancestor in &new_chain {
            ancestor.has_focused().set(true);
        }

        *self.last.borrow_mut() = focused.map(|element| Focused {
            element,
            component,
            chain: new_chain,
        });
        self.has_focus.set(focused.is_some());
    }
}

/// Drop the location fragment once focus sits somewhere other than the
/// element it addresses.
fn clear_stale_fragment(document: &Document) {
    let Some(fragment) = document.fragment().get() else {
        return;
    };
    let active_id = document.focused().and_then(|id| {
        document.with_dom(|dom| dom.get(id).and_then(|data| data.id.clone()))
    });
    if active_id.as_deref() != Some(fragment.as_str()) {
        tracing::debug!(%fragment, "clearing location fragment");
        document.fragment().set(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{FocusOrigin, NodeData};
    use std::rc::Rc;

    /// ```text
    /// root
    /// └── panel
    ///     ├── first  (focusable)
    ///     └── plain  (focusable, no component)
    /// ```
    struct Fixture {
        doc: Document,
        tracker: Rc<FocusTracker>,
        panel: Component,
        first: Component,
        plain: NodeId,
    }

    fn setup() -> Fixture {
        let doc = Document::new();
        let root = doc.insert_root(NodeData::new("Screen"));
        let panel_id = doc.insert_child(root, NodeData::new("Panel")).unwrap();
        let first_id = doc
            .insert_child(panel_id, NodeData::new("Button").with_id("first").focusable(true))
            .unwrap();
        let plain = doc
            .insert_child(panel_id, NodeData::new("Button").focusable(true))
            .unwrap();
        Component::attach(&doc, root).unwrap();
        let panel = Component::attach(&doc, panel_id).unwrap();
        let first = Component::attach(&doc, first_id).unwrap();

        let tracker = Rc::new(FocusTracker::new(&doc, true));
        let hook = Rc::clone(&tracker);
        doc.add_listener(move |event| {
            if event.is_focus() {
                hook.update();
            }
        });
        Fixture {
            doc,
            tracker,
            panel,
            first,
            plain,
        }
    }

    #[test]
    fn focus_raises_chain() {
        let f = setup();
        f.doc.focus(f.first.element());
        assert!(f.first.focused().get());
        assert!(f.first.has_focused().get());
        assert!(f.panel.has_focused().get());
        assert!(f.tracker.has_focus().get());
        assert_eq!(f.tracker.focused_component(), Some(f.first.clone()));
    }

    #[test]
    fn blur_clears_chain() {
        let f = setup();
        f.doc.focus(f.first.element());
        f.doc.blur();
        assert!(!f.first.focused().get());
        assert!(!f.panel.has_focused().get());
        assert!(!f.tracker.has_focus().get());
        assert_eq!(f.tracker.focused(), None);
    }

    #[test]
    fn element_without_component_raises_nothing() {
        let f = setup();
        f.doc.focus(f.first.element());
        f.doc.focus(f.plain);
        assert_eq!(f.tracker.focused(), Some(f.plain));
        assert_eq!(f.tracker.focused_component(), None);
        assert!(!f.first.focused().get());
        assert!(!f.panel.has_focused().get());
        assert!(f.tracker.has_focus().get());
    }

    #[test]
    fn invisible_pointer_focus_is_not_tracked() {
        let f = setup();
        f.doc.focus_with(f.first.element(), FocusOrigin::Pointer);
        assert_eq!(f.doc.focused(), Some(f.first.element()));
        assert_eq!(f.tracker.focused(), None);
        assert!(!f.first.focused().get());
    }

    #[test]
    fn removed_focus_clears_recorded_chain() {
        let f = setup();
        f.doc.focus(f.first.element());
        f.doc.remove(f.first.element());
        assert!(!f.first.focused().get());
        assert!(!f.panel.has_focused().get());
    }

    #[test]
    fn reentrant_focus_change_is_replayed() {
        let f = setup();
        let doc = f.doc.downgrade();
        let plain = f.plain;
        f.first.focused().subscribe(f.first.owner(), move |&focused| {
            if focused {
                if let Some(doc) = doc.upgrade() {
                    doc.focus(plain);
                }
            }
        });
        f.doc.focus(f.first.element());
        assert_eq!(f.tracker.focused(), Some(plain));
        assert!(!f.first.focused().get());
        assert!(!f.panel.has_focused().get());
    }

    #[test]
    fn fragment_cleared_when_focus_moves_elsewhere() {
        let f = setup();
        f.doc.navigate("first");
        assert_eq!(f.doc.fragment().get().as_deref(), Some("first"));
        f.doc.focus(f.plain);
        assert_eq!(f.doc.fragment().get(), None);
    }

    #[test]
    fn fragment_kept_while_addressed_element_focused() {
        let f = setup();
        f.doc.focus(f.first.element());
        f.doc.fragment().set(Some("first".into()));
        f.tracker.update();
        assert_eq!(f.doc.fragment().get().as_deref(), Some("first"));
    }

    #[test]
    fn update_without_document_is_noop() {
        let f = setup();
        let tracker = Rc::clone(&f.tracker);
        drop(f);
        tracker.update();
        assert_eq!(tracker.focused(), None);
    }
}
