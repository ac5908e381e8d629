//! Hover stack tracking.
//!
//! [`HoverTracker`] keeps the stack of elements under the pointer (outermost
//! first, innermost last) and flips the `hovered` flag of components that
//! are being observed as elements enter or leave the stack. Components whose
//! `hovered` state nobody observes are never written.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::component::Component;
use crate::dom::{Document, NodeId, WeakDocument};

#[derive(Debug, Clone)]
struct Hovered {
    element: NodeId,
    component: Option<Component>,
}

/// Tracks the elements under the pointer.
#[derive(Debug)]
pub struct HoverTracker {
    document: WeakDocument,
    last: RefCell<Rc<[Hovered]>>,
    updating: Cell<bool>,
    pending: Cell<bool>,
}

impl HoverTracker {
    pub(crate) fn new(document: &Document) -> Self {
        Self {
            document: document.downgrade(),
            last: RefCell::new(Rc::from(Vec::new())),
            updating: Cell::new(false),
            pending: Cell::new(false),
        }
    }

    /// The innermost hovered element.
    pub fn hovered(&self) -> Option<NodeId> {
        self.last.borrow().last().map(|h| h.element)
    }

    /// Every hovered element, outermost first.
    pub fn all_hovered(&self) -> Vec<NodeId> {
        self.last.borrow().iter().map(|h| h.element).collect()
    }

    /// The component attached to the innermost hovered element.
    pub fn hovered_component(&self) -> Option<Component> {
        self.last.borrow().last().and_then(|h| h.component.clone())
    }

    /// Components of the hovered elements, outermost first, skipping
    /// elements without one.
    ///
    /// The iterator works on the stack as of this call and is lazy; clone it
    /// to walk the same stack again.
    pub fn hovered_components(&self) -> HoveredComponents {
        HoveredComponents {
            stack: Rc::clone(&self.last.borrow()),
            next: 0,
        }
    }

    /// Recompute from the document's pointer position.
    ///
    /// Calls made while an update is running are queued and replayed once
    /// the running update returns.
    pub fn update(&self) {
        if self.updating.replace(true) {
            self.pending.set(true);
            tracing::trace!("hover update queued");
            return;
        }
        loop {
            self.pending.set(false);
            match self.document.upgrade() {
                Some(document) => self.recompute(&document),
                None => tracing::debug!("document dropped; hover tracker idle"),
            }
            if !self.pending.get() {
                break;
            }
        }
        self.updating.set(false);
    }

    fn recompute(&self, document: &Document) {
        let stack = document.hover_stack();
        let previous = Rc::clone(&self.last.borrow());
        if stack.last() == previous.last().map(|h| &h.element) {
            return;
        }

        let current: Vec<Hovered> = stack
            .iter()
            .map(|&element| Hovered {
                element,
                component: document.component(element),
            })
            .collect();
        tracing::trace!(
            from = ?previous.last().map(|h| h.element),
            to = ?stack.last(),
            depth = stack.len(),
            "hover changed"
        );

        for left in previous.iter() {
            if !stack.contains(&left.element) {
                set_hovered(left, false);
            }
        }
        for entered in &current {
            if !previous.iter().any(|h| h.element == entered.element) {
                set_hovered(entered, true);
            }
        }
        *self.last.borrow_mut() = Rc::from(current);
    }
}

fn set_hovered(entry: &Hovered, hovered: bool) {
    if let Some(component) = &entry.component {
        if component.hovered().is_observed() {
            component.hovered().set(hovered);
        }
    }
}

/// Lazy iterator over hovered components, outermost first.
#[derive(Debug, Clone)]
pub struct HoveredComponents {
    stack: Rc<[Hovered]>,
    next: usize,
}

impl Iterator for HoveredComponents {
    type Item = Component;

    fn next(&mut self) -> Option<Component> {
        while let Some(entry) = self.stack.get(self.next) {
            self.next += 1;
            if let Some(component) = &entry.component {
                return Some(component.clone());
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.stack.len().saturating_sub(self.next)))
    }
}
