//! Raw class-name manipulation for one element.

use crate::dom::{NodeId, WeakDocument};

/// Adds and removes concrete class names on one element, bypassing the
/// style tag registry.
#[derive(Debug, Clone)]
pub struct ClassList {
    element: NodeId,
    document: WeakDocument,
}

impl ClassList {
    pub(crate) fn new(element: NodeId, document: WeakDocument) -> Self {
        Self { element, document }
    }

    /// Add classes. Classes already present are left alone.
    pub fn add(&self, classes: &[&str]) -> &Self {
        if let Some(document) = self.document.upgrade() {
            document.add_classes(self.element, classes);
        }
        self
    }

    /// Remove classes.
    pub fn remove(&self, classes: &[&str]) -> &Self {
        if let Some(document) = self.document.upgrade() {
            document.remove_classes(self.element, classes);
        }
        self
    }

    /// [`add`](Self::add) if `present`, otherwise [`remove`](Self::remove).
    pub fn toggle(&self, present: bool, classes: &[&str]) -> &Self {
        if present {
            self.add(classes)
        } else {
            self.remove(classes)
        }
    }

    /// Whether the element currently has `class`.
    pub fn contains(&self, class: &str) -> bool {
        self.document
            .upgrade()
            .is_some_and(|document| document.with_dom(|dom| dom.has_class(self.element, class)))
    }
}
