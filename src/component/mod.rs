//! Logical components attached to elements.
//!
//! A [`Component`] is the logical owner of one element. It carries the
//! reactive flags the trackers write (`focused`, `has_focused`, `hovered`),
//! the element's [`StyleBinder`] and [`ClassList`], and the [`Owner`] every
//! subscription made on its behalf is registered for. Removing the element
//! from its document disposes the component.

pub mod capability;

use std::fmt;
use std::rc::Rc;

use crate::dom::{Document, NodeId, WeakDocument};
use crate::error::Error;
use crate::reactive::{Owner, State};
use crate::style::{ClassList, StyleBinder};

pub use capability::{FocusObservable, HoverObservable, StyleBindable};

struct ComponentInner {
    element: NodeId,
    document: WeakDocument,
    owner: Owner,
    focused: State<bool>,
    has_focused: State<bool>,
    hovered: State<bool>,
    style: StyleBinder,
    classes: ClassList,
}

/// Logical component attached to one element. Cloning yields another handle
/// to the same component; equality is identity.
#[derive(Clone)]
pub struct Component {
    inner: Rc<ComponentInner>,
}

impl Component {
    /// Attach a new component to `element`.
    ///
    /// Fails if the element is not in the document or already has a
    /// component.
    pub fn attach(document: &Document, element: NodeId) -> Result<Component, Error> {
        let label = document.with_dom(|dom| {
            dom.get(element).map(|data| match &data.id {
                Some(id) => format!("{}#{id}", data.widget_type),
                None => data.widget_type.clone(),
            })
        });
        let label = label.ok_or(Error::DetachedElement(element))?;

        let owner = Owner::new(label);
        let weak = document.downgrade();
        let component = Component {
            inner: Rc::new(ComponentInner {
                element,
                style: StyleBinder::new(element, weak.clone(), document.style_sheet(), owner.clone()),
                classes: ClassList::new(element, weak.clone()),
                document: weak,
                owner,
                focused: State::new(false),
                has_focused: State::new(false),
                hovered: State::new(false),
            }),
        };
        document.register_component(component.clone())?;
        tracing::debug!(component = %component.label(), ?element, "component attached");
        Ok(component)
    }

    /// The element this component owns.
    pub fn element(&self) -> NodeId {
        self.inner.element
    }

    /// The document, if it is still alive.
    pub fn document(&self) -> Option<Document> {
        self.inner.document.upgrade()
    }

    /// Diagnostic label (`Type#id`).
    pub fn label(&self) -> &str {
        self.inner.owner.label()
    }

    /// The owner subscriptions made for this component should use.
    pub fn owner(&self) -> &Owner {
        &self.inner.owner
    }

    /// Whether this component's element holds visible focus.
    pub fn focused(&self) -> &State<bool> {
        &self.inner.focused
    }

    /// Whether this component or one of its descendants holds visible focus.
    pub fn has_focused(&self) -> &State<bool> {
        &self.inner.has_focused
    }

    /// Whether the pointer is over this component's element. Only kept up to
    /// date while something observes it.
    pub fn hovered(&self) -> &State<bool> {
        &self.inner.hovered
    }

    /// The element's style binder.
    pub fn style(&self) -> &StyleBinder {
        &self.inner.style
    }

    /// Raw class manipulation on the element.
    pub fn classes(&self) -> &ClassList {
        &self.inner.classes
    }

    /// This component followed by the components of every ancestor element,
    /// leaf first. Empty once the element is gone.
    pub fn ancestor_components(&self) -> Vec<Component> {
        self.document()
            .map(|document| document.ancestor_components(self.inner.element))
            .unwrap_or_default()
    }

    /// The nearest component attached to an ancestor element.
    pub fn parent_component(&self) -> Option<Component> {
        self.ancestor_components().into_iter().nth(1)
    }

    /// Detach from the element and dispose every subscription owned by this
    /// component. Idempotent.
    pub fn dispose(&self) {
        if self.inner.owner.is_disposed() {
            return;
        }
        if let Some(document) = self.document() {
            let registered = document.component(self.inner.element);
            if registered.is_some_and(|c| c.ptr_eq(self)) {
                document.unregister_component(self.inner.element);
            }
        }
        self.inner.owner.dispose();
        tracing::debug!(component = %self.label(), "component disposed");
    }

    /// Whether [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.inner.owner.is_disposed()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Component) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Component {}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("label", &self.label())
            .field("element", &self.inner.element)
            .field("focused", &self.inner.focused.get())
            .field("has_focused", &self.inner.has_focused.get())
            .field("hovered", &self.inner.hovered.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeData;
    use crate::style::StyleSheet;

    fn build_tree() -> (Document, [NodeId; 4]) {
        let doc = Document::new();
        let root = doc.insert_root(NodeData::new("Screen").with_id("root"));
        let panel = doc.insert_child(root, NodeData::new("Panel")).unwrap();
        let plain = doc.insert_child(panel, NodeData::new("Box")).unwrap();
        let leaf = doc.insert_child(plain, NodeData::new("Button")).unwrap();
        (doc, [root, panel, plain, leaf])
    }

    #[test]
    fn attach_registers_component() {
        let (doc, [root, ..]) = build_tree();
        let component = Component::attach(&doc, root).unwrap();
        assert_eq!(component.label(), "Screen#root");
        assert_eq!(doc.component(root), Some(component.clone()));
        assert!(!component.focused().get());
    }

    #[test]
    fn attach_twice_fails() {
        let (doc, [root, ..]) = build_tree();
        Component::attach(&doc, root).unwrap();
        assert!(matches!(
            Component::attach(&doc, root),
            Err(Error::ComponentExists(id)) if id == root
        ));
    }

    #[test]
    fn attach_detached_fails() {
        let (doc, [_, _, _, leaf]) = build_tree();
        doc.remove(leaf);
        assert!(matches!(
            Component::attach(&doc, leaf),
            Err(Error::DetachedElement(_))
        ));
    }

    #[test]
    fn ancestor_components_skip_plain_elements() {
        let (doc, [root, panel, _plain, leaf]) = build_tree();
        let root_c = Component::attach(&doc, root).unwrap();
        let panel_c = Component::attach(&doc, panel).unwrap();
        let leaf_c = Component::attach(&doc, leaf).unwrap();

        assert_eq!(
            leaf_c.ancestor_components(),
            vec![leaf_c.clone(), panel_c.clone(), root_c.clone()]
        );
        assert_eq!(leaf_c.parent_component(), Some(panel_c));
        assert_eq!(root_c.parent_component(), None);
    }

    #[test]
    fn removing_element_disposes_component() {
        let (doc, [_, panel, _, leaf]) = build_tree();
        let leaf_c = Component::attach(&doc, leaf).unwrap();
        let flag = State::new(false);
        leaf_c.style().bind(&flag, &["x"]);
        assert!(flag.is_observed());

        doc.remove(panel);
        assert!(leaf_c.is_disposed());
        assert!(!flag.is_observed());
        assert!(doc.component(leaf).is_none());
        assert!(leaf_c.ancestor_components().is_empty());
    }

    #[test]
    fn dispose_detaches() {
        let (doc, [root, ..]) = build_tree();
        let component = Component::attach(&doc, root).unwrap();
        component.dispose();
        component.dispose();
        assert!(doc.component(root).is_none());
        assert!(Component::attach(&doc, root).is_ok());
    }

    #[test]
    fn style_binder_uses_document_sheet() {
        let (doc, [root, ..]) = build_tree();
        doc.set_style_sheet(StyleSheet::new().define("primary", &["fg-primary"]));
        let component = Component::attach(&doc, root).unwrap();
        component.style().apply(&["primary"]);
        assert!(component.classes().contains("fg-primary"));
    }
}
