//! Capability traits.
//!
//! Widgets built on top of [`Component`] expose what they support through
//! these traits instead of growing ad hoc members. [`Component`] implements
//! all three, so a widget wrapping a component only forwards to it.

use super::Component;
use crate::reactive::{Owner, ReadState};
use crate::style::StyleBinder;

/// Something whose element can be styled through a [`StyleBinder`].
pub trait StyleBindable {
    /// The binder for this element.
    fn style(&self) -> &StyleBinder;

    /// Activate `tags` exactly while `state` is true.
    fn bind_style(&self, state: &ReadState<bool>, tags: &[&str]) -> &StyleBinder {
        self.style().bind(state, tags)
    }
}

/// Something that reports focus on itself and its descendants.
pub trait FocusObservable {
    /// Whether the element holds visible focus.
    fn focused(&self) -> &ReadState<bool>;

    /// Whether the element or a descendant holds visible focus.
    fn has_focused(&self) -> &ReadState<bool>;

    /// Run `f` now and whenever focus enters or leaves this subtree.
    fn on_focus_within(&self, owner: &Owner, mut f: impl FnMut(bool) + 'static) {
        self.has_focused().observe(owner, move |&within| f(within));
    }
}

/// Something that reports whether the pointer is over it.
pub trait HoverObservable {
    /// Whether the pointer is over the element. Tracking starts once this
    /// state is observed.
    fn hovered(&self) -> &ReadState<bool>;

    /// Run `f` now and whenever the pointer enters or leaves the element.
    /// Subscribing opts the element into hover tracking.
    fn on_hover(&self, owner: &Owner, mut f: impl FnMut(bool) + 'static) {
        self.hovered().observe(owner, move |&hovered| f(hovered));
    }
}

impl StyleBindable for Component {
    fn style(&self) -> &StyleBinder {
        Component::style(self)
    }
}

impl FocusObservable for Component {
    fn focused(&self) -> &ReadState<bool> {
        Component::focused(self)
    }

    fn has_focused(&self) -> &ReadState<bool> {
        Component::has_focused(self)
    }
}

impl HoverObservable for Component {
    fn hovered(&self) -> &ReadState<bool> {
        Component::hovered(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, NodeData};
    use crate::reactive::State;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Toggle {
        component: Component,
    }

    impl StyleBindable for Toggle {
        fn style(&self) -> &StyleBinder {
            self.component.style()
        }
    }

    impl HoverObservable for Toggle {
        fn hovered(&self) -> &ReadState<bool> {
            self.component.hovered()
        }
    }

    #[test]
    fn widget_composes_capabilities() {
        let doc = Document::new();
        doc.set_style_sheet(crate::style::StyleSheet::new().define("on", &["is-on"]));
        let id = doc.insert_root(NodeData::new("Toggle"));
        let toggle = Toggle {
            component: Component::attach(&doc, id).unwrap(),
        };

        let on = State::new(false);
        toggle.bind_style(&on, &["on"]);
        on.set(true);
        assert!(toggle.component.classes().contains("is-on"));

        assert!(!toggle.hovered().is_observed());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let owner = Owner::new("toggle");
        toggle.on_hover(&owner, move |h| sink.borrow_mut().push(h));
        assert!(toggle.hovered().is_observed());
        assert_eq!(*seen.borrow(), vec![false]);
    }

    #[test]
    fn component_focus_capability() {
        let doc = Document::new();
        let id = doc.insert_root(NodeData::new("Panel"));
        let component = Component::attach(&doc, id).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        FocusObservable::on_focus_within(&component, component.owner(), move |w| {
            sink.borrow_mut().push(w)
        });
        component.has_focused().set(true);
        assert_eq!(*seen.borrow(), vec![false, true]);
        assert!(!FocusObservable::focused(&component).get());
    }
}
