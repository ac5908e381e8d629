//! Declarative style binding for one element.
//!
//! A [`StyleBinder`] keeps the set of *active* style tags for its element
//! and reconciles the element's class list against what those tags resolve
//! to in the [`StyleSheet`]. Boolean states can drive tags, and arbitrary
//! states can drive inline properties and custom properties (`--name`).
//!
//! Reconciliation only adds classes the active tags need and only removes
//! classes of tags that were just deactivated, and only if no remaining
//! active tag still needs them.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::sheet::StyleSheet;
use crate::dom::{NodeId, WeakDocument};
use crate::reactive::{Owner, ReadState, StateId, Subscription};

struct Binding {
    subscription: Subscription,
    tags: Vec<String>,
}

struct BinderInner {
    element: NodeId,
    document: WeakDocument,
    sheet: Rc<StyleSheet>,
    owner: Owner,
    active: RefCell<Vec<String>>,
    bindings: RefCell<HashMap<StateId, Binding>>,
    properties: RefCell<HashMap<String, Subscription>>,
}

impl BinderInner {
    fn activate<S: AsRef<str>>(&self, tags: &[S]) {
        {
            let mut active = self.active.borrow_mut();
            for tag in tags {
                let tag = tag.as_ref();
                if !active.iter().any(|t| t == tag) {
                    active.push(tag.to_owned());
                }
            }
        }
        self.reconcile::<&str>(&[]);
    }

    fn deactivate<S: AsRef<str>>(&self, tags: &[S]) {
        self.active
            .borrow_mut()
            .retain(|t| !tags.iter().any(|tag| tag.as_ref() == t));
        self.reconcile(tags);
    }

    fn toggle<S: AsRef<str>>(&self, enabled: bool, tags: &[S]) {
        if enabled {
            self.activate(tags);
        } else {
            self.deactivate(tags);
        }
    }

    fn reconcile<S: AsRef<str>>(&self, deactivated: &[S]) {
        let Some(document) = self.document.upgrade() else {
            tracing::trace!(element = ?self.element, "document dropped; skipping class reconcile");
            return;
        };

        let mut required: Vec<&str> = Vec::new();
        for tag in self.active.borrow().iter() {
            for class in self.sheet.resolve(tag) {
                if !required.contains(&class.as_str()) {
                    required.push(class);
                }
            }
        }
        let obsolete: Vec<&str> = deactivated
            .iter()
            .flat_map(|tag| self.sheet.resolve(tag.as_ref()))
            .map(String::as_str)
            .filter(|class| !required.contains(class))
            .collect();

        let removed = document.remove_classes(self.element, &obsolete);
        let added = document.add_classes(self.element, &required);
        if removed + added > 0 {
            tracing::trace!(element = ?self.element, added, removed, "classes reconciled");
        }
    }

    fn write_property(&self, name: &str, value: Option<&str>) {
        if let Some(document) = self.document.upgrade() {
            document.set_style_property(self.element, name, value);
        }
    }

    fn unbind_property(&self, name: &str) {
        let previous = self.properties.borrow_mut().remove(name);
        if let Some(subscription) = previous {
            subscription.unsubscribe();
        }
    }
}

/// Per-element style tag and inline property binder.
///
/// Cloning yields another handle to the same binder.
#[derive(Clone)]
pub struct StyleBinder {
    inner: Rc<BinderInner>,
}

impl StyleBinder {
    /// Create a binder for `element`, resolving tags in `sheet`, with every
    /// binding subscription registered for `owner`.
    pub fn new(element: NodeId, document: WeakDocument, sheet: Rc<StyleSheet>, owner: Owner) -> Self {
        Self {
            inner: Rc::new(BinderInner {
                element,
                document,
                sheet,
                owner,
                active: RefCell::new(Vec::new()),
                bindings: RefCell::new(HashMap::new()),
                properties: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// The element this binder styles.
    pub fn element(&self) -> NodeId {
        self.inner.element
    }

    /// Activate tags and add the classes they resolve to.
    pub fn apply(&self, tags: &[&str]) -> &Self {
        self.inner.activate(tags);
        self
    }

    /// Deactivate tags and remove the classes no remaining tag requires.
    pub fn remove(&self, tags: &[&str]) -> &Self {
        self.inner.deactivate(tags);
        self
    }

    /// [`apply`](Self::apply) if `enabled`, otherwise [`remove`](Self::remove).
    pub fn toggle(&self, enabled: bool, tags: &[&str]) -> &Self {
        self.inner.toggle(enabled, tags);
        self
    }

    /// Make `tags` active exactly while `state` is `true`.
    ///
    /// An existing binding for the same state is replaced. Tags shared by the
    /// old and new sets stay active across the switch; only the tags the new
    /// set drops are deactivated.
    pub fn bind(&self, state: &ReadState<bool>, tags: &[&str]) -> &Self {
        let previous = self.inner.bindings.borrow_mut().remove(&state.id());
        let dropped: Vec<String> = match previous {
            Some(Binding {
                subscription,
                tags: old,
            }) => {
                subscription.unsubscribe();
                old.into_iter()
                    .filter(|tag| !tags.contains(&tag.as_str()))
                    .collect()
            }
            None => Vec::new(),
        };

        let tags: Vec<String> = tags.iter().map(|t| (*t).to_owned()).collect();
        let weak = Rc::downgrade(&self.inner);
        let driven = tags.clone();
        let subscription = state.observe(&self.inner.owner, move |&enabled| {
            if let Some(inner) = weak.upgrade() {
                inner.toggle(enabled, &driven);
            }
        });
        self.inner
            .bindings
            .borrow_mut()
            .insert(state.id(), Binding { subscription, tags });
        if !dropped.is_empty() {
            self.inner.deactivate(&dropped);
        }
        self
    }

    /// Remove the binding for `state` and deactivate its tags. No-op if not
    /// bound.
    pub fn unbind(&self, state: &ReadState<bool>) -> &Self {
        let binding = self.inner.bindings.borrow_mut().remove(&state.id());
        if let Some(Binding { subscription, tags }) = binding {
            subscription.unsubscribe();
            self.inner.deactivate(&tags);
        }
        self
    }

    /// Whether `state` currently drives tags on this element.
    pub fn is_bound(&self, state: &ReadState<bool>) -> bool {
        self.inner.bindings.borrow().contains_key(&state.id())
    }

    /// Re-add the classes of every active tag.
    pub fn refresh(&self) -> &Self {
        self.inner.reconcile::<&str>(&[]);
        self
    }

    /// Whether `tag` is active.
    pub fn has(&self, tag: &str) -> bool {
        self.inner.active.borrow().iter().any(|t| t == tag)
    }

    /// Active tags, in activation order.
    pub fn active_tags(&self) -> Vec<String> {
        self.inner.active.borrow().clone()
    }

    /// Set (`Some`) or clear (`None`) an inline property. Replaces any
    /// binding on that property.
    pub fn set_property(&self, name: &str, value: Option<&str>) -> &Self {
        self.inner.unbind_property(name);
        self.inner.write_property(name, value);
        self
    }

    /// [`set_property`](Self::set_property) on the custom property `--name`.
    pub fn set_variable(&self, name: &str, value: Option<&str>) -> &Self {
        self.set_property(&format!("--{name}"), value)
    }

    /// Drive an inline property from `state`; `None` clears it.
    pub fn bind_property<V>(&self, name: &str, state: &ReadState<Option<V>>) -> &Self
    where
        V: fmt::Display + Clone + 'static,
    {
        self.inner.unbind_property(name);
        let weak = Rc::downgrade(&self.inner);
        let property = name.to_owned();
        let subscription = state.observe(&self.inner.owner, move |value: &Option<V>| {
            if let Some(inner) = weak.upgrade() {
                let text = value.as_ref().map(ToString::to_string);
                inner.write_property(&property, text.as_deref());
            }
        });
        self.inner
            .properties
            .borrow_mut()
            .insert(name.to_owned(), subscription);
        self
    }

    /// [`bind_property`](Self::bind_property) on the custom property `--name`.
    pub fn bind_variable<V>(&self, name: &str, state: &ReadState<Option<V>>) -> &Self
    where
        V: fmt::Display + Clone + 'static,
    {
        self.bind_property(&format!("--{name}"), state)
    }

    /// Whether `name` is driven by a state.
    pub fn is_property_bound(&self, name: &str) -> bool {
        self.inner.properties.borrow().contains_key(name)
    }

    /// Clear inline properties. Bindings on them stay in place.
    pub fn remove_properties(&self, names: &[&str]) -> &Self {
        for name in names {
            self.inner.write_property(name, None);
        }
        self
    }
}

impl fmt::Debug for StyleBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleBinder")
            .field("element", &self.inner.element)
            .field("active", &self.inner.active.borrow())
            .field("bindings", &self.inner.bindings.borrow().len())
            .field("properties", &self.inner.properties.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, NodeData};
    use crate::reactive::State;
    use pretty_assertions::assert_eq;

    fn sheet() -> StyleSheet {
        StyleSheet::new()
            .define("a", &["a1", "shared"])
            .define("b", &["b1", "shared"])
            .define("c", &["c1"])
    }

    fn setup() -> (Document, NodeId, StyleBinder, Owner) {
        let doc = Document::new();
        let id = doc.insert_root(NodeData::new("Panel"));
        let owner = Owner::new("binder-test");
        let binder = StyleBinder::new(id, doc.downgrade(), Rc::new(sheet()), owner.clone());
        (doc, id, binder, owner)
    }

    fn classes(doc: &Document, id: NodeId) -> Vec<String> {
        doc.with_dom(|dom| dom.get(id).map(|d| d.classes.clone()).unwrap_or_default())
    }

    #[test]
    fn apply_resolves_tags_in_order() {
        let (doc, id, binder, _owner) = setup();
        binder.apply(&["a", "b"]);
        assert_eq!(classes(&doc, id), vec!["a1", "shared", "b1"]);
        assert!(binder.has("a"));
        assert_eq!(binder.active_tags(), vec!["a", "b"]);
    }

    #[test]
    fn repeated_apply_does_not_mutate() {
        let (doc, id, binder, _owner) = setup();
        binder.apply(&["a"]);
        assert!(doc.take_dirty().contains(&id));
        binder.apply(&["a"]).apply(&["a"]);
        assert!(doc.take_dirty().is_empty());
        assert_eq!(classes(&doc, id), vec!["a1", "shared"]);
    }

    #[test]
    fn remove_keeps_classes_still_required() {
        let (doc, id, binder, _owner) = setup();
        binder.apply(&["a", "b"]);
        binder.remove(&["a"]);
        assert_eq!(classes(&doc, id), vec!["shared", "b1"]);
        binder.remove(&["b"]);
        assert!(classes(&doc, id).is_empty());
    }

    #[test]
    fn unknown_tag_is_ignored() {
        let (doc, id, binder, _owner) = setup();
        binder.apply(&["nope"]);
        assert!(binder.has("nope"));
        assert!(classes(&doc, id).is_empty());
    }

    #[test]
    fn toggle() {
        let (doc, id, binder, _owner) = setup();
        binder.toggle(true, &["c"]);
        assert_eq!(classes(&doc, id), vec!["c1"]);
        binder.toggle(false, &["c"]);
        assert!(classes(&doc, id).is_empty());
    }

    #[test]
    fn bind_false_state_changes_nothing() {
        let (doc, id, binder, _owner) = setup();
        let state = State::new(false);
        binder.bind(&state, &["a", "b"]);
        assert!(doc.take_dirty().is_empty());
        assert!(classes(&doc, id).is_empty());
        assert!(binder.is_bound(&state));
    }

    #[test]
    fn bind_follows_state() {
        let (doc, id, binder, _owner) = setup();
        let state = State::new(false);
        binder.bind(&state, &["a", "b"]);
        state.set(true);
        assert_eq!(classes(&doc, id), vec!["a1", "shared", "b1"]);
        state.set(false);
        assert!(classes(&doc, id).is_empty());
    }

    #[test]
    fn binding_off_keeps_classes_of_other_active_tags() {
        let (doc, id, binder, _owner) = setup();
        let state = State::new(true);
        binder.apply(&["b"]);
        binder.bind(&state, &["a"]);
        state.set(false);
        assert_eq!(classes(&doc, id), vec!["shared", "b1"]);
    }

    #[test]
    fn rebind_replaces_previous_tags() {
        let (doc, id, binder, _owner) = setup();
        let state = State::new(true);
        binder.bind(&state, &["a"]);
        binder.bind(&state, &["c"]);
        assert_eq!(state.subscriber_count(), 1);
        assert_eq!(classes(&doc, id), vec!["c1"]);
    }

    #[test]
    fn rebind_same_tags_leaves_classes_untouched() {
        let (doc, id, binder, _owner) = setup();
        let state = State::new(true);
        binder.bind(&state, &["a", "b"]);
        doc.take_dirty();
        binder.bind(&state, &["b", "a"]);
        assert!(doc.take_dirty().is_empty());
        assert_eq!(classes(&doc, id), vec!["a1", "shared", "b1"]);
    }

    #[test]
    fn rebind_overlapping_tags_only_drops_difference() {
        let (doc, id, binder, _owner) = setup();
        let state = State::new(true);
        binder.bind(&state, &["a", "b"]);
        binder.bind(&state, &["b"]);
        assert_eq!(classes(&doc, id), vec!["shared", "b1"]);
        assert_eq!(binder.active_tags(), vec!["b"]);
        state.set(false);
        assert!(classes(&doc, id).is_empty());
    }

    #[test]
    fn unbind_tears_down() {
        let (doc, id, binder, _owner) = setup();
        let state = State::new(true);
        binder.bind(&state, &["c"]);
        binder.unbind(&state);
        assert!(!binder.is_bound(&state));
        assert!(!state.is_observed());
        assert!(classes(&doc, id).is_empty());
        state.set(false);
        state.set(true);
        assert!(classes(&doc, id).is_empty());
        binder.unbind(&state);
    }

    #[test]
    fn bind_derived_state() {
        let (doc, id, binder, _owner) = setup();
        let count = State::new(0);
        let positive = count.map(|n| *n > 0);
        binder.bind(&positive, &["c"]);
        count.set(3);
        assert_eq!(classes(&doc, id), vec!["c1"]);
        count.set(0);
        assert!(classes(&doc, id).is_empty());
    }

    #[test]
    fn refresh_restores_removed_classes() {
        let (doc, id, binder, _owner) = setup();
        binder.apply(&["c"]);
        doc.remove_classes(id, &["c1"]);
        binder.refresh();
        assert_eq!(classes(&doc, id), vec!["c1"]);
    }

    #[test]
    fn disposing_owner_stops_bindings() {
        let (doc, id, binder, owner) = setup();
        let state = State::new(false);
        binder.bind(&state, &["c"]);
        owner.dispose();
        state.set(true);
        assert!(classes(&doc, id).is_empty());
    }

    #[test]
    fn set_and_clear_property() {
        let (doc, id, binder, _owner) = setup();
        binder.set_property("width", Some("10"));
        binder.set_variable("accent", Some("red"));
        doc.with_dom(|dom| {
            let data = dom.get(id).unwrap();
            assert_eq!(data.style_property("width"), Some("10"));
            assert_eq!(data.style_property("--accent"), Some("red"));
        });
        binder.set_property("width", None);
        binder.remove_properties(&["--accent"]);
        assert!(doc.with_dom(|dom| dom.get(id).unwrap().style.is_empty()));
    }

    #[test]
    fn bound_property_follows_state() {
        let (doc, id, binder, _owner) = setup();
        let width = State::new(Some(4u16));
        binder.bind_property("width", &width);
        let read = || doc.with_dom(|dom| dom.get(id).unwrap().style_property("width").map(str::to_owned));
        assert_eq!(read(), Some("4".to_owned()));
        width.set(Some(8));
        assert_eq!(read(), Some("8".to_owned()));
        width.set(None);
        assert_eq!(read(), None);
    }

    #[test]
    fn set_property_unbinds_previous_binding() {
        let (doc, id, binder, _owner) = setup();
        let accent = State::new(Some("red".to_owned()));
        binder.bind_variable("accent", &accent);
        assert!(binder.is_property_bound("--accent"));
        binder.set_variable("accent", Some("blue"));
        assert!(!binder.is_property_bound("--accent"));
        assert!(!accent.is_observed());
        accent.set(Some("green".to_owned()));
        assert_eq!(
            doc.with_dom(|dom| dom.get(id).unwrap().style_property("--accent").map(str::to_owned)),
            Some("blue".to_owned())
        );
    }

    #[test]
    fn rebinding_property_replaces_subscription() {
        let (_doc, _id, binder, _owner) = setup();
        let first = State::new(Some(1));
        let second = State::new(Some(2));
        binder.bind_property("width", &first);
        binder.bind_property("width", &second);
        assert!(!first.is_observed());
        assert!(second.is_observed());
    }
}
