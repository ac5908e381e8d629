//! The shared document: element tree plus focus, pointer, and location state.
//!
//! [`Document`] is a cheap, cloneable handle (`Rc`) around the [`Dom`] and
//! everything the trackers query: which element holds focus (and whether
//! that focus is visible), where the pointer is, the current location
//! fragment, and the table of components attached to elements.
//!
//! Every mutation finishes (and releases its borrows) before the resulting
//! [`DocumentEvent`]s are dispatched, so listeners can re-enter the document.

use std::cell::{Cell, Ref, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::{Rc, Weak};

use slotmap::SecondaryMap;

use super::focus::FocusChain;
use super::node::{NodeData, NodeId};
use super::tree::Dom;
use crate::component::Component;
use crate::error::Error;
use crate::event::binding::{BindingAction, KeyBindingRegistry};
use crate::event::document::{DocumentEvent, DocumentListener, ListenerId};
use crate::event::input::{InputEvent, MouseAction, MouseBtn};
use crate::geometry::{Offset, Region};
use crate::reactive::State;
use crate::style::StyleSheet;

// ---------------------------------------------------------------------------
// FocusOrigin
// ---------------------------------------------------------------------------

/// How focus arrived at an element. Decides whether the focus is *visible*.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusOrigin {
    /// Tab navigation or another key binding.
    Keyboard,
    /// A pointer press. Visible only on editable elements.
    Pointer,
    /// Application code called [`Document::focus`].
    Programmatic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FocusState {
    active: Option<NodeId>,
    visible: bool,
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

struct DocumentInner {
    dom: RefCell<Dom>,
    components: RefCell<SecondaryMap<NodeId, Component>>,
    focus: Cell<FocusState>,
    chain: RefCell<FocusChain>,
    chain_stale: Cell<bool>,
    pointer: Cell<Option<Offset>>,
    fragment: State<Option<String>>,
    style_sheet: RefCell<Rc<StyleSheet>>,
    bindings: RefCell<KeyBindingRegistry>,
    listeners: RefCell<Vec<(ListenerId, DocumentListener)>>,
    listening: Cell<bool>,
}

/// Shared handle to an element tree and its input state.
#[derive(Clone)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

/// Non-owning handle to a [`Document`].
#[derive(Clone, Default)]
pub struct WeakDocument {
    inner: Weak<DocumentInner>,
}

impl WeakDocument {
    /// Upgrade to a strong handle if the document is still alive.
    pub fn upgrade(&self) -> Option<Document> {
        self.inner.upgrade().map(|inner| Document { inner })
    }
}

impl fmt::Debug for WeakDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakDocument")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.inner.dom.borrow().len())
            .field("components", &self.inner.components.borrow().len())
            .field("focus", &self.inner.focus.get())
            .field("pointer", &self.inner.pointer.get())
            .finish()
    }
}

impl Document {
    /// Create an empty document with the default key bindings and an empty
    /// style sheet.
    pub fn new() -> Self {
        Self::with_key_bindings(KeyBindingRegistry::with_defaults())
    }

    /// Create an empty document with custom key bindings.
    pub fn with_key_bindings(bindings: KeyBindingRegistry) -> Self {
        Self {
            inner: Rc::new(DocumentInner {
                dom: RefCell::new(Dom::new()),
                components: RefCell::new(SecondaryMap::new()),
                focus: Cell::new(FocusState::default()),
                chain: RefCell::new(FocusChain::new()),
                chain_stale: Cell::new(true),
                pointer: Cell::new(None),
                fragment: State::new(None),
                style_sheet: RefCell::new(Rc::new(StyleSheet::new())),
                bindings: RefCell::new(bindings),
                listeners: RefCell::new(Vec::new()),
                listening: Cell::new(false),
            }),
        }
    }

    /// A non-owning handle.
    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether both handles refer to the same document.
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // -- tree ---------------------------------------------------------------

    /// Borrow the element tree.
    pub fn dom(&self) -> Ref<'_, Dom> {
        self.inner.dom.borrow()
    }

    /// Run `f` with read access to the tree.
    pub fn with_dom<R>(&self, f: impl FnOnce(&Dom) -> R) -> R {
        f(&self.inner.dom.borrow())
    }

    /// Run `f` with write access to the tree.
    ///
    /// Meant for layout and attribute updates (regions, visibility). Use
    /// [`remove`](Self::remove) to delete elements so that their components
    /// are disposed. Afterwards the focus chain is rebuilt lazily and, if the
    /// pointer is inside the document, the hover stack is re-evaluated.
    pub fn with_dom_mut<R>(&self, f: impl FnOnce(&mut Dom) -> R) -> R {
        let result = f(&mut self.inner.dom.borrow_mut());
        self.inner.chain_stale.set(true);
        self.refresh_pointer();
        result
    }

    /// Insert a parentless element. The first one becomes the root.
    pub fn insert_root(&self, data: NodeData) -> NodeId {
        let id = self.inner.dom.borrow_mut().insert(data);
        self.inner.chain_stale.set(true);
        id
    }

    /// Insert an element as the last child of `parent`.
    pub fn insert_child(&self, parent: NodeId, data: NodeData) -> Result<NodeId, Error> {
        let id = self
            .inner
            .dom
            .borrow_mut()
            .insert_child(parent, data)
            .ok_or(Error::DetachedElement(parent))?;
        self.inner.chain_stale.set(true);
        Ok(id)
    }

    /// Remove an element and its subtree.
    ///
    /// Components attached to removed elements are disposed. If focus was
    /// inside the subtree it is dropped, and the hover stack is re-evaluated.
    pub fn remove(&self, id: NodeId) -> Vec<NodeId> {
        let removed = self.inner.dom.borrow_mut().remove(id);
        if removed.is_empty() {
            return removed;
        }
        self.inner.chain_stale.set(true);

        let disposed: Vec<Component> = {
            let mut components = self.inner.components.borrow_mut();
            removed.iter().filter_map(|&node| components.remove(node)).collect()
        };
        tracing::debug!(
            removed = removed.len(),
            components = disposed.len(),
            "removed subtree"
        );
        for component in &disposed {
            component.dispose();
        }

        let focus = self.inner.focus.get();
        if let Some(active) = focus.active.filter(|active| removed.contains(active)) {
            self.inner.focus.set(FocusState::default());
            self.dispatch(DocumentEvent::FocusOut(active));
        }
        self.refresh_pointer();
        removed
    }

    /// Move `node` under `new_parent`. Returns `false` if the move is invalid.
    pub fn reparent(&self, node: NodeId, new_parent: NodeId) -> bool {
        let moved = self.inner.dom.borrow_mut().reparent(node, new_parent);
        if moved {
            self.inner.chain_stale.set(true);
            self.refresh_pointer();
        }
        moved
    }

    /// Set an element's laid-out region.
    pub fn set_region(&self, id: NodeId, region: Region) -> bool {
        self.with_dom_mut(|dom| {
            dom.get_mut(id)
                .map(|data| data.region = Some(region))
                .is_some()
        })
    }

    /// Whether the element exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.inner.dom.borrow().contains(id)
    }

    /// Drain the set of elements whose classes or inline style changed.
    pub fn take_dirty(&self) -> HashSet<NodeId> {
        self.inner.dom.borrow_mut().take_dirty()
    }

    // -- class list / inline style -----------------------------------------

    pub(crate) fn add_classes(&self, id: NodeId, classes: &[&str]) -> usize {
        let mut dom = self.inner.dom.borrow_mut();
        classes.iter().filter(|class| dom.add_class(id, class)).count()
    }

    pub(crate) fn remove_classes(&self, id: NodeId, classes: &[&str]) -> usize {
        let mut dom = self.inner.dom.borrow_mut();
        classes
            .iter()
            .filter(|class| dom.remove_class(id, class))
            .count()
    }

    pub(crate) fn set_style_property(&self, id: NodeId, name: &str, value: Option<&str>) -> bool {
        self.inner.dom.borrow_mut().set_style_property(id, name, value)
    }

    /// The tag registry that style binders resolve against.
    pub fn style_sheet(&self) -> Rc<StyleSheet> {
        Rc::clone(&self.inner.style_sheet.borrow())
    }

    /// Replace the tag registry used by components attached from now on.
    pub fn set_style_sheet(&self, sheet: StyleSheet) {
        *self.inner.style_sheet.borrow_mut() = Rc::new(sheet);
    }

    // -- components ---------------------------------------------------------

    /// The component attached to `id`, if any.
    pub fn component(&self, id: NodeId) -> Option<Component> {
        self.inner.components.borrow().get(id).cloned()
    }

    pub(crate) fn register_component(&self, component: Component) -> Result<(), Error> {
        let id = component.element();
        if !self.contains(id) {
            return Err(Error::DetachedElement(id));
        }
        let mut components = self.inner.components.borrow_mut();
        if components.contains_key(id) {
            return Err(Error::ComponentExists(id));
        }
        components.insert(id, component);
        Ok(())
    }

    pub(crate) fn unregister_component(&self, id: NodeId) -> Option<Component> {
        self.inner.components.borrow_mut().remove(id)
    }

    /// Components attached to `id` and its ancestors, leaf first.
    ///
    /// O(depth). Empty for a detached element.
    pub fn ancestor_components(&self, id: NodeId) -> Vec<Component> {
        let path = self.inner.dom.borrow().ancestors_inclusive(id);
        let components = self.inner.components.borrow();
        path.into_iter()
            .filter_map(|node| components.get(node).cloned())
            .collect()
    }

    // -- focus --------------------------------------------------------------

    /// Focus `id` programmatically. Returns `false` if it cannot take focus.
    pub fn focus(&self, id: NodeId) -> bool {
        self.focus_with(id, FocusOrigin::Programmatic)
    }

    /// Focus `id`, recording how focus arrived.
    pub fn focus_with(&self, id: NodeId, origin: FocusOrigin) -> bool {
        let editable = {
            let dom = self.inner.dom.borrow();
            match dom.get(id) {
                Some(data) if data.can_focus() => data.editable,
                Some(_) => {
                    tracing::debug!(?id, "element cannot take focus");
                    return false;
                }
                None => {
                    tracing::warn!(?id, "focus requested for detached element");
                    return false;
                }
            }
        };
        let visible = match origin {
            FocusOrigin::Keyboard | FocusOrigin::Programmatic => true,
            FocusOrigin::Pointer => editable,
        };

        let previous = self.inner.focus.get();
        let next = FocusState {
            active: Some(id),
            visible,
        };
        if previous == next {
            return true;
        }
        self.inner.focus.set(next);
        tracing::trace!(?id, ?origin, visible, "focus moved");

        if let Some(old) = previous.active.filter(|&old| old != id) {
            self.dispatch(DocumentEvent::FocusOut(old));
        }
        self.dispatch(DocumentEvent::FocusIn(id));
        true
    }

    /// Drop focus. No-op if nothing is focused.
    pub fn blur(&self) {
        let previous = self.inner.focus.replace(FocusState::default());
        if let Some(old) = previous.active {
            self.dispatch(DocumentEvent::FocusOut(old));
        }
    }

    /// The element holding input focus, visible or not.
    pub fn focused(&self) -> Option<NodeId> {
        self.inner.focus.get().active
    }

    /// The element holding *visible* focus, if any.
    pub fn focus_visible_element(&self) -> Option<NodeId> {
        let focus = self.inner.focus.get();
        focus.active.filter(|_| focus.visible)
    }

    /// Move keyboard focus to the next element in tab order.
    pub fn focus_next(&self) -> Option<NodeId> {
        let target = self.with_chain(|chain| chain.next_after(self.focused()))?;
        self.focus_with(target, FocusOrigin::Keyboard).then_some(target)
    }

    /// Move keyboard focus to the previous element in tab order.
    pub fn focus_previous(&self) -> Option<NodeId> {
        let target = self.with_chain(|chain| chain.previous_before(self.focused()))?;
        self.focus_with(target, FocusOrigin::Keyboard).then_some(target)
    }

    fn with_chain<R>(&self, f: impl FnOnce(&FocusChain) -> R) -> R {
        if self.inner.chain_stale.replace(false) {
            self.inner
                .chain
                .borrow_mut()
                .rebuild(&self.inner.dom.borrow());
        }
        f(&self.inner.chain.borrow())
    }

    // -- pointer ------------------------------------------------------------

    /// Current pointer position, `None` if outside the document.
    pub fn pointer(&self) -> Option<Offset> {
        self.inner.pointer.get()
    }

    /// Move the pointer. Dispatches even if the position is unchanged.
    pub fn pointer_move(&self, point: Offset) {
        self.inner.pointer.set(Some(point));
        self.dispatch(DocumentEvent::PointerMove(Some(point)));
    }

    /// The pointer left the document.
    pub fn pointer_leave(&self) {
        if self.inner.pointer.replace(None).is_some() {
            self.dispatch(DocumentEvent::PointerMove(None));
        }
    }

    /// Elements under the pointer, outermost first, innermost last.
    pub fn hover_stack(&self) -> Vec<NodeId> {
        match self.inner.pointer.get() {
            Some(point) => self.inner.dom.borrow().hover_stack(point),
            None => Vec::new(),
        }
    }

    fn refresh_pointer(&self) {
        if let Some(point) = self.inner.pointer.get() {
            self.dispatch(DocumentEvent::PointerMove(Some(point)));
        }
    }

    // -- location -----------------------------------------------------------

    /// The location fragment (the id of the addressed element), if any.
    pub fn fragment(&self) -> &State<Option<String>> {
        &self.inner.fragment
    }

    /// Address the element with the given id and focus it if possible.
    pub fn navigate(&self, fragment: impl Into<String>) -> Option<NodeId> {
        let fragment = fragment.into();
        let target = self.inner.dom.borrow().query_by_id(&fragment);
        self.inner.fragment.set(Some(fragment));
        target.filter(|&id| self.focus(id))
    }

    // -- input --------------------------------------------------------------

    /// Replace the key bindings.
    pub fn set_key_bindings(&self, bindings: KeyBindingRegistry) {
        *self.inner.bindings.borrow_mut() = bindings;
    }

    /// Apply one input event. Returns whether the document acted on it.
    pub fn handle_input(&self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Key(key) => {
                let action = self.inner.bindings.borrow().resolve(key);
                match action {
                    Some(BindingAction::FocusNext) => {
                        self.focus_next();
                        true
                    }
                    Some(BindingAction::FocusPrevious) => {
                        self.focus_previous();
                        true
                    }
                    Some(BindingAction::Blur) => {
                        self.blur();
                        true
                    }
                    None => false,
                }
            }
            InputEvent::Mouse(mouse) => match mouse.kind {
                MouseAction::Moved | MouseAction::Drag(_) => {
                    self.pointer_move(mouse.position());
                    true
                }
                MouseAction::Down(MouseBtn::Left) => {
                    let point = mouse.position();
                    self.pointer_move(point);
                    let target = self.inner.dom.borrow().focusable_at(point);
                    match target {
                        Some(id) => {
                            self.focus_with(id, FocusOrigin::Pointer);
                        }
                        None => self.blur(),
                    }
                    true
                }
                _ => false,
            },
            InputEvent::FocusLost => {
                self.blur();
                self.pointer_leave();
                true
            }
            InputEvent::Resize { .. } | InputEvent::FocusGained | InputEvent::Paste(_) => false,
        }
    }

    // -- listeners ----------------------------------------------------------

    /// Register a listener for focus and pointer events.
    pub fn add_listener(&self, listener: impl Fn(&DocumentEvent) + 'static) -> ListenerId {
        let id = ListenerId::next();
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener, _)| *listener != id);
        listeners.len() != before
    }

    /// Mark the document as listened to. Returns `false` if it already was.
    pub(crate) fn start_listening(&self) -> bool {
        !self.inner.listening.replace(true)
    }

    pub(crate) fn stop_listening(&self) {
        self.inner.listening.set(false);
    }

    /// Whether an input context is attached.
    pub fn is_listening(&self) -> bool {
        self.inner.listening.get()
    }

    fn dispatch(&self, event: DocumentEvent) {
        let listeners: Vec<DocumentListener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        tracing::trace!(?event, listeners = listeners.len(), "dispatch");
        for listener in listeners {
            listener(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::input::{Key, KeyEvent, Modifiers, MouseEvent};
    use pretty_assertions::assert_eq;

    fn recorder(doc: &Document) -> Rc<RefCell<Vec<DocumentEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        doc.add_listener(move |event| sink.borrow_mut().push(*event));
        log
    }

    /// ```text
    /// root (0,0 20x10)
    /// ├── button (0,0 5x1, focusable)
    /// └── input  (0,1 5x1, editable)
    /// ```
    fn setup() -> (Document, NodeId, NodeId, NodeId) {
        let doc = Document::new();
        let root = doc.insert_root(NodeData::new("Screen").with_region(Region::new(0, 0, 20, 10)));
        let button = doc
            .insert_child(
                root,
                NodeData::new("Button")
                    .with_id("ok")
                    .focusable(true)
                    .with_region(Region::new(0, 0, 5, 1)),
            )
            .unwrap();
        let input = doc
            .insert_child(
                root,
                NodeData::new("Input")
                    .editable(true)
                    .with_region(Region::new(0, 1, 5, 1)),
            )
            .unwrap();
        (doc, root, button, input)
    }

    #[test]
    fn focus_dispatches_out_then_in() {
        let (doc, _root, button, input) = setup();
        let log = recorder(&doc);
        assert!(doc.focus(button));
        assert!(doc.focus(input));
        assert_eq!(
            *log.borrow(),
            vec![
                DocumentEvent::FocusIn(button),
                DocumentEvent::FocusOut(button),
                DocumentEvent::FocusIn(input),
            ]
        );
    }

    #[test]
    fn refocusing_same_element_is_silent() {
        let (doc, _root, button, _input) = setup();
        let log = recorder(&doc);
        doc.focus(button);
        doc.focus(button);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn non_focusable_element_is_refused() {
        let (doc, root, ..) = setup();
        assert!(!doc.focus(root));
        assert_eq!(doc.focused(), None);
    }

    #[test]
    fn pointer_focus_visible_only_on_editable() {
        let (doc, _root, button, input) = setup();
        doc.focus_with(button, FocusOrigin::Pointer);
        assert_eq!(doc.focused(), Some(button));
        assert_eq!(doc.focus_visible_element(), None);

        doc.focus_with(input, FocusOrigin::Pointer);
        assert_eq!(doc.focus_visible_element(), Some(input));
    }

    #[test]
    fn blur_clears_focus() {
        let (doc, _root, button, _input) = setup();
        doc.focus(button);
        let log = recorder(&doc);
        doc.blur();
        doc.blur();
        assert_eq!(doc.focused(), None);
        assert_eq!(*log.borrow(), vec![DocumentEvent::FocusOut(button)]);
    }

    #[test]
    fn removing_focused_subtree_blurs() {
        let (doc, _root, button, _input) = setup();
        doc.focus(button);
        let log = recorder(&doc);
        assert_eq!(doc.remove(button), vec![button]);
        assert_eq!(doc.focused(), None);
        assert_eq!(*log.borrow(), vec![DocumentEvent::FocusOut(button)]);
    }

    #[test]
    fn tab_navigation_through_handle_input() {
        let (doc, _root, button, input) = setup();
        let tab = InputEvent::Key(KeyEvent::new(Key::Tab, Modifiers::NONE));
        assert!(doc.handle_input(&tab));
        assert_eq!(doc.focused(), Some(button));
        doc.handle_input(&tab);
        assert_eq!(doc.focused(), Some(input));
        doc.handle_input(&InputEvent::Key(KeyEvent::new(Key::BackTab, Modifiers::SHIFT)));
        assert_eq!(doc.focused(), Some(button));
        assert_eq!(doc.focus_visible_element(), Some(button));

        doc.handle_input(&InputEvent::Key(KeyEvent::new(Key::Escape, Modifiers::NONE)));
        assert_eq!(doc.focused(), None);
        assert!(!doc.handle_input(&InputEvent::Key(KeyEvent::new(Key::Char('x'), Modifiers::NONE))));
    }

    #[test]
    fn focus_chain_follows_tree_changes() {
        let (doc, root, button, _input) = setup();
        doc.focus_next();
        let late = doc
            .insert_child(root, NodeData::new("Button").focusable(true))
            .unwrap();
        doc.remove(button);
        assert_eq!(doc.focus_next(), doc.with_dom(|dom| dom.children(root).first().copied()));
        assert_eq!(doc.focus_previous(), Some(late));
    }

    #[test]
    fn click_focuses_innermost_focusable() {
        let (doc, _root, button, _input) = setup();
        doc.handle_input(&InputEvent::Mouse(MouseEvent::new(
            MouseAction::Down(MouseBtn::Left),
            1,
            0,
        )));
        assert_eq!(doc.focused(), Some(button));
        assert_eq!(doc.pointer(), Some(Offset::new(1, 0)));

        doc.handle_input(&InputEvent::Mouse(MouseEvent::new(
            MouseAction::Down(MouseBtn::Left),
            10,
            5,
        )));
        assert_eq!(doc.focused(), None);
    }

    #[test]
    fn hover_stack_follows_pointer() {
        let (doc, root, button, _input) = setup();
        assert!(doc.hover_stack().is_empty());
        doc.pointer_move(Offset::new(2, 0));
        assert_eq!(doc.hover_stack(), vec![root, button]);
        doc.pointer_leave();
        assert!(doc.hover_stack().is_empty());
    }

    #[test]
    fn terminal_focus_lost_blurs_and_leaves() {
        let (doc, _root, button, _input) = setup();
        doc.focus(button);
        doc.pointer_move(Offset::new(0, 0));
        assert!(doc.handle_input(&InputEvent::FocusLost));
        assert_eq!(doc.focused(), None);
        assert_eq!(doc.pointer(), None);
    }

    #[test]
    fn tree_mutation_refreshes_pointer() {
        let (doc, _root, button, _input) = setup();
        doc.pointer_move(Offset::new(1, 0));
        let log = recorder(&doc);
        doc.set_region(button, Region::new(10, 0, 5, 1));
        assert_eq!(
            *log.borrow(),
            vec![DocumentEvent::PointerMove(Some(Offset::new(1, 0)))]
        );
    }

    #[test]
    fn navigate_sets_fragment_and_focuses() {
        let (doc, _root, button, _input) = setup();
        assert_eq!(doc.navigate("ok"), Some(button));
        assert_eq!(doc.fragment().get().as_deref(), Some("ok"));
        assert_eq!(doc.navigate("missing"), None);
    }

    #[test]
    fn listener_may_reenter_document() {
        let (doc, _root, button, input) = setup();
        let weak = doc.downgrade();
        doc.add_listener(move |event| {
            if *event == DocumentEvent::FocusIn(button) {
                if let Some(doc) = weak.upgrade() {
                    doc.focus(input);
                }
            }
        });
        doc.focus(button);
        assert_eq!(doc.focused(), Some(input));
    }

    #[test]
    fn remove_listener() {
        let (doc, _root, button, _input) = setup();
        let log = Rc::new(Cell::new(0));
        let sink = Rc::clone(&log);
        let id = doc.add_listener(move |_| sink.set(sink.get() + 1));
        assert!(doc.remove_listener(id));
        assert!(!doc.remove_listener(id));
        doc.focus(button);
        assert_eq!(log.get(), 0);
    }

    #[test]
    fn insert_under_missing_parent_is_an_error() {
        let (doc, _root, button, _input) = setup();
        doc.remove(button);
        assert!(matches!(
            doc.insert_child(button, NodeData::new("X")),
            Err(Error::DetachedElement(id)) if id == button
        ));
    }
}
