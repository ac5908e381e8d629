//! The input context: one per document, wiring trackers to document events.

use std::fmt;
use std::rc::Rc;

use super::focus::FocusTracker;
use super::hover::HoverTracker;
use crate::dom::{Document, WeakDocument};
use crate::error::Error;
use crate::event::{DocumentEvent, ListenerId};

// ---------------------------------------------------------------------------
// TrackerConfig
// ---------------------------------------------------------------------------

/// Which trackers an [`InputContext`] drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Follow focus and maintain `focused` / `has_focused`.
    pub focus: bool,
    /// Follow the pointer and maintain `hovered`.
    pub hover: bool,
    /// Drop the location fragment when focus moves off the addressed element.
    pub clear_fragment: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            focus: true,
            hover: true,
            clear_fragment: true,
        }
    }
}

impl TrackerConfig {
    /// Create a new default config (everything enabled).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable focus tracking (builder).
    pub fn with_focus(mut self, enabled: bool) -> Self {
        self.focus = enabled;
        self
    }

    /// Enable or disable hover tracking (builder).
    pub fn with_hover(mut self, enabled: bool) -> Self {
        self.hover = enabled;
        self
    }

    /// Enable or disable fragment clearing (builder).
    pub fn with_clear_fragment(mut self, enabled: bool) -> Self {
        self.clear_fragment = enabled;
        self
    }
}

// ---------------------------------------------------------------------------
// InputContext
// ---------------------------------------------------------------------------

/// Owns the focus and hover trackers of one document.
///
/// Created once per document with [`InputContext::listen`]; dropping it
/// detaches the trackers so the document can be listened to again.
pub struct InputContext {
    document: WeakDocument,
    focus: Rc<FocusTracker>,
    hover: Rc<HoverTracker>,
    listener: ListenerId,
    config: TrackerConfig,
}

impl InputContext {
    /// Start tracking `document`.
    ///
    /// The trackers are synchronised with the document's current focus and
    /// pointer before this returns. Fails with [`Error::AlreadyListening`] if
    /// another context is attached to the same document.
    pub fn listen(document: &Document, config: TrackerConfig) -> Result<InputContext, Error> {
        if !document.start_listening() {
            tracing::warn!("input context already attached to this document");
            return Err(Error::AlreadyListening);
        }

        let focus = Rc::new(FocusTracker::new(document, config.clear_fragment));
        let hover = Rc::new(HoverTracker::new(document));
        let focus_hook = config.focus.then(|| Rc::clone(&focus));
        let hover_hook = config.hover.then(|| Rc::clone(&hover));
        let listener = document.add_listener(move |event| match event {
            DocumentEvent::FocusIn(_) | DocumentEvent::FocusOut(_) => {
                if let Some(focus) = &focus_hook {
                    focus.update();
                }
            }
            DocumentEvent::PointerMove(_) => {
                if let Some(hover) = &hover_hook {
                    hover.update();
                }
            }
        });
        tracing::debug!(%listener, focus = config.focus, hover = config.hover, "input context listening");

        if config.focus {
            focus.update();
        }
        if config.hover {
            hover.update();
        }

        Ok(InputContext {
            document: document.downgrade(),
            focus,
            hover,
            listener,
            config,
        })
    }

    /// The focus tracker. Idle if focus tracking is disabled.
    pub fn focus(&self) -> &FocusTracker {
        &self.focus
    }

    /// The hover tracker. Idle if hover tracking is disabled.
    pub fn hover(&self) -> &HoverTracker {
        &self.hover
    }

    /// The configuration this context was created with.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// The tracked document, if still alive.
    pub fn document(&self) -> Option<Document> {
        self.document.upgrade()
    }
}

impl Drop for InputContext {
    fn drop(&mut self) {
        if let Some(document) = self.document.upgrade() {
            document.remove_listener(self.listener);
            document.stop_listening();
            tracing::debug!(listener = %self.listener, "input context detached");
        }
    }
}

impl fmt::Debug for InputContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputContext")
            .field("listener", &self.listener)
            .field("config", &self.config)
            .field("focused", &self.focus.focused())
            .field("hovered", &self.hover.hovered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::dom::NodeData;
    use crate::geometry::{Offset, Region};
    use crate::reactive::Owner;

    fn setup() -> (Document, Component) {
        let doc = Document::new();
        let root = doc.insert_root(NodeData::new("Screen").with_region(Region::new(0, 0, 10, 10)));
        let button = doc
            .insert_child(
                root,
                NodeData::new("Button")
                    .focusable(true)
                    .with_region(Region::new(0, 0, 4, 1)),
            )
            .unwrap();
        let component = Component::attach(&doc, button).unwrap();
        (doc, component)
    }

    #[test]
    fn config_builder() {
        let config = TrackerConfig::new().with_hover(false).with_clear_fragment(false);
        assert!(config.focus);
        assert!(!config.hover);
        assert!(!config.clear_fragment);
        assert_eq!(TrackerConfig::default(), TrackerConfig::new());
    }

    #[test]
    fn listen_twice_fails() {
        let (doc, _) = setup();
        let _ctx = InputContext::listen(&doc, TrackerConfig::default()).unwrap();
        assert!(doc.is_listening());
        assert!(matches!(
            InputContext::listen(&doc, TrackerConfig::default()),
            Err(Error::AlreadyListening)
        ));
    }

    #[test]
    fn dropping_context_allows_relisten() {
        let (doc, button) = setup();
        let ctx = InputContext::listen(&doc, TrackerConfig::default()).unwrap();
        drop(ctx);
        assert!(!doc.is_listening());
        doc.focus(button.element());
        assert!(!button.focused().get());
        let ctx = InputContext::listen(&doc, TrackerConfig::default()).unwrap();
        assert!(button.focused().get());
        assert_eq!(ctx.focus().focused(), Some(button.element()));
    }

    #[test]
    fn listen_syncs_existing_state() {
        let (doc, button) = setup();
        let owner = Owner::new("observer");
        button.hovered().subscribe(&owner, |_| {});
        doc.pointer_move(Offset::new(1, 0));
        let ctx = InputContext::listen(&doc, TrackerConfig::default()).unwrap();
        assert_eq!(ctx.hover().hovered(), Some(button.element()));
        assert!(button.hovered().get());
    }

    #[test]
    fn disabled_trackers_stay_idle() {
        let (doc, button) = setup();
        let ctx = InputContext::listen(&doc, TrackerConfig::new().with_focus(false)).unwrap();
        doc.focus(button.element());
        assert_eq!(ctx.focus().focused(), None);
        assert!(!button.focused().get());
        assert!(!ctx.focus().has_focus().get());
    }
}
