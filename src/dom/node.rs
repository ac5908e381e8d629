//! Node types: NodeId, NodeData.

use std::collections::BTreeMap;

use slotmap::new_key_type;

use crate::geometry::Region;

new_key_type! {
    /// Unique identifier for a DOM node. Copy, lightweight (u64).
    pub struct NodeId;
}

/// Data associated with a single DOM node.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Element type name (e.g. "Button", "Container").
    pub widget_type: String,
    /// Optional unique id (also the target of a location fragment).
    pub id: Option<String>,
    /// Concrete class names, in insertion order.
    pub classes: Vec<String>,
    /// Inline style properties and custom properties (`--name`).
    pub style: BTreeMap<String, String>,
    /// Whether this node is visible.
    pub visible: bool,
    /// Whether this node can receive focus.
    pub focusable: bool,
    /// Whether this node is disabled.
    pub disabled: bool,
    /// Whether this node accepts text entry. Pointer focus on an editable
    /// node is shown as visible focus.
    pub editable: bool,
    /// Laid-out region, if the node has been laid out. Unlaid nodes are
    /// never hit by the pointer.
    pub region: Option<Region>,
}

impl NodeData {
    /// Create a new `NodeData` with the given type and sensible defaults.
    pub fn new(widget_type: impl Into<String>) -> Self {
        Self {
            widget_type: widget_type.into(),
            id: None,
            classes: Vec::new(),
            style: BTreeMap::new(),
            visible: true,
            focusable: false,
            disabled: false,
            editable: false,
            region: None,
        }
    }

    /// Set the id (builder).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a single class (builder).
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Set the laid-out region (builder).
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Set whether this node can receive focus (builder).
    pub fn focusable(mut self, focusable: bool) -> Self {
        self.focusable = focusable;
        self
    }

    /// Set whether this node is disabled (builder).
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Mark this node as a text-entry node (builder). Implies focusable.
    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        if editable {
            self.focusable = true;
        }
        self
    }

    /// Whether focus can currently land on this node.
    pub fn can_focus(&self) -> bool {
        self.focusable && self.visible && !self.disabled
    }

    /// Check whether this node has a given class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Add a class. Returns `false` if it was already present.
    pub fn add_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            return false;
        }
        self.classes.push(class.to_owned());
        true
    }

    /// Remove a class. Returns `false` if it was not present.
    pub fn remove_class(&mut self, class: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|c| c != class);
        self.classes.len() != before
    }

    /// Read an inline style property.
    pub fn style_property(&self, name: &str) -> Option<&str> {
        self.style.get(name).map(String::as_str)
    }

    /// Set (`Some`) or clear (`None`) an inline style property. Returns
    /// whether the stored style changed.
    pub fn set_style_property(&mut self, name: &str, value: Option<&str>) -> bool {
        match value {
            Some(value) => {
                if self.style.get(name).map(String::as_str) == Some(value) {
                    return false;
                }
                self.style.insert(name.to_owned(), value.to_owned());
                true
            }
            None => self.style.remove(name).is_some(),
        }
    }
}
