//! Owners and subscription disposers.
//!
//! Every subscription is registered on behalf of an [`Owner`]. Containers hold
//! owners *weakly*: a subscription never keeps its owner alive, and a slot
//! whose owner is gone is skipped and pruned. Disposing an owner (explicitly
//! or by dropping its last handle) unsubscribes everything it owns, in any
//! order relative to the containers' own destruction.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

// ---------------------------------------------------------------------------
// SubscriptionId
// ---------------------------------------------------------------------------

static NEXT_SUBSCRIPTION: AtomicU64 = AtomicU64::new(1);

/// Identifies one subscription slot. Unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn next() -> Self {
        Self(NEXT_SUBSCRIPTION.fetch_add(1, Ordering::Relaxed))
    }

    /// Build an id from its raw value (diagnostics and tests).
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Type-erased view of a container's subscriber list.
pub(crate) trait SubscriberList {
    /// Remove the slot. Returns `true` if it was present.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Whether the slot is still registered.
    fn is_subscribed(&self, id: SubscriptionId) -> bool;
}

/// Disposer for one subscription.
///
/// Dropping a `Subscription` does **not** unsubscribe: the subscription lives
/// until [`unsubscribe`](Subscription::unsubscribe) is called or its owner is
/// disposed. Cloning yields another handle to the same slot.
#[derive(Clone)]
pub struct Subscription {
    id: SubscriptionId,
    list: Option<Weak<dyn SubscriberList>>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, list: Weak<dyn SubscriberList>) -> Self {
        Self {
            id,
            list: Some(list),
        }
    }

    /// A subscription that was never registered (e.g. the owner was already
    /// disposed when subscribing).
    pub(crate) fn inert(id: SubscriptionId) -> Self {
        Self { id, list: None }
    }

    /// The slot this handle refers to.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove the callback from its container.
    ///
    /// Takes effect for every later notification round. Idempotent, and a
    /// no-op if the container has already been dropped. Returns `true` if a
    /// slot was actually removed.
    pub fn unsubscribe(&self) -> bool {
        match self.list.as_ref().and_then(Weak::upgrade) {
            Some(list) => list.unsubscribe(self.id),
            None => false,
        }
    }

    /// Whether the slot is still registered on a live container.
    pub fn is_active(&self) -> bool {
        self.list
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some_and(|list| list.is_subscribed(self.id))
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Owner
// ---------------------------------------------------------------------------

struct OwnerInner {
    label: String,
    disposers: RefCell<Vec<Subscription>>,
    disposed: Cell<bool>,
}

impl Drop for OwnerInner {
    fn drop(&mut self) {
        for subscription in self.disposers.get_mut().drain(..) {
            subscription.unsubscribe();
        }
    }
}

/// The entity on whose behalf subscriptions exist.
///
/// `Owner` is a cheap, cloneable handle. Containers only ever hold it weakly.
#[derive(Clone)]
pub struct Owner {
    inner: Rc<OwnerInner>,
}

impl Owner {
    /// Create a live owner. The label only shows up in logs and `Debug`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(OwnerInner {
                label: label.into(),
                disposers: RefCell::new(Vec::new()),
                disposed: Cell::new(false),
            }),
        }
    }

    /// The owner's label.
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Whether [`dispose`](Owner::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Unsubscribe everything this owner holds. Idempotent.
    ///
    /// Subscribing with a disposed owner afterwards registers nothing.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        let disposers = std::mem::take(&mut *self.inner.disposers.borrow_mut());
        tracing::trace!(owner = %self.inner.label, count = disposers.len(), "disposing owner");
        for subscription in disposers {
            subscription.unsubscribe();
        }
    }

    /// Number of subscriptions this owner still has registered.
    pub fn subscription_count(&self) -> usize {
        self.inner
            .disposers
            .borrow()
            .iter()
            .filter(|s| s.is_active())
            .count()
    }

    /// Whether two handles refer to the same owner.
    pub fn ptr_eq(&self, other: &Owner) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn downgrade(&self) -> WeakOwner {
        WeakOwner(Rc::downgrade(&self.inner))
    }

    /// Record a disposer. Stale disposers are pruned on the way.
    pub(crate) fn adopt(&self, subscription: Subscription) {
        let mut disposers = self.inner.disposers.borrow_mut();
        disposers.retain(Subscription::is_active);
        disposers.push(subscription);
    }
}

impl fmt::Debug for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Owner")
            .field("label", &self.inner.label)
            .field("disposed", &self.inner.disposed.get())
            .finish()
    }
}

/// Weak back-reference from a slot to its owner.
#[derive(Clone)]
pub(crate) struct WeakOwner(Weak<OwnerInner>);

impl WeakOwner {
    /// Alive means: not dropped and not disposed.
    pub(crate) fn is_alive(&self) -> bool {
        self.0.upgrade().is_some_and(|inner| !inner.disposed.get())
    }

    pub(crate) fn is(&self, owner: &Owner) -> bool {
        std::ptr::eq(self.0.as_ptr(), Rc::as_ptr(&owner.inner))
    }
}
