//! `State<T>`: a reactive value cell.
//!
//! A state holds one value and an ordered list of subscriber slots. Writing a
//! different value (by `PartialEq`) runs a *notification round*: every slot
//! registered at the start of the round is invoked once, in registration
//! order, synchronously, before `set` returns. Writing an equal value does
//! nothing unless [`emit`](ReadState::emit) forces a round.
//!
//! Each `State` owns its subscriber list directly. States can be created and
//! dropped freely; nothing registers them anywhere else.
//!
//! # Round semantics
//!
//! - The subscriber list is snapshotted when the round starts. Slots added
//!   during the round are not invoked until the next one; slots removed
//!   during the round are still invoked in this one.
//! - A slot whose owner is dropped or disposed is skipped and pruned.
//! - A failing or panicking callback is logged and the round continues.
//! - A callback that is already running (it re-entered its own container)
//!   is skipped for the nested round.
//! - A round started from inside another round of the same state supersedes
//!   it: the outer round stops once the nested one returns, so no slot sees
//!   a value older than one it has already been given.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::ops::Deref;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use super::owner::{Owner, SubscriberList, Subscription, SubscriptionId, WeakOwner};
use crate::error::{BoxError, CallbackError};

// ---------------------------------------------------------------------------
// StateId
// ---------------------------------------------------------------------------

static NEXT_STATE: AtomicU64 = AtomicU64::new(1);

/// Identity of one state cell. Clones of a handle share the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(u64);

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Slots and listeners
// ---------------------------------------------------------------------------

type Callback<T> = dyn FnMut(&T) -> Result<(), BoxError>;
type SharedCallback<T> = Rc<RefCell<Box<Callback<T>>>>;

struct Slot<T> {
    id: SubscriptionId,
    /// `None` for internal links (derived views), which are never owner-scoped.
    owner: Option<WeakOwner>,
    callback: SharedCallback<T>,
}

impl<T> Slot<T> {
    fn is_live(&self) -> bool {
        self.owner.as_ref().is_none_or(WeakOwner::is_alive)
    }
}

/// A shareable callback with identity.
///
/// Subscribing the same listener for the same owner to the same state twice
/// returns the existing subscription instead of registering a second slot.
pub struct Listener<T: 'static> {
    callback: SharedCallback<T>,
}

impl<T: 'static> Listener<T> {
    /// Wrap an infallible callback.
    pub fn new(mut f: impl FnMut(&T) + 'static) -> Self {
        Self::fallible(move |value: &T| {
            f(value);
            Ok::<(), BoxError>(())
        })
    }

    /// Wrap a fallible callback. Errors are logged by the notification round.
    pub fn fallible<E>(mut f: impl FnMut(&T) -> Result<(), E> + 'static) -> Self
    where
        E: Into<BoxError>,
    {
        let boxed: Box<Callback<T>> = Box::new(move |value: &T| f(value).map_err(Into::into));
        Self {
            callback: Rc::new(RefCell::new(boxed)),
        }
    }

    fn ptr_eq(&self, callback: &SharedCallback<T>) -> bool {
        Rc::ptr_eq(&self.callback, callback)
    }
}

impl<T: 'static> Clone for Listener<T> {
    fn clone(&self) -> Self {
        Self {
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<T: 'static> fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("ptr", &Rc::as_ptr(&self.callback))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Inner cell
// ---------------------------------------------------------------------------

/// Keeps a derived view's upstream alive and linked.
struct Upstream {
    _source: Rc<dyn Any>,
    subscription: Subscription,
}

impl Drop for Upstream {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}

struct StateInner<T> {
    id: StateId,
    value: RefCell<T>,
    slots: RefCell<Vec<Rc<Slot<T>>>>,
    upstream: RefCell<Option<Upstream>>,
    /// Bumped at the start of every round.
    round: Cell<u64>,
}

impl<T: 'static> StateInner<T> {
    fn new(value: T) -> Rc<Self> {
        Rc::new(Self {
            id: StateId(NEXT_STATE.fetch_add(1, Ordering::Relaxed)),
            value: RefCell::new(value),
            slots: RefCell::new(Vec::new()),
            upstream: RefCell::new(None),
            round: Cell::new(0),
        })
    }

    fn register(self: &Rc<Self>, owner: Option<&Owner>, callback: SharedCallback<T>) -> Subscription {
        let id = SubscriptionId::next();
        if let Some(owner) = owner {
            if owner.is_disposed() {
                tracing::warn!(state = %self.id, owner = owner.label(), "subscribe with disposed owner ignored");
                return Subscription::inert(id);
            }
        }
        self.slots.borrow_mut().push(Rc::new(Slot {
            id,
            owner: owner.map(Owner::downgrade),
            callback,
        }));
        let list: Weak<Self> = Rc::downgrade(self);
        let subscription = Subscription::new(id, list);
        if let Some(owner) = owner {
            owner.adopt(subscription.clone());
        }
        subscription
    }

    fn prune(&self) {
        self.slots.borrow_mut().retain(|slot| slot.is_live());
    }
}

impl<T: Clone + 'static> StateInner<T> {
    /// Run one notification round with the current value.
    fn notify(&self) {
        let snapshot: Vec<Rc<Slot<T>>> = self.slots.borrow().clone();
        if snapshot.is_empty() {
            return;
        }
        let round = self.round.get().wrapping_add(1);
        self.round.set(round);
        let value = self.value.borrow().clone();
        let mut saw_dead = false;

        for slot in snapshot {
            if self.round.get() != round {
                tracing::trace!(state = %self.id, "round superseded by a nested round");
                break;
            }
            if !slot.is_live() {
                saw_dead = true;
                continue;
            }
            let Ok(mut callback) = slot.callback.try_borrow_mut() else {
                tracing::debug!(state = %self.id, subscription = %slot.id, "skipping re-entered subscriber");
                continue;
            };
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| (&mut **callback)(&value)));
            drop(callback);

            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(source)) => Some(CallbackError::Failed { id: slot.id, source }),
                Err(payload) => Some(CallbackError::Panicked {
                    id: slot.id,
                    message: panic_message(payload.as_ref()),
                }),
            };
            match failure {
                Some(err @ CallbackError::Failed { .. }) => {
                    tracing::warn!(state = %self.id, error = %err, "subscriber failed");
                }
                Some(err @ CallbackError::Panicked { .. }) => {
                    tracing::error!(state = %self.id, error = %err, "subscriber panicked");
                }
                None => {}
            }
        }

        if saw_dead {
            self.prune();
        }
    }
}

impl<T: Clone + PartialEq + 'static> StateInner<T> {
    /// Store `value`; notify if it differs from the current one.
    fn store(&self, value: T) -> bool {
        {
            let mut current = self.value.borrow_mut();
            if *current == value {
                return false;
            }
            *current = value;
        }
        self.notify();
        true
    }
}

impl<T: 'static> SubscriberList for StateInner<T> {
    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut slots = self.slots.borrow_mut();
        let before = slots.len();
        slots.retain(|slot| slot.id != id);
        slots.len() != before
    }

    fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.slots.borrow().iter().any(|slot| slot.id == id)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

// ---------------------------------------------------------------------------
// ReadState
// ---------------------------------------------------------------------------

/// Read-only handle to a state cell.
///
/// Returned by [`State::read_only`] and [`ReadState::map`]. Cloning yields
/// another handle to the same cell.
pub struct ReadState<T: 'static> {
    inner: Rc<StateInner<T>>,
}

impl<T: 'static> Clone for ReadState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for ReadState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadState")
            .field("id", &self.inner.id)
            .field("value", &*self.inner.value.borrow())
            .field("subscribers", &self.inner.slots.borrow().len())
            .finish()
    }
}

impl<T: 'static> ReadState<T> {
    /// Identity of the underlying cell.
    pub fn id(&self) -> StateId {
        self.inner.id
    }

    /// Read the current value by reference.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Whether both handles point at the same cell.
    pub fn ptr_eq(&self, other: &ReadState<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether the cell is a derived view of another state.
    pub fn is_derived(&self) -> bool {
        self.inner.upstream.borrow().is_some()
    }

    /// Whether any live subscriber is registered ("listening").
    pub fn is_observed(&self) -> bool {
        self.inner.slots.borrow().iter().any(|slot| slot.is_live())
    }

    /// Number of registered slots, including ones whose owner has died but
    /// that have not been pruned yet.
    pub fn subscriber_count(&self) -> usize {
        self.inner.slots.borrow().len()
    }

    /// Register `f` for future changes on behalf of `owner`.
    pub fn subscribe(&self, owner: &Owner, mut f: impl FnMut(&T) + 'static) -> Subscription {
        let boxed: Box<Callback<T>> = Box::new(move |value: &T| {
            f(value);
            Ok(())
        });
        self.inner.register(Some(owner), Rc::new(RefCell::new(boxed)))
    }

    /// Register a fallible callback. An `Err` is logged and does not stop
    /// the remaining subscribers of the round.
    pub fn try_subscribe<E>(
        &self,
        owner: &Owner,
        mut f: impl FnMut(&T) -> Result<(), E> + 'static,
    ) -> Subscription
    where
        E: Into<BoxError>,
    {
        let boxed: Box<Callback<T>> = Box::new(move |value: &T| f(value).map_err(Into::into));
        self.inner.register(Some(owner), Rc::new(RefCell::new(boxed)))
    }

    /// Register a shared listener, unless this owner already registered the
    /// same listener here, in which case the existing subscription is
    /// returned.
    pub fn subscribe_listener(&self, owner: &Owner, listener: &Listener<T>) -> Subscription {
        let existing = self
            .inner
            .slots
            .borrow()
            .iter()
            .find(|slot| {
                listener.ptr_eq(&slot.callback)
                    && slot.owner.as_ref().is_some_and(|o| o.is(owner) && o.is_alive())
            })
            .map(|slot| slot.id);
        if let Some(id) = existing {
            tracing::debug!(state = %self.inner.id, subscription = %id, "listener already subscribed");
            let list: Weak<StateInner<T>> = Rc::downgrade(&self.inner);
            return Subscription::new(id, list);
        }
        self.inner
            .register(Some(owner), Rc::clone(&listener.callback))
    }
}

impl<T: Clone + 'static> ReadState<T> {
    /// Clone out the current value.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Force a notification round with the current value, even if unchanged.
    ///
    /// Derived views recompute and only propagate further if their own value
    /// changed.
    pub fn emit(&self) {
        self.inner.notify();
    }

    /// Invoke `f` with the current value now, then on every future change.
    pub fn observe(&self, owner: &Owner, mut f: impl FnMut(&T) + 'static) -> Subscription {
        let current = self.get();
        f(&current);
        self.subscribe(owner, f)
    }

    /// Derive a read-only view whose value is always `f(upstream)`.
    ///
    /// The view holds its upstream alive; the upstream only holds the view
    /// weakly, so dropping every handle to the view unlinks it.
    pub fn map<U>(&self, f: impl Fn(&T) -> U + 'static) -> ReadState<U>
    where
        U: Clone + PartialEq + 'static,
    {
        let derived = StateInner::new(self.with(&f));
        let weak = Rc::downgrade(&derived);
        let link: Box<Callback<T>> = Box::new(move |value: &T| {
            if let Some(derived) = weak.upgrade() {
                derived.store(f(value));
            }
            Ok(())
        });
        let subscription = self.inner.register(None, Rc::new(RefCell::new(link)));
        let source: Rc<dyn Any> = self.inner.clone();
        *derived.upstream.borrow_mut() = Some(Upstream {
            _source: source,
            subscription,
        });
        ReadState { inner: derived }
    }
}

impl<T: fmt::Display + 'static> fmt::Display for ReadState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|v| fmt::Display::fmt(v, f))
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Writable handle to a state cell.
///
/// Dereferences to [`ReadState`] for reading and subscribing.
pub struct State<T: 'static> {
    read: ReadState<T>,
}

impl<T: 'static> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            read: self.read.clone(),
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("id", &self.read.inner.id)
            .field("value", &*self.read.inner.value.borrow())
            .field("subscribers", &self.read.inner.slots.borrow().len())
            .finish()
    }
}

impl<T: Default + 'static> Default for State<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: 'static> Deref for State<T> {
    type Target = ReadState<T>;

    fn deref(&self) -> &ReadState<T> {
        &self.read
    }
}

impl<T: 'static> State<T> {
    /// Create a state holding `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            read: ReadState {
                inner: StateInner::new(initial),
            },
        }
    }

    /// A read-only handle to the same cell.
    pub fn read_only(&self) -> ReadState<T> {
        self.read.clone()
    }
}

impl<T: Clone + PartialEq + 'static> State<T> {
    /// Store `value`. Runs a notification round only if it differs from the
    /// current value. Returns whether it changed.
    pub fn set(&self, value: T) -> bool {
        self.read.inner.store(value)
    }

    /// Mutate in place, then notify if the result differs from before.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        let next = {
            let mut next = self.read.inner.value.borrow().clone();
            f(&mut next);
            next
        };
        self.set(next)
    }
}

impl<T: Clone + PartialEq + 'static> From<T> for State<T> {
    fn from(value: T) -> Self {
        State::new(value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
