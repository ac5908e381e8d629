//! Reactive state: value cells, derived views, owners, subscriptions.
//!
//! - [`State`] / [`ReadState`]: a value cell with synchronous, ordered,
//!   equality-deduplicated change notification, and read-only derived views
//!   via [`ReadState::map`].
//! - [`Owner`]: the disposable entity subscriptions are registered for. Held
//!   weakly by every container.
//! - [`Subscription`]: the disposer each subscribe call returns.
//! - [`Listener`]: a shared callback with identity, for de-duplicated
//!   subscriptions.

pub mod owner;
pub mod state;

pub use owner::{Owner, Subscription, SubscriptionId};
pub use state::{Listener, ReadState, State, StateId};
