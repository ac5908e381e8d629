//! Error types.
//!
//! Almost nothing in this crate fails outward: subscriber failures are
//! contained inside the notification round and degraded lookups return
//! `None`. The few operations that can be misused return [`Error`].

use crate::dom::node::NodeId;
use crate::reactive::SubscriptionId;

/// Boxed error produced by a fallible subscriber.
pub type BoxError = Box<dyn std::error::Error + 'static>;

/// Errors returned by the misuse-prone entry points.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `InputContext::listen` was called twice for the same document.
    #[error("document input is already being listened to")]
    AlreadyListening,
    /// The element does not exist in the document (never inserted or removed).
    #[error("element {0:?} is not part of the document")]
    DetachedElement(NodeId),
    /// The element already has a component attached.
    #[error("element {0:?} already has a component attached")]
    ComponentExists(NodeId),
}

/// A subscriber failed during a notification round.
///
/// These are logged and never returned to the caller of `set`/`emit`; the
/// type exists so that the log record carries the failing subscription.
#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    /// The callback returned an error.
    #[error("subscriber {id} returned an error: {source}")]
    Failed {
        id: SubscriptionId,
        #[source]
        source: BoxError,
    },
    /// The callback panicked.
    #[error("subscriber {id} panicked: {message}")]
    Panicked { id: SubscriptionId, message: String },
}

impl CallbackError {
    /// The subscription whose callback failed.
    pub fn subscription(&self) -> SubscriptionId {
        match self {
            CallbackError::Failed { id, .. } | CallbackError::Panicked { id, .. } => *id,
        }
    }
}
