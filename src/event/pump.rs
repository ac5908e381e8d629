//! Async input pump: feeds input events from a channel into a document.
//!
//! The pump runs on a single-threaded runtime (the document is `!Send`).
//! Each wake-up drains every event already queued before yielding again, so a
//! burst of pointer moves is handled in one turn. The producer side is
//! typically a thread reading `crossterm::event::read()` and forwarding
//! through an [`UnboundedSender`](tokio::sync::mpsc::UnboundedSender).

use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::error::TryRecvError;

use super::input::InputEvent;
use crate::dom::Document;

/// Counters reported when a pump stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    /// Events taken off the channel.
    pub received: usize,
    /// Events the document acted on.
    pub handled: usize,
    /// Number of wake-ups (batches).
    pub batches: usize,
}

/// Drive `document` from `events` until every sender is dropped.
pub async fn pump(document: &Document, mut events: UnboundedReceiver<InputEvent>) -> PumpStats {
    let mut stats = PumpStats::default();
    while let Some(first) = events.recv().await {
        if !drain_batch(document, first, &mut events, &mut stats) {
            break;
        }
    }
    tracing::debug!(
        received = stats.received,
        handled = stats.handled,
        batches = stats.batches,
        "input channel closed"
    );
    stats
}

/// Like [`pump`], but also stops once no event arrives for `idle`.
pub async fn pump_until_idle(
    document: &Document,
    mut events: UnboundedReceiver<InputEvent>,
    idle: Duration,
) -> PumpStats {
    let mut stats = PumpStats::default();
    loop {
        match tokio::time::timeout(idle, events.recv()).await {
            Ok(Some(first)) => {
                if !drain_batch(document, first, &mut events, &mut stats) {
                    break;
                }
            }
            Ok(None) => break,
            Err(_) => {
                tracing::trace!(?idle, "input pump idle");
                break;
            }
        }
    }
    stats
}

/// Handle `first` and everything already queued behind it. Returns `false`
/// if the channel turned out to be closed.
fn drain_batch(
    document: &Document,
    first: InputEvent,
    events: &mut UnboundedReceiver<InputEvent>,
    stats: &mut PumpStats,
) -> bool {
    stats.batches += 1;
    let mut next = Some(first);
    while let Some(event) = next.take() {
        stats.received += 1;
        if document.handle_input(&event) {
            stats.handled += 1;
        }
        match events.try_recv() {
            Ok(event) => next = Some(event),
            Err(TryRecvError::Empty) => return true,
            Err(TryRecvError::Disconnected) => return false,
        }
    }
    true
}
