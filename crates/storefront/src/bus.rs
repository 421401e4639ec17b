//! Page-scoped change notification bus.
//!
//! Two kinds of event reach subscribers:
//!
//! - [`BusEvent::CartUpdated`], published by a widget after it mutates the
//!   cart, carrying the widget's identity. Every subscriber receives it,
//!   including the publisher, which is expected to ignore its own events.
//! - [`BusEvent::StorageChanged`], raised by the storage area when another
//!   browsing context writes. It has no payload and always means "reload".

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::debug;
use vitrine_core::ChangeNotification;

/// Buffered events per subscriber before it starts lagging.
const CHANNEL_CAPACITY: usize = 64;

/// An event delivered to bus subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    /// A `cartUpdated` notification from a widget in this context.
    CartUpdated(ChangeNotification),
    /// Another browsing context wrote to shared storage.
    StorageChanged,
}

/// Publish/subscribe hub for one browsing context.
///
/// Cheap to clone; clones publish to the same subscribers.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<BusEvent>,
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationBus {
    /// Create a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Deliver a `cartUpdated` event to every subscriber.
    ///
    /// Returns the number of subscribers reached.
    pub fn publish(&self, notification: ChangeNotification) -> usize {
        debug!(
            source = %notification.source,
            action = ?notification.action,
            "Publishing cart update"
        );
        self.sender
            .send(BusEvent::CartUpdated(notification))
            .unwrap_or(0)
    }

    /// Raise the storage-change signal.
    pub(crate) fn signal_storage_change(&self) {
        let _ = self.sender.send(BusEvent::StorageChanged);
    }

    /// Start receiving events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A live subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<BusEvent>,
}

impl Subscription {
    /// Wait for the next event.
    ///
    /// A subscriber that fell behind gets a single `StorageChanged` in place
    /// of the events it missed. Returns `None` once every bus handle is gone.
    pub async fn next(&mut self) -> Option<BusEvent> {
        match self.receiver.recv().await {
            Ok(event) => Some(event),
            Err(RecvError::Lagged(missed)) => {
                debug!(missed, "Subscriber lagged, forcing reload");
                Some(BusEvent::StorageChanged)
            }
            Err(RecvError::Closed) => None,
        }
    }

    /// Take the next already-delivered event without waiting.
    pub fn try_next(&mut self) -> Option<BusEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Lagged(_)) => Some(BusEvent::StorageChanged),
            Err(TryRecvError::Empty | TryRecvError::Closed) => None,
        }
    }
}
