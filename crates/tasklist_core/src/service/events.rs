//! Change notifications emitted by the task collection.
//!
//! # Responsibility
//! - Deliver collection mutations to subscribed views as explicit events.
//! - Keep delivery order identical to mutation order.
//!
//! # Invariants
//! - Consumers drain events synchronously; nothing is pushed into views
//!   behind their back.
//! - Storage failures raised before anyone subscribed are replayed to the
//!   first subscriber.

use crate::model::task::Task;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Handle used to detach one subscription.
pub type SubscriptionId = u64;

/// Storage call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOperation {
    Load,
    Save,
    Delete,
}

impl StorageOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Save => "save",
            Self::Delete => "delete",
        }
    }
}

impl Display for StorageOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One collection change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    /// The whole collection was (re)loaded from storage.
    Reset,
    Added(Task),
    Changed(Task),
    Removed(Task),
    /// A storage call failed; the in-memory state was kept.
    StorageFailed {
        operation: StorageOperation,
        message: String,
    },
}

/// Receiving end of a collection subscription.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    receiver: Receiver<TaskEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns every event delivered since the last drain, oldest first.
    pub fn drain(&self) -> Vec<TaskEvent> {
        self.receiver.try_iter().collect()
    }
}

/// Sender registry owned by the collection.
#[derive(Debug, Default)]
pub(crate) struct Subscribers {
    next_id: SubscriptionId,
    senders: Vec<(SubscriptionId, Sender<TaskEvent>)>,
    undelivered: Vec<TaskEvent>,
}

impl Subscribers {
    pub(crate) fn subscribe(&mut self) -> Subscription {
        let (sender, receiver) = channel();
        self.next_id += 1;
        let id = self.next_id;

        for event in self.undelivered.drain(..) {
            // The receiver is alive in this scope, so the send cannot fail.
            let _ = sender.send(event);
        }
        self.senders.push((id, sender));
        Subscription { id, receiver }
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.senders.len();
        self.senders.retain(|(current, _)| *current != id);
        self.senders.len() != before
    }

    pub(crate) fn emit(&mut self, event: TaskEvent) {
        // Dropped receivers fail the send and are pruned here.
        self.senders
            .retain(|(_, sender)| sender.send(event.clone()).is_ok());

        if self.senders.is_empty() && matches!(event, TaskEvent::StorageFailed { .. }) {
            self.undelivered.push(event);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }
}
