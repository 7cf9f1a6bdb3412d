// SPDX-License-Identifier: MIT OR Apache-2.0
//! Change notification for graph and scene observers.
//!
//! Observers are invoked synchronously after a mutation has completed and
//! receive a shared reference to the source, so they can re-read state but
//! cannot mutate it from inside the callback.

use std::fmt;

/// Handle returned by `subscribe`, used to unsubscribe later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Observer callback
pub type Callback<S, E> = Box<dyn Fn(&S, &E)>;

/// Publish/subscribe list of observers
pub struct Notifier<S, E> {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback<S, E>)>,
}

impl<S, E> Notifier<S, E> {
    /// Create a notifier with no subscribers
    pub fn new() -> Self {
        Self {
            next_id: 0,
            subscribers: Vec::new(),
        }
    }

    /// Register an observer
    pub fn subscribe(&mut self, callback: impl Fn(&S, &E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove an observer. Returns false if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Invoke every observer, in subscription order
    pub fn emit(&self, source: &S, event: &E) {
        for (_, callback) in &self.subscribers {
            callback(source, event);
        }
    }

    /// Number of registered observers
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether there are no observers
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<S, E> Default for Notifier<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, E> fmt::Debug for Notifier<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
