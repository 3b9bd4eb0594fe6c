//! Shared conversation state: the connected client handle, the selected
//! channel, and the active thread.
//!
//! This is an explicit store object passed by reference to the components
//! that need it; there is no process-global instance, so tests can build
//! isolated stores. Writes commit before subscribers run, so a subscriber
//! reading during its notification observes the new value.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, Weak,
};

use shared::domain::{ChannelRef, ThreadRef};

use crate::ClientHandle;

/// Latest committed snapshot of the shared context.
#[derive(Clone, Default)]
pub struct ContextSnapshot {
    pub client: Option<Arc<dyn ClientHandle>>,
    pub channel: Option<ChannelRef>,
    pub thread: Option<ThreadRef>,
}

type Listener = Arc<dyn Fn(&ContextSnapshot) + Send + Sync>;

#[derive(Default)]
pub struct ContextStore {
    state: Mutex<ContextSnapshot>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest committed snapshot.
    pub fn get(&self) -> ContextSnapshot {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn set_client(&self, client: Option<Arc<dyn ClientHandle>>) {
        self.commit(|state| state.client = client);
    }

    pub fn set_channel(&self, channel: Option<ChannelRef>) {
        // Deliberately leaves the thread untouched; composite updates are
        // the caller's responsibility.
        self.commit(|state| state.channel = channel);
    }

    pub fn set_thread(&self, thread: Option<ThreadRef>) {
        self.commit(|state| state.thread = thread);
    }

    /// Register a listener invoked synchronously, in registration order,
    /// after every write. The returned guard unsubscribes on
    /// [`Subscription::unsubscribe`] or drop, exactly once.
    pub fn subscribe(
        self: &Arc<Self>,
        listener: impl Fn(&ContextSnapshot) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        Subscription {
            store: Arc::downgrade(self),
            id: Some(id),
        }
    }

    fn commit(&self, write: impl FnOnce(&mut ContextSnapshot)) {
        let snapshot = {
            let mut state = self
                .state
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            write(&mut state);
            state.clone()
        };
        // Listeners run outside both locks so they may read the store or
        // manage subscriptions without deadlocking.
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    fn remove_listener(&self, id: u64) {
        self.listeners
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .retain(|(listener_id, _)| *listener_id != id);
    }
}

/// Guard for one registered listener.
pub struct Subscription {
    store: Weak<ContextStore>,
    id: Option<u64>,
}

impl Subscription {
    pub fn unsubscribe(&mut self) {
        if let Some(id) = self.id.take() {
            if let Some(store) = self.store.upgrade() {
                store.remove_listener(id);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
#[path = "tests/context_tests.rs"]
mod tests;
