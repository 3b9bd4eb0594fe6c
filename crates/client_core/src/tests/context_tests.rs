use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use shared::domain::{ChannelId, ChannelRef, MessageId, ThreadRef};
use tokio::sync::broadcast;

use super::*;
use crate::{ChannelFilter, ChannelSort, ClientHandle, ConnectivityEvent, QueryOptions};

fn channel(id: &str) -> ChannelRef {
    ChannelRef {
        id: ChannelId::new(id),
        name: Some(format!("#{id}")),
        member_ids: Vec::new(),
        member_names: HashMap::new(),
        last_updated: Utc::now(),
    }
}

fn thread(parent: &str) -> ThreadRef {
    ThreadRef {
        parent_message_id: MessageId::new(parent),
        active: true,
    }
}

struct StubHandle {
    connectivity: broadcast::Sender<ConnectivityEvent>,
}

impl StubHandle {
    fn new() -> Arc<Self> {
        let (connectivity, _) = broadcast::channel(4);
        Arc::new(Self { connectivity })
    }
}

#[async_trait]
impl ClientHandle for StubHandle {
    async fn query_channels(
        &self,
        _filter: ChannelFilter,
        _sort: ChannelSort,
        _options: QueryOptions,
    ) -> Result<Vec<ChannelRef>> {
        Ok(Vec::new())
    }

    async fn watch_channel(&self, _channel_id: &ChannelId) -> Result<()> {
        Ok(())
    }

    fn subscribe_connectivity(&self) -> broadcast::Receiver<ConnectivityEvent> {
        self.connectivity.subscribe()
    }

    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }
}

#[test]
fn set_channel_then_get_returns_it() {
    let store = ContextStore::new();
    store.set_channel(Some(channel("general")));
    assert_eq!(
        store.get().channel.map(|c| c.id),
        Some(ChannelId::new("general"))
    );
}

#[test]
fn set_client_publishes_handle() {
    let store = ContextStore::new();
    assert!(store.get().client.is_none());
    store.set_client(Some(StubHandle::new()));
    assert!(store.get().client.is_some());
    store.set_client(None);
    assert!(store.get().client.is_none());
}

#[test]
fn subscriber_observes_committed_value_during_notification() {
    let store = Arc::new(ContextStore::new());
    let seen: Arc<Mutex<Vec<(Option<ChannelId>, Option<ChannelId>)>>> =
        Arc::new(Mutex::new(Vec::new()));
    let observed = Arc::clone(&seen);
    let reader = Arc::clone(&store);
    let _subscription = store.subscribe(move |snapshot| {
        let from_snapshot = snapshot.channel.as_ref().map(|c| c.id.clone());
        let from_store = reader.get().channel.map(|c| c.id);
        observed.lock().unwrap().push((from_snapshot, from_store));
    });

    store.set_channel(Some(channel("general")));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    // Both the snapshot and a fresh read see the new value, never a stale
    // one.
    assert_eq!(seen[0].0, Some(ChannelId::new("general")));
    assert_eq!(seen[0].1, Some(ChannelId::new("general")));
}

#[test]
fn notifications_run_in_subscription_order() {
    let store = Arc::new(ContextStore::new());
    let order = Arc::new(Mutex::new(Vec::new()));
    let first = Arc::clone(&order);
    let second = Arc::clone(&order);
    let _a = store.subscribe(move |_| first.lock().unwrap().push(1));
    let _b = store.subscribe(move |_| second.lock().unwrap().push(2));

    store.set_thread(Some(thread("m-1")));

    assert_eq!(*order.lock().unwrap(), vec![1, 2]);
}

#[test]
fn unsubscribe_releases_exactly_once() {
    let store = Arc::new(ContextStore::new());
    let calls = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&calls);
    let mut subscription = store.subscribe(move |_| *counter.lock().unwrap() += 1);

    store.set_channel(Some(channel("general")));
    assert_eq!(*calls.lock().unwrap(), 1);

    subscription.unsubscribe();
    subscription.unsubscribe();
    store.set_channel(None);
    assert_eq!(*calls.lock().unwrap(), 1);
}

#[test]
fn dropping_subscription_unsubscribes() {
    let store = Arc::new(ContextStore::new());
    let calls = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&calls);
    {
        let _subscription = store.subscribe(move |_| *counter.lock().unwrap() += 1);
        store.set_channel(Some(channel("general")));
    }
    store.set_channel(None);
    assert_eq!(*calls.lock().unwrap(), 1);
}

#[test]
fn clearing_channel_leaves_thread() {
    // Cross-field consistency is the caller's job; this pins the
    // behavior so it stays deliberate.
    let store = ContextStore::new();
    store.set_channel(Some(channel("general")));
    store.set_thread(Some(thread("m-1")));

    store.set_channel(None);

    let snapshot = store.get();
    assert!(snapshot.channel.is_none());
    assert_eq!(snapshot.thread, Some(thread("m-1")));
}
