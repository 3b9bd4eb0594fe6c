use std::sync::{Arc, Mutex as StdMutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use shared::domain::{ChannelId, ChannelRef, UserId};
use tokio::sync::broadcast;

use super::*;
use crate::{ClientHandle, ConnectivityEvent, ContextStore, Navigator};

struct RecordingHandle {
    connectivity: broadcast::Sender<ConnectivityEvent>,
    channels: Vec<ChannelRef>,
    last_query: StdMutex<Option<(ChannelFilter, ChannelSort, QueryOptions)>>,
    watch_calls: StdMutex<Vec<ChannelId>>,
    watch_error: Option<String>,
}

impl RecordingHandle {
    fn with_channels(channels: Vec<ChannelRef>) -> Arc<Self> {
        let (connectivity, _) = broadcast::channel(4);
        Arc::new(Self {
            connectivity,
            channels,
            last_query: StdMutex::new(None),
            watch_calls: StdMutex::new(Vec::new()),
            watch_error: None,
        })
    }

    fn failing_watch(message: &str) -> Arc<Self> {
        let (connectivity, _) = broadcast::channel(4);
        Arc::new(Self {
            connectivity,
            channels: Vec::new(),
            last_query: StdMutex::new(None),
            watch_calls: StdMutex::new(Vec::new()),
            watch_error: Some(message.to_string()),
        })
    }
}

#[async_trait]
impl ClientHandle for RecordingHandle {
    async fn query_channels(
        &self,
        filter: ChannelFilter,
        sort: ChannelSort,
        options: QueryOptions,
    ) -> Result<Vec<ChannelRef>> {
        *self.last_query.lock().unwrap() = Some((filter, sort, options));
        Ok(self.channels.clone())
    }

    async fn watch_channel(&self, channel_id: &ChannelId) -> Result<()> {
        self.watch_calls.lock().unwrap().push(channel_id.clone());
        match &self.watch_error {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(()),
        }
    }

    fn subscribe_connectivity(&self) -> broadcast::Receiver<ConnectivityEvent> {
        self.connectivity.subscribe()
    }

    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct RecordingNavigator {
    routes: StdMutex<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn push(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_string());
    }
}

fn channel_at(id: &str, minutes_ago: i64, members: &[&str]) -> ChannelRef {
    ChannelRef {
        id: ChannelId::new(id),
        name: None,
        member_ids: members.iter().map(|m| UserId::new(*m)).collect(),
        member_names: members
            .iter()
            .map(|m| (UserId::new(*m), format!("{m} name")))
            .collect(),
        last_updated: Utc::now() - Duration::minutes(minutes_ago),
    }
}

fn coordinator_with(
    handle: Arc<RecordingHandle>,
) -> (ChannelListCoordinator, Arc<ContextStore>, Arc<RecordingNavigator>) {
    let store = Arc::new(ContextStore::new());
    store.set_client(Some(handle));
    let navigator = Arc::new(RecordingNavigator::default());
    let coordinator = ChannelListCoordinator::new(
        Arc::clone(&store),
        Arc::clone(&navigator) as Arc<dyn Navigator>,
    );
    (coordinator, store, navigator)
}

#[tokio::test]
async fn list_channels_queries_by_membership_with_watch() {
    let handle = RecordingHandle::with_channels(vec![channel_at("travel", 0, &["alice", "maria"])]);
    let (coordinator, _store, _navigator) = coordinator_with(Arc::clone(&handle));

    let channels = coordinator.list_channels(&UserId::new("alice")).await.unwrap();
    assert_eq!(channels.len(), 1);

    let query = handle.last_query.lock().unwrap().take().unwrap();
    assert_eq!(query.0.members_include, vec![UserId::new("alice")]);
    assert_eq!(query.1, ChannelSort::LastUpdatedDesc);
    assert!(query.2.state && query.2.watch);
}

#[tokio::test]
async fn list_channels_keeps_newest_first_order() {
    let handle = RecordingHandle::with_channels(vec![
        channel_at("today", 1, &["alice"]),
        channel_at("yesterday", 60 * 24, &["alice"]),
        channel_at("last-week", 60 * 24 * 7, &["alice"]),
    ]);
    let (coordinator, _store, _navigator) = coordinator_with(handle);

    let channels = coordinator.list_channels(&UserId::new("alice")).await.unwrap();
    assert!(channels
        .windows(2)
        .all(|pair| pair[0].last_updated >= pair[1].last_updated));
}

#[tokio::test]
async fn list_channels_without_client_fails() {
    let store = Arc::new(ContextStore::new());
    let coordinator = ChannelListCoordinator::new(
        store,
        Arc::new(RecordingNavigator::default()) as Arc<dyn Navigator>,
    );
    assert!(coordinator.list_channels(&UserId::new("alice")).await.is_err());
}

#[tokio::test]
async fn select_publishes_channel_and_navigates() {
    let handle = RecordingHandle::with_channels(Vec::new());
    let (coordinator, store, navigator) = coordinator_with(handle);

    coordinator.select(channel_at("travel", 0, &["alice", "maria"]));

    assert_eq!(
        store.get().channel.map(|c| c.id),
        Some(ChannelId::new("travel"))
    );
    assert_eq!(*navigator.routes.lock().unwrap(), vec!["chat".to_string()]);
}

#[tokio::test]
async fn watch_failure_is_surfaced_not_swallowed() {
    let handle = RecordingHandle::failing_watch("watch refused");
    let (coordinator, _store, _navigator) = coordinator_with(Arc::clone(&handle));

    let channel = channel_at("travel", 0, &["alice"]);
    assert!(coordinator.watch(&channel).await.is_err());
    assert_eq!(handle.watch_calls.lock().unwrap().len(), 1);
}

#[test]
fn display_name_prefers_explicit_name() {
    let mut channel = channel_at("travel", 0, &["alice", "maria"]);
    channel.name = Some("Travel plans".to_string());
    assert_eq!(channel.display_name(&UserId::new("alice")), "Travel plans");
}

#[test]
fn display_name_joins_other_members() {
    let channel = channel_at("dm", 0, &["alice", "maria", "tom"]);
    assert_eq!(
        channel.display_name(&UserId::new("alice")),
        "maria name, tom name"
    );
}

#[test]
fn display_name_falls_back_to_member_id_then_chat() {
    let mut channel = channel_at("dm", 0, &["alice", "maria"]);
    channel.member_names.clear();
    assert_eq!(channel.display_name(&UserId::new("alice")), "maria");

    let solo = channel_at("notes", 0, &["alice"]);
    assert_eq!(solo.display_name(&UserId::new("alice")), "Chat");
}
