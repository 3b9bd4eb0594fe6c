//! In-memory backend so the console binary can exercise the boot flow
//! without a live messaging service.

use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use client_core::{
    ChannelFilter, ChannelSort, ChatBackend, ClientHandle, ConnectivityEvent, QueryOptions,
};
use shared::domain::{
    Attachment, ChannelId, ChannelRef, Message, MessageId, MessageKind, UserId, UserIdentity,
};
use tokio::sync::broadcast;

pub struct DemoBackend;

impl DemoBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

#[async_trait]
impl ChatBackend for DemoBackend {
    async fn connect(&self, identity: UserIdentity, _token: &str) -> Result<Arc<dyn ClientHandle>> {
        Ok(Arc::new(DemoHandle::new(identity.id)))
    }
}

struct DemoHandle {
    user_id: UserId,
    connectivity: broadcast::Sender<ConnectivityEvent>,
}

impl DemoHandle {
    fn new(user_id: UserId) -> Self {
        let (connectivity, _) = broadcast::channel(16);
        Self {
            user_id,
            connectivity,
        }
    }

    fn channel(&self, id: &str, name: Option<&str>, others: &[&str], minutes_ago: i64) -> ChannelRef {
        let mut member_ids = vec![self.user_id.clone()];
        let mut member_names = HashMap::new();
        for other in others {
            let member = UserId::new(*other);
            member_names.insert(member.clone(), capitalize(other));
            member_ids.push(member);
        }
        ChannelRef {
            id: ChannelId::new(id),
            name: name.map(str::to_string),
            member_ids,
            member_names,
            last_updated: Utc::now() - Duration::minutes(minutes_ago),
        }
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[async_trait]
impl ClientHandle for DemoHandle {
    async fn query_channels(
        &self,
        filter: ChannelFilter,
        _sort: ChannelSort,
        _options: QueryOptions,
    ) -> Result<Vec<ChannelRef>> {
        let mut channels = vec![
            self.channel("travel", Some("Travel plans"), &["maria", "tom"], 5),
            self.channel("dm-maria", None, &["maria"], 90),
            self.channel("support", Some("Support"), &["tom"], 60 * 24),
        ];
        channels.retain(|channel| {
            filter
                .members_include
                .iter()
                .all(|member| channel.member_ids.contains(member))
        });
        channels.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        Ok(channels)
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

pub fn sample_messages() -> Vec<Message> {
    vec![
        Message {
            id: MessageId::new("m-1"),
            text: "Booked! Confirmation went to maria.lopez@example.com".to_string(),
            kind: MessageKind::Regular,
            sender_id: UserId::new("maria"),
            attachments: vec![Attachment {
                mime_type: Some("application/pdf".to_string()),
                url: Some("https://files.example/itinerary.pdf".to_string()),
                size_bytes: 482_000,
                title: Some("itinerary.pdf".to_string()),
            }],
        },
        Message {
            id: MessageId::new("m-2"),
            text: "Maria joined the channel".to_string(),
            kind: MessageKind::System,
            sender_id: UserId::new("system"),
            attachments: Vec::new(),
        },
    ]
}
