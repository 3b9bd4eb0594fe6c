//! Channel listing and selection for the current user.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde::Serialize;
use shared::domain::{ChannelRef, UserId};
use tracing::{info, warn};

use crate::{ClientHandle, ContextStore, Navigator};

/// Backend channel query filter; only membership filtering is used here.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelFilter {
    pub members_include: Vec<UserId>,
}

impl ChannelFilter {
    pub fn members_include(user_id: UserId) -> Self {
        Self {
            members_include: vec![user_id],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelSort {
    LastUpdatedDesc,
}

/// Query options: populate channel state and start watching, both on by
/// default.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct QueryOptions {
    pub state: bool,
    pub watch: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            state: true,
            watch: true,
        }
    }
}

pub struct ChannelListCoordinator {
    store: Arc<ContextStore>,
    navigator: Arc<dyn Navigator>,
}

impl ChannelListCoordinator {
    pub fn new(store: Arc<ContextStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    /// Channels where `user_id` is a member, sorted by the backend on
    /// last-updated descending. Pagination is the backend's concern.
    pub async fn list_channels(&self, user_id: &UserId) -> Result<Vec<ChannelRef>> {
        let handle = self.connected_client()?;
        let channels = handle
            .query_channels(
                ChannelFilter::members_include(user_id.clone()),
                ChannelSort::LastUpdatedDesc,
                QueryOptions::default(),
            )
            .await?;
        info!(user = %user_id, count = channels.len(), "channel list query completed");
        Ok(channels)
    }

    /// Publish the selection into the context store and emit the
    /// navigation intent.
    pub fn select(&self, channel: ChannelRef) {
        self.store.set_channel(Some(channel));
        self.navigator.push("chat");
    }

    /// Subscribe the channel to live updates. Failure is logged and
    /// returned; screens stay usable without a watch.
    pub async fn watch(&self, channel: &ChannelRef) -> Result<()> {
        let handle = self.connected_client()?;
        if let Err(err) = handle.watch_channel(&channel.id).await {
            warn!(channel = %channel.id, error = %err, "error watching channel");
            return Err(err);
        }
        Ok(())
    }

    fn connected_client(&self) -> Result<Arc<dyn ClientHandle>> {
        self.store
            .get()
            .client
            .ok_or_else(|| anyhow!("no connected client in context"))
    }
}

#[cfg(test)]
#[path = "tests/channels_tests.rs"]
mod tests;
