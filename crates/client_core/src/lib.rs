use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::{ChannelId, ChannelRef, UserIdentity},
    markup::{MarkupFragment, TagStyleTable, VisualTree},
};
use tokio::sync::broadcast;
use url::Url;

pub mod attachment;
pub mod channels;
pub mod config;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod session;

pub use attachment::{Category, ResolvedAttachment};
pub use channels::{ChannelFilter, ChannelListCoordinator, ChannelSort, QueryOptions};
pub use config::{load_settings, Settings};
pub use context::{ContextSnapshot, ContextStore, Subscription};
pub use error::{AttachmentOpenError, ConfigError, ConnectError, RenderError};
pub use pipeline::{RenderableMessage, REDACTION_TOKEN};
pub use session::{BackoffPolicy, SessionEvent, SessionManager, SessionStatus};

/// Connectivity notifications emitted by a connected client handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    Lost,
    Restored,
}

/// The messaging backend entry point: authenticate-and-connect.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn connect(&self, identity: UserIdentity, token: &str) -> Result<Arc<dyn ClientHandle>>;
}

pub struct MissingBackend;

#[async_trait]
impl ChatBackend for MissingBackend {
    async fn connect(
        &self,
        _identity: UserIdentity,
        _token: &str,
    ) -> Result<Arc<dyn ClientHandle>> {
        Err(anyhow::anyhow!("chat backend is unavailable"))
    }
}

/// A live connection to the messaging backend, exclusively owned by the
/// session while it is Online/Offline and released on Disconnected.
#[async_trait]
pub trait ClientHandle: Send + Sync {
    async fn query_channels(
        &self,
        filter: ChannelFilter,
        sort: ChannelSort,
        options: QueryOptions,
    ) -> Result<Vec<ChannelRef>>;
    async fn watch_channel(&self, channel_id: &ChannelId) -> Result<()>;
    fn subscribe_connectivity(&self) -> broadcast::Receiver<ConnectivityEvent>;
    async fn disconnect(&self) -> Result<()>;
}

/// External rich-text renderer. Errors are the renderer's to report; the
/// pipeline converts them into a plain-text degradation.
pub trait MarkupRenderer: Send + Sync {
    fn render(
        &self,
        fragment: &MarkupFragment,
        styles: &TagStyleTable,
    ) -> std::result::Result<VisualTree, RenderError>;
}

/// OS-level URL opener.
#[async_trait]
pub trait LinkOpener: Send + Sync {
    async fn can_open(&self, url: &Url) -> bool;
    async fn open(&self, url: &Url) -> Result<()>;
}

/// Screen navigation, fire-and-forget.
pub trait Navigator: Send + Sync {
    fn push(&self, route: &str);
}

pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn push(&self, _route: &str) {}
}
