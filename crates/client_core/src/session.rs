//! Connection lifecycle to the messaging backend.
//!
//! State machine: `Idle -> Connecting -> Online <-> Offline -> Disconnected`.
//! Failure never retries automatically; callers either call
//! [`SessionManager::connect`] again or use
//! [`SessionManager::reconnect_with_backoff`] with an explicit policy.

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use shared::domain::UserIdentity;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{error, info, warn};

use crate::{error::ConnectError, ChatBackend, ClientHandle, ConnectivityEvent, ContextStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Connecting,
    Online,
    Offline,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    StatusChanged(SessionStatus),
}

/// Bounded exponential backoff for caller-driven reconnects.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            max_attempts: 5,
        }
    }
}

pub struct SessionManager {
    backend: Arc<dyn ChatBackend>,
    identity: UserIdentity,
    token: String,
    store: Arc<ContextStore>,
    inner: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

struct SessionState {
    status: SessionStatus,
    handle: Option<Arc<dyn ClientHandle>>,
    last_error: Option<String>,
    connectivity_task: Option<JoinHandle<()>>,
}

impl SessionManager {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        identity: UserIdentity,
        token: impl Into<String>,
        store: Arc<ContextStore>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            backend,
            identity,
            token: token.into(),
            store,
            inner: Mutex::new(SessionState {
                status: SessionStatus::Idle,
                handle: None,
                last_error: None,
                connectivity_task: None,
            }),
            events,
        })
    }

    /// Connect to the backend. No-op when already Online; rejected while
    /// another connect is in flight.
    pub async fn connect(self: &Arc<Self>) -> std::result::Result<(), ConnectError> {
        let (previous, stale_task) = {
            let mut guard = self.inner.lock().await;
            match guard.status {
                SessionStatus::Online => return Ok(()),
                SessionStatus::Connecting => return Err(ConnectError::ConnectInProgress),
                SessionStatus::Idle | SessionStatus::Offline | SessionStatus::Disconnected => {}
            }
            guard.status = SessionStatus::Connecting;
            (guard.handle.take(), guard.connectivity_task.take())
        };
        self.emit(SessionStatus::Connecting);
        if let Some(task) = stale_task {
            task.abort();
        }
        if let Some(previous) = previous {
            // Reconnecting from Offline: the old connection must be
            // released before a new one is requested.
            self.store.set_client(None);
            if let Err(err) = previous.disconnect().await {
                warn!(error = %err, "failed to release previous backend connection");
            }
        }

        match self
            .backend
            .connect(self.identity.clone(), &self.token)
            .await
        {
            Ok(handle) => {
                let connectivity = handle.subscribe_connectivity();
                let task = self.spawn_connectivity_pump(connectivity);
                {
                    let mut guard = self.inner.lock().await;
                    if guard.status != SessionStatus::Connecting {
                        // disconnect() won the race while the backend call
                        // was in flight; release the fresh handle.
                        drop(guard);
                        task.abort();
                        handle.disconnect().await.map_err(ConnectError::Backend)?;
                        return Ok(());
                    }
                    guard.handle = Some(Arc::clone(&handle));
                    guard.last_error = None;
                    guard.status = SessionStatus::Online;
                    guard.connectivity_task = Some(task);
                }
                self.store.set_client(Some(handle));
                self.emit(SessionStatus::Online);
                info!(user = %self.identity.id, "connected to messaging backend");
                Ok(())
            }
            Err(err) => {
                {
                    let mut guard = self.inner.lock().await;
                    guard.status = SessionStatus::Disconnected;
                    guard.last_error = Some(err.to_string());
                }
                self.emit(SessionStatus::Disconnected);
                error!(user = %self.identity.id, error = %err, "failed to connect to messaging backend");
                Err(ConnectError::Backend(err))
            }
        }
    }

    /// Release the connection. Idempotent: listener teardown and handle
    /// release happen exactly once, on the first call.
    pub async fn disconnect(&self) -> Result<()> {
        let (handle, task) = {
            let mut guard = self.inner.lock().await;
            if guard.status == SessionStatus::Disconnected {
                return Ok(());
            }
            guard.status = SessionStatus::Disconnected;
            (guard.handle.take(), guard.connectivity_task.take())
        };
        if let Some(task) = task {
            task.abort();
        }
        self.store.set_client(None);
        if let Some(handle) = handle {
            handle.disconnect().await?;
        }
        self.emit(SessionStatus::Disconnected);
        info!(user = %self.identity.id, "disconnected from messaging backend");
        Ok(())
    }

    /// Retry `connect` under a bounded exponential backoff. Retries only
    /// backend failures; an in-flight connect is still rejected.
    pub async fn reconnect_with_backoff(
        self: &Arc<Self>,
        policy: BackoffPolicy,
    ) -> std::result::Result<(), ConnectError> {
        let mut delay = policy.initial_delay;
        let mut last_error = ConnectError::Backend(anyhow::anyhow!("no connect attempts made"));
        for attempt in 0..policy.max_attempts.max(1) {
            if attempt > 0 {
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(policy.max_delay);
            }
            match self.connect().await {
                Ok(()) => return Ok(()),
                Err(ConnectError::ConnectInProgress) => {
                    return Err(ConnectError::ConnectInProgress)
                }
                Err(err) => {
                    warn!(attempt = attempt + 1, error = %err, "reconnect attempt failed");
                    last_error = err;
                }
            }
        }
        Err(last_error)
    }

    pub async fn status(&self) -> SessionStatus {
        self.inner.lock().await.status
    }

    pub async fn is_online(&self) -> bool {
        self.status().await == SessionStatus::Online
    }

    pub async fn last_error(&self) -> Option<String> {
        self.inner.lock().await.last_error.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn spawn_connectivity_pump(
        self: &Arc<Self>,
        mut connectivity: broadcast::Receiver<ConnectivityEvent>,
    ) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match connectivity.recv().await {
                    Ok(event) => manager.apply_connectivity(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "connectivity events lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    async fn apply_connectivity(&self, event: ConnectivityEvent) {
        let changed = {
            let mut guard = self.inner.lock().await;
            match (guard.status, event) {
                (SessionStatus::Online, ConnectivityEvent::Lost) => {
                    guard.status = SessionStatus::Offline;
                    Some(SessionStatus::Offline)
                }
                (SessionStatus::Offline, ConnectivityEvent::Restored) => {
                    guard.status = SessionStatus::Online;
                    Some(SessionStatus::Online)
                }
                _ => None,
            }
        };
        if let Some(status) = changed {
            match status {
                SessionStatus::Offline => warn!("connectivity lost, session offline"),
                _ => info!("connectivity restored, session online"),
            }
            self.emit(status);
        }
    }

    fn emit(&self, status: SessionStatus) {
        // Nobody listening is fine.
        let _ = self.events.send(SessionEvent::StatusChanged(status));
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
