use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use marquee_api::{StoreError, TargetConnector, TargetDescriptor, TargetStore};

/// Lazily opened, reused target handles, one per target name.
///
/// The cache never retries on its own: a failed open is returned to the
/// caller, which treats the target as unavailable for that operation only.
/// A healthy handle is never dropped because of an unrelated error.
pub struct ConnectionCache {
    connector: Arc<dyn TargetConnector>,
    timeout: Duration,
    handles: RwLock<HashMap<String, Arc<dyn TargetStore>>>,
}

impl std::fmt::Debug for ConnectionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionCache")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ConnectionCache {
    pub fn new(connector: Arc<dyn TargetConnector>, timeout: Duration) -> Self {
        Self {
            connector,
            timeout,
            handles: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached handle for `target` if healthy, otherwise open one.
    ///
    /// Concurrent callers may both open a connection; the first handle
    /// stored wins and the loser is closed.
    pub async fn acquire(&self, target: &TargetDescriptor) -> Result<Arc<dyn TargetStore>, StoreError> {
        if let Some(handle) = self.handles.read().await.get(&target.name) {
            if handle.is_healthy() {
                return Ok(handle.clone());
            }
        }

        let fresh = self
            .call(&target.name, "connect", self.connector.connect(target))
            .await?;

        let mut handles = self.handles.write().await;
        if let Some(existing) = handles.get(&target.name) {
            if existing.is_healthy() {
                let existing = existing.clone();
                drop(handles);
                self.discard(&target.name, fresh, "duplicate").await;
                return Ok(existing);
            }
        }

        tracing::info!(target_name = %target.name, uri = %target.redacted_uri(), "connected to target");
        let stale = handles.insert(target.name.clone(), fresh.clone());
        drop(handles);
        if let Some(stale) = stale {
            self.discard(&target.name, stale, "stale").await;
        }
        Ok(fresh)
    }

    /// Close a handle that is no longer cached.
    async fn discard(&self, name: &str, handle: Arc<dyn TargetStore>, why: &'static str) {
        if let Err(e) = self.call(name, "close", handle.close()).await {
            tracing::debug!(target_name = %name, error = %e, handle = why, "closing dropped handle failed");
        }
    }

    /// Run one target round-trip under the per-call timeout.
    pub async fn call<T, F>(&self, target: &str, op: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| e.with_context(format!("{op} on '{target}'"))),
            Err(_) => Err(StoreError::timeout(format!(
                "{op} on '{target}' exceeded {}ms",
                self.timeout.as_millis()
            ))),
        }
    }

    pub async fn cached_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handles.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Close every handle. The cache stays usable and reconnects on demand.
    pub async fn shutdown(&self) {
        let drained: Vec<(String, Arc<dyn TargetStore>)> =
            self.handles.write().await.drain().collect();
        for (name, handle) in drained {
            match self.call(&name, "close", handle.close()).await {
                Ok(()) => tracing::debug!(target_name = %name, "closed target handle"),
                Err(e) => tracing::warn!(target_name = %name, error = %e, "close failed"),
            }
        }
    }
}
