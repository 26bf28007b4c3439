mod config;
mod storage;

use std::sync::Arc;

use marquee_api::{StoreFuture, TargetConnector, TargetDescriptor, TargetStore};

use config::FileTargetConfig;
pub use storage::FileTarget;

// ════════════════════════════════════════════════════════════════
//  FileConnector
// ════════════════════════════════════════════════════════════════

/// Connector for `file://<path>` URIs: one JSON-lines file per target.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileConnector;

impl FileConnector {
    pub fn new() -> Self {
        Self
    }
}

impl TargetConnector for FileConnector {
    fn connect<'a>(&'a self, target: &'a TargetDescriptor) -> StoreFuture<'a, Arc<dyn TargetStore>> {
        Box::pin(async move {
            let cfg = FileTargetConfig::from_uri(&target.uri)
                .map_err(|e| e.with_context(format!("target '{}'", target.name)))?;
            let storage = FileTarget::open(cfg.path, cfg.sync).await?;
            let records = storage.len().await;
            tracing::debug!(
                target_name = %target.name,
                path = %storage.path().display(),
                records = records,
                "opened file target"
            );
            Ok(Arc::new(storage) as Arc<dyn TargetStore>)
        })
    }
}
