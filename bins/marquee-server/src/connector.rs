use std::sync::Arc;

use marquee_api::{StoreError, StoreFuture, TargetConnector, TargetDescriptor, TargetStore};
use marquee_storage_file::FileConnector;
use marquee_storage_memory::MemoryConnector;

/// Dispatches a target URI to the storage plugin for its scheme.
#[derive(Default)]
pub struct SchemeConnector {
    memory: MemoryConnector,
    file: FileConnector,
}

impl SchemeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn supports(scheme: &str) -> bool {
        matches!(scheme, "memory" | "file")
    }
}

impl TargetConnector for SchemeConnector {
    fn connect<'a>(&'a self, target: &'a TargetDescriptor) -> StoreFuture<'a, Arc<dyn TargetStore>> {
        match target.scheme() {
            "memory" => self.memory.connect(target),
            "file" => self.file.connect(target),
            other => {
                let err = StoreError::config(format!(
                    "target '{}': unsupported uri scheme '{other}'",
                    target.name
                ));
                Box::pin(async move { Err(err) })
            }
        }
    }
}
