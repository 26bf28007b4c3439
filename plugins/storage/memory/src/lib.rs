use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, RwLock};

use marquee_api::{
    FindQuery, MovieDocument, MovieRecord, StoreError, StoreFuture, TargetConnector,
    TargetDescriptor, TargetStore,
};

// ═══════════════════════════════════════════════════════════════
//  MemoryCollection
// ═══════════════════════════════════════════════════════════════

/// In-process record collection, kept in insertion order.
///
/// Outlives the handles opened on it, the way a database outlives
/// its client sessions.
#[derive(Default)]
pub struct MemoryCollection {
    records: RwLock<Vec<MovieRecord>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

// ═══════════════════════════════════════════════════════════════
//  MemoryTarget
// ═══════════════════════════════════════════════════════════════

/// Session handle on a [`MemoryCollection`].
pub struct MemoryTarget {
    collection: Arc<MemoryCollection>,
    closed: AtomicBool,
}

impl MemoryTarget {
    pub fn new(collection: Arc<MemoryCollection>) -> Self {
        Self {
            collection,
            closed: AtomicBool::new(false),
        }
    }

    /// Handle on a fresh private collection.
    pub fn standalone() -> Self {
        Self::new(Arc::new(MemoryCollection::new()))
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::io("memory session closed"));
        }
        Ok(())
    }
}

impl TargetStore for MemoryTarget {
    fn count(&self) -> StoreFuture<'_, usize> {
        Box::pin(async move {
            self.ensure_open()?;
            Ok(self.collection.records.read().await.len())
        })
    }

    fn find_all<'a>(&'a self, query: &'a FindQuery) -> StoreFuture<'a, Vec<MovieRecord>> {
        Box::pin(async move {
            self.ensure_open()?;
            let buf = self.collection.records.read().await;
            let mut result: Vec<MovieRecord> = buf
                .iter()
                .filter(|r| query.matches(&r.title))
                .cloned()
                .collect();
            // stable: equal timestamps stay in insertion order
            result.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
            Ok(query.paginate(result))
        })
    }

    fn find_oldest(&self) -> StoreFuture<'_, Option<MovieRecord>> {
        Box::pin(async move {
            self.ensure_open()?;
            let buf = self.collection.records.read().await;
            // min_by_key keeps the first of equal timestamps, i.e. the earliest write
            Ok(buf.iter().min_by_key(|r| r.created_at_ms).cloned())
        })
    }

    fn insert_one(&self, doc: MovieDocument) -> StoreFuture<'_, MovieRecord> {
        Box::pin(async move {
            self.ensure_open()?;
            let record = MovieRecord::from_document(uuid::Uuid::new_v4().simple().to_string(), doc);
            self.collection.records.write().await.push(record.clone());
            Ok(record)
        })
    }

    fn replace_one<'a>(&'a self, id: &'a str, doc: MovieDocument) -> StoreFuture<'a, Option<MovieRecord>> {
        Box::pin(async move {
            self.ensure_open()?;
            let mut buf = self.collection.records.write().await;
            let Some(pos) = buf.iter().position(|r| r.id == id) else {
                return Ok(None);
            };
            // a rewrite counts as the newest write: keep position == write order
            let mut record = buf.remove(pos);
            record.overwrite(doc);
            buf.push(record.clone());
            Ok(Some(record))
        })
    }

    fn delete_one<'a>(&'a self, id: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            self.ensure_open()?;
            let mut buf = self.collection.records.write().await;
            match buf.iter().position(|r| r.id == id) {
                Some(pos) => {
                    buf.remove(pos);
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    fn is_healthy(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }

    fn close(&self) -> StoreFuture<'_, ()> {
        self.closed.store(true, Ordering::Release);
        Box::pin(async { Ok(()) })
    }
}

// ═══════════════════════════════════════════════════════════════
//  MemoryConnector
// ═══════════════════════════════════════════════════════════════

/// Connector for `memory://<name>` URIs.
///
/// One collection per URI: reconnecting to the same URI sees the same data.
#[derive(Default)]
pub struct MemoryConnector {
    collections: Mutex<HashMap<String, Arc<MemoryCollection>>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TargetConnector for MemoryConnector {
    fn connect<'a>(&'a self, target: &'a TargetDescriptor) -> StoreFuture<'a, Arc<dyn TargetStore>> {
        Box::pin(async move {
            if target.scheme() != "memory" {
                return Err(StoreError::config(format!(
                    "memory connector cannot open '{}'",
                    target.redacted_uri()
                )));
            }
            let mut collections = self.collections.lock().await;
            let collection = collections
                .entry(target.uri.clone())
                .or_insert_with(|| {
                    tracing::debug!(target_name = %target.name, "created memory collection");
                    Arc::new(MemoryCollection::new())
                })
                .clone();
            Ok(Arc::new(MemoryTarget::new(collection)) as Arc<dyn TargetStore>)
        })
    }
}
