#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use marquee_api::{
    FindQuery, MovieDocument, MovieRecord, NewMovie, StoreError, StoreFuture, TargetConnector,
    TargetDescriptor, TargetStore,
};
use marquee_engine::{ConnectionCache, Gallery, TargetPool};
use marquee_storage_memory::MemoryConnector;

/// Memory-backed connector whose targets can be switched off or stalled.
///
/// A downed target refuses new connections and fails every call on
/// handles that were opened before the outage. A stalled target accepts
/// connections but never answers a call.
#[derive(Default)]
pub struct FlakyConnector {
    inner: MemoryConnector,
    down: Arc<Mutex<HashSet<String>>>,
    stalled: Arc<Mutex<HashSet<String>>>,
}

impl FlakyConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_down(&self, name: &str) {
        self.down.lock().unwrap().insert(name.to_string());
    }

    pub fn bring_up(&self, name: &str) {
        self.down.lock().unwrap().remove(name);
        self.stalled.lock().unwrap().remove(name);
    }

    pub fn stall(&self, name: &str) {
        self.stalled.lock().unwrap().insert(name.to_string());
    }

    /// Direct handle on a target's collection, bypassing outages.
    pub async fn raw(&self, target: &TargetDescriptor) -> Arc<dyn TargetStore> {
        self.inner.connect(target).await.ok().expect("memory connect")
    }
}

impl TargetConnector for FlakyConnector {
    fn connect<'a>(&'a self, target: &'a TargetDescriptor) -> StoreFuture<'a, Arc<dyn TargetStore>> {
        Box::pin(async move {
            if self.down.lock().unwrap().contains(&target.name) {
                return Err(StoreError::io(format!("{} refused connection", target.name)));
            }
            let inner = self.inner.connect(target).await?;
            Ok(Arc::new(FlakyStore {
                name: target.name.clone(),
                inner,
                down: self.down.clone(),
                stalled: self.stalled.clone(),
            }) as Arc<dyn TargetStore>)
        })
    }
}

struct FlakyStore {
    name: String,
    inner: Arc<dyn TargetStore>,
    down: Arc<Mutex<HashSet<String>>>,
    stalled: Arc<Mutex<HashSet<String>>>,
}

impl FlakyStore {
    async fn check(&self) -> Result<(), StoreError> {
        if self.down.lock().unwrap().contains(&self.name) {
            return Err(StoreError::io(format!("{} connection reset", self.name)));
        }
        let stalled = self.stalled.lock().unwrap().contains(&self.name);
        if stalled {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        Ok(())
    }
}

impl TargetStore for FlakyStore {
    fn count(&self) -> StoreFuture<'_, usize> {
        Box::pin(async move {
            self.check().await?;
            self.inner.count().await
        })
    }

    fn find_all<'a>(&'a self, query: &'a FindQuery) -> StoreFuture<'a, Vec<MovieRecord>> {
        Box::pin(async move {
            self.check().await?;
            self.inner.find_all(query).await
        })
    }

    fn find_oldest(&self) -> StoreFuture<'_, Option<MovieRecord>> {
        Box::pin(async move {
            self.check().await?;
            self.inner.find_oldest().await
        })
    }

    fn insert_one(&self, doc: MovieDocument) -> StoreFuture<'_, MovieRecord> {
        Box::pin(async move {
            self.check().await?;
            self.inner.insert_one(doc).await
        })
    }

    fn replace_one<'a>(&'a self, id: &'a str, doc: MovieDocument) -> StoreFuture<'a, Option<MovieRecord>> {
        Box::pin(async move {
            self.check().await?;
            self.inner.replace_one(id, doc).await
        })
    }

    fn delete_one<'a>(&'a self, id: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            self.check().await?;
            self.inner.delete_one(id).await
        })
    }
}

pub fn targets(count: usize, capacity: usize) -> Vec<TargetDescriptor> {
    (0..count)
        .map(|i| TargetDescriptor::new(format!("t{i}"), format!("memory://t{i}"), capacity, i))
        .collect()
}

pub fn gallery(connector: Arc<FlakyConnector>, targets: Vec<TargetDescriptor>) -> Gallery {
    gallery_with_timeout(connector, targets, Duration::from_secs(2))
}

pub fn gallery_with_timeout(
    connector: Arc<FlakyConnector>,
    targets: Vec<TargetDescriptor>,
    timeout: Duration,
) -> Gallery {
    let cache = ConnectionCache::new(connector, timeout);
    Gallery::new(TargetPool::new(targets), cache, 10, 100)
}

pub fn movie(title: &str) -> NewMovie {
    NewMovie::new(
        title,
        format!("https://img.example/{title}.jpg"),
        format!("https://watch.example/{title}"),
    )
}

pub fn doc(title: &str, ts: i64) -> MovieDocument {
    movie(title).into_document(ts)
}

/// Keep insertion timestamps distinct.
pub async fn tick() {
    tokio::time::sleep(Duration::from_millis(3)).await;
}

pub async fn counts(connector: &FlakyConnector, targets: &[TargetDescriptor]) -> Vec<usize> {
    let mut out = Vec::new();
    for t in targets {
        out.push(connector.raw(t).await.count().await.unwrap());
    }
    out
}

pub async fn titles_in(connector: &FlakyConnector, target: &TargetDescriptor) -> Vec<String> {
    let mut titles: Vec<String> = connector
        .raw(target)
        .await
        .find_all(&FindQuery::all())
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.title)
        .collect();
    titles.sort();
    titles
}
