use std::sync::Arc;

use marquee_api::{MovieDocument, MovieRecord, NewMovie, TargetDescriptor, TargetStore, now_ms};

use crate::connection::ConnectionCache;
use crate::error::GalleryError;
use crate::pool::TargetPool;

/// Result of [`Router::insert`].
#[derive(Debug, Clone)]
pub struct InsertOutcome {
    /// Name of the target that stored the record.
    pub target: String,
    /// Position of that target in the pool.
    pub target_index: usize,
    pub record: MovieRecord,
    /// `true` when an existing record was overwritten to make room.
    pub overwritten: bool,
}

/// Result of a successful [`Router::delete_by_id`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub target: String,
}

/// Write path: capacity-aware placement with oldest-record eviction.
#[derive(Debug, Clone)]
pub struct Router {
    pool: Arc<TargetPool>,
    cache: Arc<ConnectionCache>,
}

/// A reachable target that reported `count >= capacity`.
struct FullTarget<'a> {
    index: usize,
    target: &'a TargetDescriptor,
    store: Arc<dyn TargetStore>,
}

impl Router {
    pub fn new(pool: Arc<TargetPool>, cache: Arc<ConnectionCache>) -> Self {
        Self { pool, cache }
    }

    /// Store a new record.
    ///
    /// 1. First target (priority order) with `count < capacity` gets a plain insert.
    /// 2. Otherwise the oldest record of the first reachable full target is
    ///    replaced in place (its id is kept).
    /// 3. Unreachable targets are skipped; if none is reachable the call fails
    ///    with [`GalleryError::AllTargetsUnavailable`].
    ///
    /// Capacity is a soft cap: concurrent inserts that observe the same free
    /// slot can overshoot by the number of in-flight requests.
    pub async fn insert(&self, movie: NewMovie) -> Result<InsertOutcome, GalleryError> {
        let movie = movie.validate().map_err(GalleryError::Validation)?;
        let doc = movie.into_document(now_ms());

        let mut full = Vec::new();
        for (index, target) in self.pool.iter().enumerate() {
            let store = match self.cache.acquire(target).await {
                Ok(store) => store,
                Err(e) => {
                    skip(target, e);
                    continue;
                }
            };
            let count = match self.cache.call(&target.name, "count", store.count()).await {
                Ok(count) => count,
                Err(e) => {
                    skip(target, e);
                    continue;
                }
            };

            if count >= target.capacity {
                tracing::debug!(target_name = %target.name, count, capacity = target.capacity, "target full");
                full.push(FullTarget { index, target, store });
                continue;
            }

            match self
                .cache
                .call(&target.name, "insert", store.insert_one(doc.clone()))
                .await
            {
                Ok(record) => {
                    tracing::info!(target_name = %target.name, id = %record.id, "stored movie");
                    return Ok(InsertOutcome {
                        target: target.name.clone(),
                        target_index: index,
                        record,
                        overwritten: false,
                    });
                }
                Err(e) => skip(target, e),
            }
        }

        for candidate in &full {
            match self.evict_into(candidate, doc.clone()).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) => skip(candidate.target, e),
            }
        }

        tracing::error!(targets = self.pool.len(), "no target accepted the write");
        Err(GalleryError::AllTargetsUnavailable {
            attempted: self.pool.len(),
        })
    }

    /// Overwrite the oldest record of a full target. Falls back to a plain
    /// insert when the target turns out to be empty (capacity 0) or the
    /// oldest record vanished between lookup and replace.
    async fn evict_into(
        &self,
        candidate: &FullTarget<'_>,
        doc: MovieDocument,
    ) -> Result<InsertOutcome, marquee_api::StoreError> {
        let name = &candidate.target.name;
        let store = &candidate.store;

        let oldest = self.cache.call(name, "find_oldest", store.find_oldest()).await?;
        if let Some(oldest) = oldest {
            let replaced = self
                .cache
                .call(name, "replace", store.replace_one(&oldest.id, doc.clone()))
                .await?;
            if let Some(record) = replaced {
                tracing::info!(target_name = %name, id = %record.id, evicted = %oldest.title, "overwrote oldest movie");
                return Ok(InsertOutcome {
                    target: name.clone(),
                    target_index: candidate.index,
                    record,
                    overwritten: true,
                });
            }
            tracing::debug!(target_name = %name, id = %oldest.id, "oldest record vanished before replace");
        }

        let record = self.cache.call(name, "insert", store.insert_one(doc)).await?;
        tracing::info!(target_name = %name, id = %record.id, "stored movie in full target");
        Ok(InsertOutcome {
            target: name.clone(),
            target_index: candidate.index,
            record,
            overwritten: false,
        })
    }

    /// Delete `id` from the first target (priority order) that holds it.
    ///
    /// Returns [`GalleryError::NotFound`] when every reachable target was
    /// probed without a hit, [`GalleryError::AllTargetsUnavailable`] when
    /// none could be probed at all.
    pub async fn delete_by_id(&self, id: &str) -> Result<DeleteOutcome, GalleryError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(GalleryError::Validation("missing movie id".into()));
        }

        let mut probed = 0usize;
        for target in self.pool.iter() {
            let store = match self.cache.acquire(target).await {
                Ok(store) => store,
                Err(e) => {
                    skip(target, e);
                    continue;
                }
            };
            match self.cache.call(&target.name, "delete", store.delete_one(id)).await {
                Ok(true) => {
                    tracing::info!(target_name = %target.name, id, "deleted movie");
                    return Ok(DeleteOutcome {
                        target: target.name.clone(),
                    });
                }
                Ok(false) => probed += 1,
                Err(e) => skip(target, e),
            }
        }

        if probed == 0 {
            return Err(GalleryError::AllTargetsUnavailable {
                attempted: self.pool.len(),
            });
        }
        Err(GalleryError::NotFound(id.to_string()))
    }
}

fn skip(target: &TargetDescriptor, e: marquee_api::StoreError) {
    let err = GalleryError::TargetUnavailable {
        target: target.name.clone(),
        source: e,
    };
    tracing::warn!(error = %err, "skipping target");
}
