use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use marquee_api::{FindQuery, MovieDocument, MovieRecord, StoreError, StoreFuture, TargetStore};

// ════════════════════════════════════════════════════════════════
//  FileTarget
// ════════════════════════════════════════════════════════════════

/// JSON-lines collection: one [`MovieRecord`] per line, in write order.
///
/// The whole file is loaded on open. Every mutation rewrites it through a
/// temp file + rename, so a crash never leaves a half-written collection.
pub struct FileTarget {
    inner: Arc<Collection>,
}

struct Collection {
    path: PathBuf,
    sync: bool,
    records: Mutex<Vec<MovieRecord>>,
}

impl FileTarget {
    pub async fn open(path: impl Into<PathBuf>, sync: bool) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::from(e).with_context(format!("mkdir {}", parent.display())))?;
        }
        let records = load(&path).await?;
        Ok(Self {
            inner: Arc::new(Collection {
                path,
                sync,
                records: Mutex::new(records),
            }),
        })
    }

    pub async fn len(&self) -> usize {
        self.inner.records.lock().await.len()
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Apply `edit` to a copy of the records, persist the copy, then swap it in.
    /// `edit` returns `None` when nothing changed and the file is left alone.
    ///
    /// Runs on its own task: a caller that stops waiting (per-call timeout)
    /// cannot leave the file and the in-memory view out of step.
    async fn mutate<R, F>(&self, edit: F) -> Result<Option<R>, StoreError>
    where
        R: Send + 'static,
        F: FnOnce(&mut Vec<MovieRecord>) -> Option<R> + Send + 'static,
    {
        let inner = self.inner.clone();
        let task = tokio::spawn(async move {
            let mut records = inner.records.lock().await;
            let mut next = records.clone();
            let Some(out) = edit(&mut next) else {
                return Ok(None);
            };
            inner.persist(&next).await?;
            *records = next;
            Ok::<_, StoreError>(Some(out))
        });
        task.await
            .map_err(|e| StoreError::logic(format!("write task for {}: {e}", self.inner.path.display())))?
    }
}

impl Collection {
    async fn persist(&self, records: &[MovieRecord]) -> Result<(), StoreError> {
        let mut buf = Vec::with_capacity(records.len() * 128);
        for record in records {
            serde_json::to_writer(&mut buf, record)?;
            buf.push(b'\n');
        }

        let tmp = self.path.with_extension("jsonl.tmp");
        let mut f = tokio::fs::File::create(&tmp)
            .await
            .map_err(|e| StoreError::from(e).with_context(format!("create {}", tmp.display())))?;
        f.write_all(&buf).await?;
        if self.sync {
            f.sync_all().await?;
        }
        drop(f);

        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::from(e).with_context(format!("rename {}", tmp.display())))
    }
}

async fn load(path: &Path) -> Result<Vec<MovieRecord>, StoreError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::from(e).with_context(format!("read {}", path.display()))),
    };

    let mut records = Vec::new();
    for (n, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: MovieRecord = serde_json::from_str(line)
            .map_err(|e| StoreError::from(e).with_context(format!("{}:{}", path.display(), n + 1)))?;
        records.push(record);
    }
    Ok(records)
}

// ════════════════════════════════════════════════════════════════
//  TargetStore impl
// ════════════════════════════════════════════════════════════════

impl TargetStore for FileTarget {
    fn count(&self) -> StoreFuture<'_, usize> {
        Box::pin(async move { Ok(self.len().await) })
    }

    fn find_all<'a>(&'a self, query: &'a FindQuery) -> StoreFuture<'a, Vec<MovieRecord>> {
        Box::pin(async move {
            let records = self.inner.records.lock().await;
            let mut result: Vec<MovieRecord> = records
                .iter()
                .filter(|r| query.matches(&r.title))
                .cloned()
                .collect();
            result.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
            Ok(query.paginate(result))
        })
    }

    fn find_oldest(&self) -> StoreFuture<'_, Option<MovieRecord>> {
        Box::pin(async move {
            let records = self.inner.records.lock().await;
            // first of equal timestamps is the earliest write
            Ok(records.iter().min_by_key(|r| r.created_at_ms).cloned())
        })
    }

    fn insert_one(&self, doc: MovieDocument) -> StoreFuture<'_, MovieRecord> {
        Box::pin(async move {
            let record = MovieRecord::from_document(uuid::Uuid::new_v4().simple().to_string(), doc);
            self.mutate(move |records| {
                records.push(record.clone());
                Some(record)
            })
            .await?
            .ok_or_else(|| StoreError::logic("insert left the collection unchanged"))
        })
    }

    fn replace_one<'a>(&'a self, id: &'a str, doc: MovieDocument) -> StoreFuture<'a, Option<MovieRecord>> {
        let id = id.to_string();
        Box::pin(async move {
            self.mutate(move |records| {
                let pos = records.iter().position(|r| r.id == id)?;
                let mut record = records.remove(pos);
                record.overwrite(doc);
                records.push(record.clone());
                Some(record)
            })
            .await
        })
    }

    fn delete_one<'a>(&'a self, id: &'a str) -> StoreFuture<'a, bool> {
        let id = id.to_string();
        Box::pin(async move {
            let removed = self
                .mutate(move |records| {
                    let pos = records.iter().position(|r| r.id == id)?;
                    Some(records.remove(pos))
                })
                .await?;
            Ok(removed.is_some())
        })
    }
}
