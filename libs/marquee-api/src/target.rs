use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::StoreError;
use crate::query::FindQuery;
use crate::record::{MovieDocument, MovieRecord};

/// Boxed future returned by target methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// A configured storage target: where it lives, how much it holds and
/// where it sits in the write preference order.
#[derive(Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub name: String,
    /// Connection string. May embed credentials, never log it whole.
    pub uri: String,
    /// Maximum record count at steady state.
    pub capacity: usize,
    /// Lower value = preferred for writes.
    pub priority: usize,
}

impl TargetDescriptor {
    pub fn new(name: impl Into<String>, uri: impl Into<String>, capacity: usize, priority: usize) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            capacity,
            priority,
        }
    }

    /// URI scheme (`memory`, `file`, ...). Empty if the URI has none.
    pub fn scheme(&self) -> &str {
        self.uri.split_once("://").map(|(s, _)| s).unwrap_or("")
    }

    /// URI with everything after the scheme hidden, safe for logs.
    pub fn redacted_uri(&self) -> String {
        match self.uri.split_once("://") {
            Some((scheme, _)) => format!("{scheme}://***"),
            None => "***".into(),
        }
    }
}

impl fmt::Debug for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetDescriptor")
            .field("name", &self.name)
            .field("uri", &self.redacted_uri())
            .field("capacity", &self.capacity)
            .field("priority", &self.priority)
            .finish()
    }
}

/// One live connection to a record collection.
///
/// Handles are shared between concurrent callers; implementations must
/// support multiplexed calls.
pub trait TargetStore: Send + Sync {
    /// Number of records currently held.
    fn count(&self) -> StoreFuture<'_, usize>;

    /// Records matching `query`, newest first.
    fn find_all<'a>(&'a self, query: &'a FindQuery) -> StoreFuture<'a, Vec<MovieRecord>>;

    /// Record with the smallest `created_at_ms`, if any.
    fn find_oldest(&self) -> StoreFuture<'_, Option<MovieRecord>>;

    /// Insert a new record. The target assigns the identifier.
    fn insert_one(&self, doc: MovieDocument) -> StoreFuture<'_, MovieRecord>;

    /// Replace the content of `id` in place. `None` if `id` is unknown.
    fn replace_one<'a>(&'a self, id: &'a str, doc: MovieDocument) -> StoreFuture<'a, Option<MovieRecord>>;

    /// Delete `id`. `false` if it was not present.
    fn delete_one<'a>(&'a self, id: &'a str) -> StoreFuture<'a, bool>;

    /// Whether the handle can still be reused. A cache drops unhealthy handles.
    fn is_healthy(&self) -> bool {
        true
    }

    /// Release the underlying session.
    fn close(&self) -> StoreFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }
}

/// Opens [`TargetStore`] handles from descriptors.
pub trait TargetConnector: Send + Sync {
    fn connect<'a>(&'a self, target: &'a TargetDescriptor) -> StoreFuture<'a, Arc<dyn TargetStore>>;
}
