use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;

use marquee_api::{NewMovie, TargetConnector, TargetDescriptor};

use crate::aggregator::{Aggregator, ListRequest, MoviePage};
use crate::config::MarqueeConfig;
use crate::connection::ConnectionCache;
use crate::error::GalleryError;
use crate::pool::TargetPool;
use crate::router::{DeleteOutcome, InsertOutcome, Router};

/// Reachability snapshot of one target.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetStatus {
    pub name: String,
    pub priority: usize,
    pub capacity: usize,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The running gallery. Owns the target pool and the connection cache
/// shared by the router (writes) and the aggregator (reads).
#[derive(Debug)]
pub struct Gallery {
    pool: Arc<TargetPool>,
    cache: Arc<ConnectionCache>,
    router: Router,
    aggregator: Aggregator,
}

impl Gallery {
    /// Build a gallery from configuration. No target is contacted yet.
    pub fn bootstrap(config: &MarqueeConfig, connector: Arc<dyn TargetConnector>) -> Result<Self, GalleryError> {
        let targets = config.resolve_targets()?;
        for t in &targets {
            tracing::info!(
                target_name = %t.name,
                uri = %t.redacted_uri(),
                capacity = t.capacity,
                priority = t.priority,
                "registered target"
            );
        }
        let cache = ConnectionCache::new(connector, config.request_timeout());
        Ok(Self::new(
            TargetPool::new(targets),
            cache,
            config.page_size,
            config.max_page_size,
        ))
    }

    pub fn new(pool: TargetPool, cache: ConnectionCache, page_size: usize, max_page_size: usize) -> Self {
        let pool = Arc::new(pool);
        let cache = Arc::new(cache);
        Self {
            router: Router::new(pool.clone(), cache.clone()),
            aggregator: Aggregator::new(pool.clone(), cache.clone(), page_size, max_page_size),
            pool,
            cache,
        }
    }

    pub fn pool(&self) -> &TargetPool {
        &self.pool
    }

    pub fn cache(&self) -> &ConnectionCache {
        &self.cache
    }

    pub async fn insert(&self, movie: NewMovie) -> Result<InsertOutcome, GalleryError> {
        self.router.insert(movie).await
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<DeleteOutcome, GalleryError> {
        self.router.delete_by_id(id).await
    }

    pub async fn list_all(&self, req: &ListRequest) -> Result<MoviePage, GalleryError> {
        self.aggregator.list_all(req).await
    }

    /// Connect to every target and report its record count.
    pub async fn target_status(&self) -> Vec<TargetStatus> {
        join_all(self.pool.iter().map(|t| self.status_of(t))).await
    }

    async fn status_of(&self, target: &TargetDescriptor) -> TargetStatus {
        let count = match self.cache.acquire(target).await {
            Ok(store) => self.cache.call(&target.name, "count", store.count()).await,
            Err(e) => Err(e),
        };
        let (count, error) = match count {
            Ok(c) => (Some(c), None),
            Err(e) => (None, Some(e.to_string())),
        };
        TargetStatus {
            name: target.name.clone(),
            priority: target.priority,
            capacity: target.capacity,
            reachable: count.is_some(),
            count,
            error,
        }
    }

    /// Log reachability of every target. Never fails: an unreachable
    /// target only means reads are partial and writes skip it.
    pub async fn probe(&self) -> usize {
        let statuses = self.target_status().await;
        let reachable = statuses.iter().filter(|s| s.reachable).count();
        for s in &statuses {
            match (&s.count, &s.error) {
                (Some(count), _) => {
                    tracing::info!(target_name = %s.name, count, capacity = s.capacity, "target reachable")
                }
                (None, Some(error)) => {
                    tracing::warn!(target_name = %s.name, error = %error, "target unreachable")
                }
                (None, None) => {}
            }
        }
        reachable
    }

    /// Close all cached connections.
    pub async fn shutdown(&self) {
        self.cache.shutdown().await;
        tracing::info!("gallery shut down");
    }
}
