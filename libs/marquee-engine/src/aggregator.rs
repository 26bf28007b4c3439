use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;

use marquee_api::{FindQuery, MovieRecord, StoreError, TargetDescriptor};

use crate::connection::ConnectionCache;
use crate::error::GalleryError;
use crate::pool::TargetPool;

/// Parameters of a listing request. `None` fields take the configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    /// Case-insensitive substring filter on title.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// One page of the merged, newest-first listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePage {
    pub movies: Vec<MovieRecord>,
    /// Matching records across every reachable target, before pagination.
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub has_more: bool,
}

/// Read path: fan out to every target, merge, sort, paginate.
#[derive(Debug, Clone)]
pub struct Aggregator {
    pool: Arc<TargetPool>,
    cache: Arc<ConnectionCache>,
    default_page_size: usize,
    max_page_size: usize,
}

impl Aggregator {
    pub fn new(
        pool: Arc<TargetPool>,
        cache: Arc<ConnectionCache>,
        default_page_size: usize,
        max_page_size: usize,
    ) -> Self {
        Self {
            pool,
            cache,
            default_page_size: default_page_size.max(1),
            max_page_size: max_page_size.max(1),
        }
    }

    /// Merged listing across all targets.
    ///
    /// Unreachable targets are skipped: partial results are returned and
    /// `total` only counts what was reachable. Fails only when no target
    /// answered at all.
    pub async fn list_all(&self, req: &ListRequest) -> Result<MoviePage, GalleryError> {
        let page = req.page.unwrap_or(1).max(1);
        let page_size = req
            .page_size
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size);

        let query = FindQuery {
            title_contains: req.search.clone().filter(|s| !s.trim().is_empty()),
            skip: 0,
            limit: None,
        };

        let results = join_all(self.pool.iter().map(|t| self.fetch(t, &query))).await;

        let mut merged = Vec::new();
        let mut answered = 0usize;
        for (target, result) in self.pool.iter().zip(results) {
            match result {
                Ok(records) => {
                    answered += 1;
                    merged.extend(records);
                }
                Err(e) => {
                    tracing::warn!(target_name = %target.name, error = %e, "target skipped for read");
                }
            }
        }
        if answered == 0 && !self.pool.is_empty() {
            return Err(GalleryError::AllTargetsUnavailable {
                attempted: self.pool.len(),
            });
        }

        // merged is in priority order; a stable sort keeps it for equal timestamps
        merged.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));

        let total = merged.len();
        let skip = (page - 1).saturating_mul(page_size);
        let movies = FindQuery {
            skip,
            limit: Some(page_size),
            ..FindQuery::default()
        }
        .paginate(merged);
        let has_more = skip.saturating_add(movies.len()) < total;

        Ok(MoviePage {
            movies,
            total,
            page,
            page_size,
            has_more,
        })
    }

    async fn fetch(&self, target: &TargetDescriptor, query: &FindQuery) -> Result<Vec<MovieRecord>, StoreError> {
        let store = self.cache.acquire(target).await?;
        self.cache.call(&target.name, "find", store.find_all(query)).await
    }
}
