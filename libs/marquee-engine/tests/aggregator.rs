mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FlakyConnector, doc, gallery, gallery_with_timeout, movie, targets, tick};
use marquee_api::TargetDescriptor;
use marquee_engine::{ConnectionCache, Gallery, GalleryError, ListRequest, TargetPool};

fn page(page: usize, size: usize) -> ListRequest {
    ListRequest {
        page: Some(page),
        page_size: Some(size),
        ..ListRequest::default()
    }
}

#[tokio::test]
async fn merges_newest_first_across_targets() {
    let connector = Arc::new(FlakyConnector::new());
    let ts = targets(3, 2);
    let g = gallery(connector.clone(), ts);

    for i in 0..6 {
        g.insert(movie(&format!("m{i}"))).await.unwrap();
        tick().await;
    }

    let listing = g.list_all(&ListRequest::default()).await.unwrap();
    assert_eq!(listing.total, 6);
    let titles: Vec<&str> = listing.movies.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, ["m5", "m4", "m3", "m2", "m1", "m0"]);
    assert!(listing.movies.windows(2).all(|w| w[0].created_at_ms >= w[1].created_at_ms));
    assert!(!listing.has_more);
}

#[tokio::test]
async fn equal_timestamps_keep_target_priority_order() {
    let connector = Arc::new(FlakyConnector::new());
    let ts = targets(3, 10);
    for (i, t) in ts.iter().enumerate().rev() {
        connector.raw(t).await.insert_one(doc(&format!("from-t{i}"), 1_000)).await.unwrap();
    }
    connector.raw(&ts[2]).await.insert_one(doc("newest", 2_000)).await.unwrap();

    let g = gallery(connector.clone(), ts);
    let listing = g.list_all(&ListRequest::default()).await.unwrap();
    let titles: Vec<&str> = listing.movies.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, ["newest", "from-t0", "from-t1", "from-t2"]);
}

#[tokio::test]
async fn paginates_the_merged_view() {
    let connector = Arc::new(FlakyConnector::new());
    let g = gallery(connector.clone(), targets(2, 5));
    for i in 0..7 {
        g.insert(movie(&format!("m{i}"))).await.unwrap();
        tick().await;
    }

    let first = g.list_all(&page(1, 3)).await.unwrap();
    assert_eq!(first.total, 7);
    assert!(first.has_more);
    assert_eq!(first.movies.len(), 3);
    assert_eq!(first.movies[0].title, "m6");

    let last = g.list_all(&page(3, 3)).await.unwrap();
    assert_eq!(last.movies.len(), 1);
    assert_eq!(last.movies[0].title, "m0");
    assert!(!last.has_more);

    let beyond = g.list_all(&page(9, 3)).await.unwrap();
    assert!(beyond.movies.is_empty());
    assert_eq!(beyond.total, 7);
}

#[tokio::test]
async fn page_parameters_are_clamped() {
    let connector = Arc::new(FlakyConnector::new());
    let cache = ConnectionCache::new(connector.clone(), Duration::from_secs(1));
    let g = Gallery::new(TargetPool::new(targets(1, 50)), cache, 4, 5);
    for i in 0..8 {
        g.insert(movie(&format!("m{i}"))).await.unwrap();
    }

    let zero = g.list_all(&page(0, 0)).await.unwrap();
    assert_eq!(zero.page, 1);
    assert_eq!(zero.page_size, 1);

    let huge = g.list_all(&page(1, 1_000)).await.unwrap();
    assert_eq!(huge.page_size, 5);
    assert_eq!(huge.movies.len(), 5);

    let default = g.list_all(&ListRequest::default()).await.unwrap();
    assert_eq!(default.page_size, 4);
}

#[tokio::test]
async fn search_is_case_insensitive_substring() {
    let connector = Arc::new(FlakyConnector::new());
    let g = gallery(connector.clone(), targets(2, 2));
    for title in ["Alien", "Aliens", "Heat", "ALIEN³"] {
        g.insert(movie(title)).await.unwrap();
        tick().await;
    }

    let found = g
        .list_all(&ListRequest {
            search: Some("alien".into()),
            ..ListRequest::default()
        })
        .await
        .unwrap();
    assert_eq!(found.total, 3);
    assert!(found.movies.iter().all(|m| m.title.to_lowercase().contains("alien")));

    let blank = g
        .list_all(&ListRequest {
            search: Some("  ".into()),
            ..ListRequest::default()
        })
        .await
        .unwrap();
    assert_eq!(blank.total, 4);
}

#[tokio::test]
async fn inserted_record_round_trips_through_search() {
    let connector = Arc::new(FlakyConnector::new());
    let g = gallery(connector.clone(), targets(2, 2));
    g.insert(movie("Other")).await.unwrap();
    let stored = g.insert(movie("Round Trip")).await.unwrap().record;

    let found = g
        .list_all(&ListRequest {
            search: Some("Round Trip".into()),
            ..ListRequest::default()
        })
        .await
        .unwrap();
    assert_eq!(found.total, 1);
    let m = &found.movies[0];
    assert_eq!((&m.title, &m.thumbnail_url, &m.link), (&stored.title, &stored.thumbnail_url, &stored.link));
    assert_eq!(m.id, stored.id);
}

#[tokio::test]
async fn unreachable_target_yields_partial_results() {
    let connector = Arc::new(FlakyConnector::new());
    let ts = targets(2, 2);
    let g = gallery(connector.clone(), ts.clone());
    for i in 0..4 {
        g.insert(movie(&format!("m{i}"))).await.unwrap();
    }

    connector.take_down("t0");
    let listing = g.list_all(&ListRequest::default()).await.unwrap();
    assert_eq!(listing.total, 2);
    let mut titles: Vec<&str> = listing.movies.iter().map(|m| m.title.as_str()).collect();
    titles.sort();
    assert_eq!(titles, ["m2", "m3"]);
}

#[tokio::test]
async fn target_that_never_answers_is_skipped_for_reads() {
    let connector = Arc::new(FlakyConnector::new());
    let ts = targets(2, 2);
    let g = gallery_with_timeout(connector.clone(), ts.clone(), Duration::from_millis(50));
    for i in 0..4 {
        g.insert(movie(&format!("m{i}"))).await.unwrap();
    }

    connector.stall("t0");
    let listing = g.list_all(&ListRequest::default()).await.unwrap();
    assert_eq!(listing.total, 2);
    let mut titles: Vec<&str> = listing.movies.iter().map(|m| m.title.as_str()).collect();
    titles.sort();
    assert_eq!(titles, ["m2", "m3"]);
}

#[tokio::test]
async fn every_target_down_is_an_error_for_reads() {
    let connector = Arc::new(FlakyConnector::new());
    let g = gallery(connector.clone(), targets(2, 2));
    connector.take_down("t0");
    connector.take_down("t1");

    let err = g.list_all(&ListRequest::default()).await.unwrap_err();
    assert!(matches!(err, GalleryError::AllTargetsUnavailable { attempted: 2 }));
}

#[tokio::test]
async fn status_reports_reachability() {
    let connector = Arc::new(FlakyConnector::new());
    let ts = vec![
        TargetDescriptor::new("hot", "memory://hot", 3, 0),
        TargetDescriptor::new("cold", "memory://cold", 7, 1),
    ];
    let g = gallery(connector.clone(), ts);
    g.insert(movie("x")).await.unwrap();
    connector.take_down("cold");

    let status = g.target_status().await;
    assert_eq!(status.len(), 2);
    assert_eq!(status[0].name, "hot");
    assert_eq!(status[0].count, Some(1));
    assert!(status[0].reachable);
    assert!(!status[1].reachable);
    assert!(status[1].error.as_deref().unwrap_or("").contains("refused"));

    assert_eq!(g.probe().await, 1);
    g.shutdown().await;
    assert!(g.cache().cached_names().await.is_empty());
}
