mod error;
mod http;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use marquee_engine::Gallery;

pub use error::ApiError;

#[derive(Clone)]
pub(crate) struct AppState {
    gallery: Arc<Gallery>,
}

/// Build the HTTP router over a gallery.
///
/// - `GET /movies?search=&page=&limit=`: merged newest-first listing
/// - `POST /movies`: add an entry
/// - `DELETE /movies?id=`: remove an entry
/// - `GET /api/targets`: per-target reachability
/// - `GET /healthz`
pub fn router(gallery: Arc<Gallery>) -> Router {
    let state = AppState { gallery };

    Router::new()
        .route(
            "/movies",
            get(http::handle_list_movies)
                .post(http::handle_create_movie)
                .delete(http::handle_delete_movie),
        )
        .route("/api/targets", get(http::handle_list_targets))
        .route("/healthz", get(http::handle_health))
        .with_state(state)
}

/// Bind `address` and serve until `shutdown` is cancelled.
pub async fn run(
    address: &str,
    gallery: Arc<Gallery>,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(address).await?;
    tracing::info!(address = %listener.local_addr()?, "api server listening");
    serve(listener, gallery, shutdown).await
}

/// Serve on an already bound listener.
pub async fn serve(
    listener: TcpListener,
    gallery: Arc<Gallery>,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    axum::serve(listener, router(gallery))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
}
