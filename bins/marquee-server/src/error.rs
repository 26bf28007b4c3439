#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{0}")]
    Gallery(#[from] marquee_engine::GalleryError),

    #[error("api server: {0}")]
    Api(#[source] std::io::Error),

    #[error("signal: {0}")]
    Signal(#[source] std::io::Error),
}
