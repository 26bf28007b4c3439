use marquee_api::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error("config error: {0}")]
    Config(String),

    /// Missing or empty required field. No target was contacted.
    #[error("validation: {0}")]
    Validation(String),

    #[error("movie '{0}' not found")]
    NotFound(String),

    #[error("target '{target}' unavailable: {source}")]
    TargetUnavailable { target: String, source: StoreError },

    #[error("all targets unavailable ({attempted} attempted)")]
    AllTargetsUnavailable { attempted: usize },
}

impl GalleryError {
    /// Whether the caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        match self {
            GalleryError::AllTargetsUnavailable { .. } => true,
            GalleryError::TargetUnavailable { source, .. } => source.is_transient(),
            _ => false,
        }
    }
}
