use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use marquee_engine::GalleryError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Gallery(#[from] GalleryError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedPayload(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Gallery(e) => match e {
                GalleryError::Validation(_) => StatusCode::BAD_REQUEST,
                GalleryError::NotFound(_) => StatusCode::NOT_FOUND,
                GalleryError::AllTargetsUnavailable { .. } | GalleryError::TargetUnavailable { .. } => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                GalleryError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_api::StoreError;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(GalleryError::Validation("title".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::from(GalleryError::NotFound("id".into())).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(GalleryError::AllTargetsUnavailable { attempted: 3 }).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(GalleryError::TargetUnavailable {
                target: "t0".into(),
                source: StoreError::io("reset"),
            })
            .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(GalleryError::Config("bad".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
