use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use notch_core::error::NotchError;

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(NotchError::Validation(msg.into()).into())
    }

    /// Construct a 401 Unauthorized error.
    pub fn unauthorized() -> Self {
        Self(NotchError::Unauthorized.into())
    }

    /// Wrap a `spawn_blocking` join failure.
    pub fn join(e: tokio::task::JoinError) -> Self {
        Self(anyhow::anyhow!("task join error: {e}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let Some(e) = self.0.downcast_ref::<NotchError>() else {
            tracing::error!(error = %format!("{:#}", self.0), "request failed");
            let body = serde_json::json!({ "error": self.0.to_string() });
            return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response();
        };

        let status = match e {
            NotchError::Validation(_) => StatusCode::BAD_REQUEST,
            NotchError::OrderNotFound(_) => StatusCode::NOT_FOUND,
            NotchError::Unauthorized => StatusCode::UNAUTHORIZED,
            NotchError::Storage { .. }
            | NotchError::SessionDb(_)
            | NotchError::Io(_)
            | NotchError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match e {
            NotchError::Storage { reason, .. } => {
                tracing::error!(error = %e, "order storage unreadable");
                serde_json::json!({ "error": "could not read order file", "detail": reason })
            }
            _ if status.is_server_error() => {
                tracing::error!(error = %e, "request failed");
                serde_json::json!({ "error": e.to_string() })
            }
            _ => serde_json::json!({ "error": e.to_string() }),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use std::path::PathBuf;

    fn status_of(err: NotchError) -> StatusCode {
        AppError(err.into()).into_response().status()
    }

    #[test]
    fn validation_maps_to_400() {
        assert_eq!(
            status_of(NotchError::Validation("bad line".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn order_not_found_maps_to_404() {
        assert_eq!(
            status_of(NotchError::OrderNotFound("X".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn unauthorized_maps_to_401() {
        assert_eq!(
            AppError::unauthorized().into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn storage_maps_to_500() {
        let err = NotchError::Storage {
            path: PathBuf::from("/data/X.json"),
            reason: "expected value at line 1".into(),
        };
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn io_error_maps_to_500() {
        let io_err = std::io::Error::other("disk full");
        assert_eq!(
            status_of(NotchError::Io(io_err)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn non_notch_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn bad_request_constructor_maps_to_400() {
        assert_eq!(
            AppError::bad_request("missing data").into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn response_body_is_json() {
        let response = AppError(NotchError::OrderNotFound("X".into()).into()).into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
