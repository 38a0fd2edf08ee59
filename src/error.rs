use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::views::BadRequestTemplate;

/// Failures that end a page request without rendering the page itself.
#[derive(Debug, Error)]
pub enum PageError {
    /// Missing or malformed input, or a record the caller may not see.
    /// Rendered as the same generic page in every case.
    #[error("bad request")]
    BadRequest,

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),

    #[error("template error: {0}")]
    Template(#[from] askama::Error),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest => {
                let page = BadRequestTemplate
                    .render()
                    .unwrap_or_else(|e| {
                        error!(error = %e, "bad request template render failed");
                        "Bad Request".to_string()
                    });
                (StatusCode::BAD_REQUEST, Html(page)).into_response()
            }
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg).into_response(),
            Self::Internal(e) => {
                error!(error = %e, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            Self::Template(e) => {
                error!(error = %e, "template render failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            Self::Session(e) => {
                error!(error = %e, "session store failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: PageError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn status_codes() {
        assert_eq!(status_of(PageError::BadRequest), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(PageError::Unauthorized("x".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(PageError::Forbidden("x".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(PageError::Internal(anyhow::anyhow!("db down"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
