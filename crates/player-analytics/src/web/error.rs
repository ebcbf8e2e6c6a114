// HTTP error responses: HTML error pages and JSON API errors.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::config::{Config, SiteConfig};
use crate::data::LoadError;

use super::render::{self, Action};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PageError {
    #[error("page not found")]
    NotFound,

    #[error("access forbidden")]
    Forbidden,

    #[error("failed to load player data: {0}")]
    Load(#[from] LoadError),
}

impl PageError {
    pub fn status(&self) -> StatusCode {
        match self {
            PageError::NotFound => StatusCode::NOT_FOUND,
            PageError::Forbidden => StatusCode::FORBIDDEN,
            PageError::Load(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Attach what the error page needs to render: site chrome, the
    /// environment, and the URL that "Try Again" reloads.
    pub fn page(self, config: &Config, retry_href: impl Into<String>) -> ErrorPage {
        ErrorPage {
            error: self,
            site: config.site.clone(),
            show_details: config.server.environment.is_development(),
            retry_href: retry_href.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// HTML error page
// ---------------------------------------------------------------------------

/// A `PageError` ready to render as HTML.
#[derive(Debug)]
pub struct ErrorPage {
    error: PageError,
    site: SiteConfig,
    show_details: bool,
    retry_href: String,
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        let status = self.error.status();
        let html = match &self.error {
            PageError::NotFound => render::error_page(
                &self.site,
                "404",
                "Oops! The page you're looking for doesn't exist.",
                &[Action {
                    href: "/",
                    label: "Back to Home",
                }],
                None,
            ),
            PageError::Forbidden => render::error_page(
                &self.site,
                "403",
                "You don't have permission to access this page.",
                &[Action {
                    href: "/",
                    label: "Back to Safety",
                }],
                None,
            ),
            PageError::Load(e) => {
                error!("rendering error page: {}", e);
                let details = self.show_details.then(|| self.error.to_string());
                render::error_page(
                    &self.site,
                    "Something went wrong",
                    "We couldn't load the player statistics. Please try again.",
                    &[
                        Action {
                            href: &self.retry_href,
                            label: "Try Again",
                        },
                        Action {
                            href: "/",
                            label: "Home",
                        },
                    ],
                    details.as_deref(),
                )
            }
        };
        (status, Html(html)).into_response()
    }
}

// ---------------------------------------------------------------------------
// JSON API errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to load player data")]
    Load(#[from] LoadError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Load(e) => {
                error!("player API failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorBody {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
