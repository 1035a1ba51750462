//! Unified error handling for the JSON API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::shopify::{AdminShopifyError, MetafieldUserError};

/// Application-level error type for the JSON endpoints.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] AdminShopifyError),

    /// No shop has installed the app (or the requested one has not).
    #[error("No installed shop found")]
    NoInstallation,

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// A mutation was rejected with `userErrors`.
    #[error("{message}")]
    UserErrors {
        /// First error message.
        message: String,
        /// Every error returned.
        details: Vec<MetafieldUserError>,
    },

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) | Self::NoInstallation => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Shopify(_) => StatusCode::BAD_GATEWAY,
            Self::BadRequest(_) | Self::UserErrors { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Shopify(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "API request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let body = match self {
            Self::Database(_) | Self::Internal(_) => json!({ "error": "Internal server error" }),
            Self::Shopify(_) => json!({ "error": "External service error" }),
            Self::UserErrors { message, details } => json!({ "error": message, "details": details }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
