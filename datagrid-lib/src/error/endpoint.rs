//! Endpoint error types

use std::sync::Arc;
use std::time::Duration;

/// Errors produced while fetching a window or a size probe from an endpoint.
///
/// Cheap to clone so one failure can be handed to every observer of the
/// request that produced it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EndpointError {
    /// The endpoint reported a failure.
    #[error("Endpoint failed: {message}")]
    Failed {
        /// Error message.
        message: String,
        /// Underlying cause, if the endpoint supplied one.
        #[source]
        source: Option<Arc<dyn std::error::Error + Send + Sync>>,
    },

    /// The call did not settle within the configured request timeout.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// The endpoint returned a page that breaks the page invariants.
    #[error("Invalid page: {0}")]
    InvalidPage(String),
}

impl EndpointError {
    /// Creates a new failure with a message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new failure wrapping an underlying error.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Failed {
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }

    /// Creates a new invalid page error.
    pub fn invalid_page(message: impl Into<String>) -> Self {
        Self::InvalidPage(message.into())
    }
}
