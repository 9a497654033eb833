//! Error types for the notify crate

use athena_core::EventKind;
use thiserror::Error;

/// Routing table configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("Invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Template errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("No template registered for {0}")]
    MissingTemplate(EventKind),

    #[error("Invalid template for {kind}: {reason}")]
    InvalidTemplate { kind: EventKind, reason: String },

    #[error("Failed to render {kind}: {reason}")]
    Render { kind: EventKind, reason: String },
}

/// Errors delivering a notification to its transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("No recipient to deliver to")]
    NoRecipient,
}

impl From<reqwest::Error> for DeliveryError {
    fn from(e: reqwest::Error) -> Self {
        DeliveryError::Http(e.to_string())
    }
}
