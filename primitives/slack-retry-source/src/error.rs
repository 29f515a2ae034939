//! Dispatcher errors and their HTTP mapping.
//!
//! Slack shows the response body to the user as-is, so every error carries
//! a readable message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{form::FormError, publisher::PublishError, secrets::SecretError};

/// Failures that stop a request before a decision is reached.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request is missing a field or header, or has one we cannot read.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// The signing secret could not be fetched.
    #[error("Unable to verify request")]
    SecretStore(#[from] SecretError),

    /// The retry job could not be handed to the engine.
    #[error("Unable to dispatch retry request")]
    Publish(#[from] PublishError),
}

impl From<FormError> for DispatchError {
    fn from(err: FormError) -> Self {
        Self::MalformedRequest(err.to_string())
    }
}

impl DispatchError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::SecretStore(_) | Self::Publish(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
