//! HTTP surface.

use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::any,
};
use tracing::{error, warn};

use crate::{
    dispatch::{Dispatcher, IncomingRequest},
    error::DispatchError,
};

/// Current wall-clock time in seconds since the epoch.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Builds the router serving slash commands on `path`.
pub fn router(path: &str, dispatcher: Dispatcher) -> Router {
    Router::new()
        .route(path, any(handle_slash_command))
        .with_state(Arc::new(dispatcher))
}

/// Handles one slash-command callback.
async fn handle_slash_command(
    State(dispatcher): State<Arc<Dispatcher>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = IncomingRequest::new(headers, body);

    match dispatcher.handle(&request, unix_now()).await {
        Ok(decision) => decision.into_response(),
        Err(err) => {
            match &err {
                DispatchError::MalformedRequest(reason) => {
                    warn!(%reason, "rejected malformed slash command");
                }
                DispatchError::SecretStore(source) => {
                    error!(error = %source, "failed to fetch signing secret");
                }
                DispatchError::Publish(source) => {
                    error!(error = %source, "failed to publish retry job");
                }
            }
            err.into_response()
        }
    }
}
