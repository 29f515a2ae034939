//! Slash-command dispatch.
//!
//! One request runs through, in order: form decode, channel check, secret
//! fetch, signature verification, command parse, and for searches a single
//! publish. Each step can end the request.

use std::sync::Arc;

use axum::{
    body::Bytes,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use crate::{
    command::{self, Command, HELP_TEXT},
    error::DispatchError,
    form::SlashCommandForm,
    publisher::JobPublisher,
    secrets::SecretProvider,
    signature::{self, VerificationError},
};

/// Header carrying `v0=<hex hmac>`.
pub const SIGNATURE_HEADER: &str = "x-slack-signature";

/// Header carrying the request time in seconds since the epoch.
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Deployment-time settings for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// The only channel `/retry` may be used from.
    pub authorized_channel_id: String,
    /// Message type retry jobs are published under.
    pub topic: String,
    /// Name of the signing secret in the secret store.
    pub secret_name: String,
}

/// A request as received: headers and the untouched body.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    /// Request headers, looked up case-insensitively.
    pub headers: HeaderMap,
    /// Raw body bytes, exactly as signed.
    pub body: Bytes,
}

impl IncomingRequest {
    /// Wraps received headers and body.
    pub fn new(headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            headers,
            body: body.into(),
        }
    }

    fn header(&self, name: &'static str) -> Result<&str, DispatchError> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| DispatchError::MalformedRequest(format!("missing {name} header")))
    }
}

/// Outcome of a handled request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchDecision {
    /// Used outside the authorized channel.
    Unauthorized,
    /// Timestamp older than five minutes.
    StaleRequest,
    /// Signature mismatch.
    InvalidSignature,
    /// Usage requested.
    HelpResponse,
    /// A retry job was published for `query`.
    SearchDispatched { query: String },
}

impl DispatchDecision {
    /// HTTP status for this decision.
    ///
    /// `Unauthorized` is a 200 so Slack shows the warning to the user.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::StaleRequest | Self::InvalidSignature => StatusCode::PRECONDITION_FAILED,
            Self::Unauthorized | Self::HelpResponse | Self::SearchDispatched { .. } => {
                StatusCode::OK
            }
        }
    }

    /// Text shown to the user.
    pub fn message(&self) -> String {
        match self {
            Self::Unauthorized => {
                "You must use the retry command while inside an authorized channel.".to_string()
            }
            Self::StaleRequest => "Message more than 5 minutes old".to_string(),
            Self::InvalidSignature => "Message signature is invalid".to_string(),
            Self::HelpResponse => HELP_TEXT.to_string(),
            Self::SearchDispatched { query } => {
                format!(":female-detective: looking up {query}...")
            }
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::StaleRequest => "stale_request",
            Self::InvalidSignature => "invalid_signature",
            Self::HelpResponse => "help",
            Self::SearchDispatched { .. } => "search_dispatched",
        }
    }
}

impl IntoResponse for DispatchDecision {
    fn into_response(self) -> Response {
        (self.status(), self.message()).into_response()
    }
}

/// Handles `/retry` requests.
///
/// Holds no per-request state and may be shared across concurrent requests.
#[derive(Clone)]
pub struct Dispatcher {
    config: Arc<DispatchConfig>,
    secrets: Arc<dyn SecretProvider>,
    publisher: Arc<dyn JobPublisher>,
}

impl Dispatcher {
    /// Creates a dispatcher over the given collaborators.
    pub fn new(
        config: DispatchConfig,
        secrets: Arc<dyn SecretProvider>,
        publisher: Arc<dyn JobPublisher>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            secrets,
            publisher,
        }
    }

    /// Decides and acts on one request. `now` is seconds since the epoch.
    pub async fn handle(
        &self,
        request: &IncomingRequest,
        now: f64,
    ) -> Result<DispatchDecision, DispatchError> {
        let form = SlashCommandForm::parse(&request.body)?;

        if form.channel_id() != self.config.authorized_channel_id {
            warn!(
                channel_id = form.channel_id(),
                user_name = form.user_name().unwrap_or("-"),
                "retry command used outside the authorized channel"
            );
            return Ok(DispatchDecision::Unauthorized);
        }

        let timestamp = request.header(TIMESTAMP_HEADER)?;
        // An absent signature fails verification like a wrong one, after the
        // staleness check.
        let delivered_signature = request.header(SIGNATURE_HEADER).unwrap_or_default();

        let secret = self.secrets.get_secret(&self.config.secret_name).await?;

        let decision = match signature::verify(
            &secret,
            timestamp,
            &request.body,
            delivered_signature,
            now,
        ) {
            Ok(()) => self.dispatch(&form).await?,
            Err(VerificationError::StaleRequest) => DispatchDecision::StaleRequest,
            Err(VerificationError::InvalidSignature) => DispatchDecision::InvalidSignature,
            Err(err @ VerificationError::MalformedTimestamp(_)) => {
                return Err(DispatchError::MalformedRequest(err.to_string()));
            }
        };

        info!(
            channel_id = form.channel_id(),
            user_name = form.user_name().unwrap_or("-"),
            decision = decision.label(),
            "handled retry command"
        );

        Ok(decision)
    }

    async fn dispatch(&self, form: &SlashCommandForm) -> Result<DispatchDecision, DispatchError> {
        match command::parse(form.text()) {
            Command::Help => Ok(DispatchDecision::HelpResponse),
            Command::Search(query) => {
                self.publisher
                    .publish(&self.config.topic, form.to_payload())
                    .await?;
                Ok(DispatchDecision::SearchDispatched { query })
            }
        }
    }
}
