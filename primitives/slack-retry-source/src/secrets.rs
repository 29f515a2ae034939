//! Signing secret providers.
//!
//! The signing secret is looked up on every request so a rotated secret
//! takes effect immediately.

use async_trait::async_trait;
use aws_sdk_ssm::Client;
use thiserror::Error;

/// Errors fetching a secret.
#[derive(Debug, Error)]
pub enum SecretError {
    /// The store has no parameter with this name, or it has no value.
    #[error("secret {0:?} not found")]
    NotFound(String),

    /// The store could not be reached or refused the request.
    #[error("secret store request for {name:?} failed: {reason}")]
    Store { name: String, reason: String },
}

/// Source of named secrets.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Fetches and decrypts the secret called `name`.
    async fn get_secret(&self, name: &str) -> Result<String, SecretError>;
}

/// AWS Systems Manager Parameter Store backed provider.
#[derive(Clone)]
pub struct SsmSecretProvider {
    client: Client,
}

impl SsmSecretProvider {
    /// Wraps an existing SSM client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the ambient AWS configuration.
    ///
    /// `region` overrides `AWS_REGION` when given.
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl SecretProvider for SsmSecretProvider {
    async fn get_secret(&self, name: &str) -> Result<String, SecretError> {
        let output = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| SecretError::Store {
                name: name.to_string(),
                reason: aws_sdk_ssm::error::DisplayErrorContext(&e).to_string(),
            })?;

        output
            .parameter()
            .and_then(|p| p.value())
            .map(str::to_string)
            .ok_or_else(|| SecretError::NotFound(name.to_string()))
    }
}

/// A fixed secret, for local development against a Slack test app.
#[derive(Clone)]
pub struct StaticSecretProvider {
    secret: String,
}

impl StaticSecretProvider {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for StaticSecretProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticSecretProvider")
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl SecretProvider for StaticSecretProvider {
    async fn get_secret(&self, _name: &str) -> Result<String, SecretError> {
        Ok(self.secret.clone())
    }
}
