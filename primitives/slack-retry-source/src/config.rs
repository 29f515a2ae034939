//! Command-line and environment configuration.

use clap::Parser;

use crate::dispatch::DispatchConfig;

/// Slack `/retry` slash-command receiver that emits retry jobs.
#[derive(Parser, Debug, Clone)]
#[command(name = "slack-retry-source")]
#[command(about = "Receives Slack /retry commands and emits retry jobs")]
pub struct Args {
    /// Port to listen on.
    #[arg(short, long, env = "SLACK_RETRY_SOURCE_PORT", default_value = "8080")]
    pub port: u16,

    /// Host to bind to.
    #[arg(long, env = "SLACK_RETRY_SOURCE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Path Slack posts slash commands to.
    #[arg(long, env = "SLACK_RETRY_SOURCE_PATH", default_value = "/slack/retry")]
    pub path: String,

    /// Slack channel ID the command may be used from.
    #[arg(short, long, env = "SLACK_RETRY_SOURCE_CHANNEL_ID")]
    pub channel_id: String,

    /// Message type retry jobs are published as.
    #[arg(
        short,
        long,
        env = "SLACK_RETRY_SOURCE_TOPIC",
        default_value = "slack.retry_sync.requested"
    )]
    pub topic: String,

    /// Parameter Store name of the Slack signing secret.
    #[arg(
        long,
        env = "SLACK_RETRY_SOURCE_SECRET_NAME",
        default_value = "retry_sync_slackapp_secret"
    )]
    pub secret_name: String,

    /// AWS region of the Parameter Store. Defaults to the AWS environment.
    #[arg(long, env = "SLACK_RETRY_SOURCE_REGION")]
    pub region: Option<String>,

    /// Fixed signing secret. When set, the Parameter Store is not used.
    #[arg(long, env = "SLACK_RETRY_SOURCE_SIGNING_SECRET", hide_env_values = true)]
    pub signing_secret: Option<String>,
}

impl Args {
    /// Dispatcher settings derived from the arguments.
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            authorized_channel_id: self.channel_id.clone(),
            topic: self.topic.clone(),
            secret_name: self.secret_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_only_channel_is_given() {
        let args = Args::try_parse_from(["slack-retry-source", "--channel-id", "C1"]).unwrap();
        assert_eq!(args.port, 8080);
        assert_eq!(args.path, "/slack/retry");
        assert_eq!(args.signing_secret, None);
        assert_eq!(
            args.dispatch_config(),
            DispatchConfig {
                authorized_channel_id: "C1".to_string(),
                topic: "slack.retry_sync.requested".to_string(),
                secret_name: "retry_sync_slackapp_secret".to_string(),
            }
        );
    }

    #[test]
    fn channel_is_required() {
        assert!(Args::try_parse_from(["slack-retry-source"]).is_err());
    }
}
