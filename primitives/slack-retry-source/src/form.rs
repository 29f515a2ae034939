//! Slash-command form bodies.
//!
//! Slack posts slash commands as `application/x-www-form-urlencoded`. The
//! decoded pairs are kept in arrival order and forwarded unchanged to the
//! worker; signature checks always use the raw body instead.

use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors decoding a slash-command body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// The body, or a percent-decoded key or value, is not valid UTF-8.
    #[error("request body is not a URL-encoded form: {0}")]
    Undecodable(String),

    /// A required field is absent or blank.
    #[error("request form is missing `{0}`")]
    MissingField(&'static str),
}

/// A decoded slash-command form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlashCommandForm {
    pairs: Vec<(String, String)>,
}

impl SlashCommandForm {
    /// Decodes a raw request body.
    ///
    /// Pairs with blank values are dropped, so `text=` reads as no text.
    /// `channel_id` is required. Raw or percent-escaped bytes that are not
    /// UTF-8 are rejected, never replaced.
    pub fn parse(raw_body: &[u8]) -> Result<Self, FormError> {
        let raw = std::str::from_utf8(raw_body)
            .map_err(|e| FormError::Undecodable(format!("body is not UTF-8: {e}")))?;
        for segment in raw.split('&') {
            let segment = segment.replace('+', " ");
            percent_decode_str(&segment).decode_utf8().map_err(|e| {
                FormError::Undecodable(format!("escaped bytes are not UTF-8: {e}"))
            })?;
        }

        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(raw_body)
            .map_err(|e| FormError::Undecodable(e.to_string()))?;

        let form = Self {
            pairs: pairs
                .into_iter()
                .filter(|(_, value)| !value.is_empty())
                .collect(),
        };

        if form.get("channel_id").is_none() {
            return Err(FormError::MissingField("channel_id"));
        }

        Ok(form)
    }

    /// Returns the value for `key`. A repeated key resolves to its last value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Channel the command was typed in.
    pub fn channel_id(&self) -> &str {
        self.get("channel_id").unwrap_or_default()
    }

    /// The command argument, if any.
    pub fn text(&self) -> Option<&str> {
        self.get("text")
    }

    /// Slack handle of the invoking user, if present.
    pub fn user_name(&self) -> Option<&str> {
        self.get("user_name")
    }

    /// All pairs in arrival order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Builds the job payload: a JSON object of every pair, last value winning.
    pub fn to_payload(&self) -> Value {
        let mut object = Map::new();
        for (key, value) in &self.pairs {
            object.insert(key.clone(), Value::String(value.clone()));
        }
        Value::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_percent_and_plus_encoding() {
        let form = SlashCommandForm::parse(
            b"channel_id=C1&command=%2Fretry&text=--country+New+Zealand&user_name=jdoe",
        )
        .unwrap();
        assert_eq!(form.channel_id(), "C1");
        assert_eq!(form.get("command"), Some("/retry"));
        assert_eq!(form.text(), Some("--country New Zealand"));
        assert_eq!(form.user_name(), Some("jdoe"));
    }

    #[test]
    fn missing_channel_is_rejected() {
        assert_eq!(
            SlashCommandForm::parse(b"text=jdoe"),
            Err(FormError::MissingField("channel_id"))
        );
        assert_eq!(
            SlashCommandForm::parse(b"channel_id=&text=jdoe"),
            Err(FormError::MissingField("channel_id"))
        );
        assert_eq!(
            SlashCommandForm::parse(b""),
            Err(FormError::MissingField("channel_id"))
        );
    }

    #[test]
    fn escaped_invalid_utf8_is_rejected() {
        assert!(matches!(
            SlashCommandForm::parse(b"channel_id=C1&text=%FF"),
            Err(FormError::Undecodable(_))
        ));
        assert!(matches!(
            SlashCommandForm::parse(b"channel_id=C1&text=%FF%FE"),
            Err(FormError::Undecodable(_))
        ));
    }

    #[test]
    fn raw_invalid_utf8_is_rejected() {
        assert!(matches!(
            SlashCommandForm::parse(b"channel_id=C1&text=\xff\xfe"),
            Err(FormError::Undecodable(_))
        ));
    }

    #[test]
    fn escaped_multibyte_text_is_kept() {
        let form = SlashCommandForm::parse(b"channel_id=C1&text=Jos%C3%A9").unwrap();
        assert_eq!(form.text(), Some("José"));
    }

    #[test]
    fn stray_separators_and_bad_escapes_are_tolerated() {
        let form = SlashCommandForm::parse(b"channel_id=C1&&&=&%%%zz").unwrap();
        assert_eq!(form.channel_id(), "C1");
    }

    #[test]
    fn blank_text_reads_as_absent() {
        let form = SlashCommandForm::parse(b"channel_id=C1&text=").unwrap();
        assert_eq!(form.text(), None);
        assert_eq!(form.pairs().len(), 1);
    }

    #[test]
    fn repeated_key_keeps_last_value() {
        let form = SlashCommandForm::parse(b"channel_id=C1&text=first&text=second").unwrap();
        assert_eq!(form.text(), Some("second"));
        assert_eq!(form.to_payload(), json!({"channel_id": "C1", "text": "second"}));
    }

    #[test]
    fn payload_carries_every_field() {
        let form =
            SlashCommandForm::parse(b"token=t&team_id=T1&channel_id=C1&user_id=U1&text=jdoe")
                .unwrap();
        assert_eq!(
            form.to_payload(),
            json!({
                "token": "t",
                "team_id": "T1",
                "channel_id": "C1",
                "user_id": "U1",
                "text": "jdoe",
            })
        );
    }
}
