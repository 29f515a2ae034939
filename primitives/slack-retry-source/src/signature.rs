//! Slack request signature verification.
//!
//! Slack signs every slash-command callback with the app's signing secret:
//!
//! ```text
//! X-Slack-Signature: v0=<hex(HMAC-SHA256(secret, "v0:" + timestamp + ":" + body))>
//! ```
//!
//! The body must be the raw bytes as received. Re-encoding the parsed form
//! changes the bytes and breaks verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

/// Signing protocol version prefix.
pub const SIGNATURE_VERSION: &str = "v0";

/// Requests older than this many seconds are rejected as replays.
pub const MAX_REQUEST_AGE_SECS: f64 = 300.0;

type HmacSha256 = Hmac<Sha256>;

/// Reasons a signed request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// The request timestamp is more than five minutes behind the clock.
    #[error("request timestamp is more than five minutes old")]
    StaleRequest,

    /// The delivered signature does not match the expected one.
    #[error("request signature does not match")]
    InvalidSignature,

    /// The timestamp header is not a decimal number of seconds.
    #[error("invalid request timestamp: {0:?}")]
    MalformedTimestamp(String),
}

/// Feeds the base string `v0:<timestamp>:<body>` into a keyed MAC.
fn signing_mac(
    secret: &str,
    timestamp: &str,
    raw_body: &[u8],
) -> Result<HmacSha256, VerificationError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| VerificationError::InvalidSignature)?;
    mac.update(SIGNATURE_VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(raw_body);
    Ok(mac)
}

/// Computes the `v0=<hex>` signature Slack would send for this request.
pub fn expected_signature(
    secret: &str,
    timestamp: &str,
    raw_body: &[u8],
) -> Result<String, VerificationError> {
    let digest = signing_mac(secret, timestamp, raw_body)?.finalize().into_bytes();
    Ok(format!("{SIGNATURE_VERSION}={}", hex::encode(digest)))
}

/// Parses the `X-Slack-Request-Timestamp` header into seconds since the epoch.
fn parse_timestamp(timestamp: &str) -> Result<f64, VerificationError> {
    timestamp
        .parse::<f64>()
        .ok()
        .filter(|t| t.is_finite())
        .ok_or_else(|| VerificationError::MalformedTimestamp(timestamp.to_string()))
}

/// Verifies a Slack request signature.
///
/// Staleness is checked first: a request older than
/// [`MAX_REQUEST_AGE_SECS`] is rejected even if its signature is valid.
/// The digest comparison runs in constant time.
pub fn verify(
    secret: &str,
    timestamp: &str,
    raw_body: &[u8],
    delivered_signature: &str,
    now: f64,
) -> Result<(), VerificationError> {
    let sent_at = parse_timestamp(timestamp)?;
    if now - sent_at > MAX_REQUEST_AGE_SECS {
        return Err(VerificationError::StaleRequest);
    }

    let delivered = delivered_signature
        .strip_prefix(SIGNATURE_VERSION)
        .and_then(|rest| rest.strip_prefix('='))
        .filter(|hex_digest| !hex_digest.bytes().any(|b| b.is_ascii_uppercase()))
        .and_then(|hex_digest| hex::decode(hex_digest).ok())
        .ok_or(VerificationError::InvalidSignature)?;

    signing_mac(secret, timestamp, raw_body)?
        .verify_slice(&delivered)
        .map_err(|_| VerificationError::InvalidSignature)
}
