//! Identity-provider webhook verification and parsing.
//!
//! Deliveries are signed with HMAC-SHA256 over `"{id}.{timestamp}.{body}"`
//! using the base64 key behind a `whsec_` prefixed secret. The signature
//! header holds one or more space separated `v1,<base64>` entries.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::identity::ExternalIdentity;

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_ID: &str = "svix-id";
pub const HEADER_TIMESTAMP: &str = "svix-timestamp";
pub const HEADER_SIGNATURE: &str = "svix-signature";

const SECRET_PREFIX: &str = "whsec_";

/// Signature headers of one delivery.
#[derive(Debug, Clone, Copy)]
pub struct WebhookHeaders<'a> {
    pub id: &'a str,
    pub timestamp: &'a str,
    pub signature: &'a str,
}

/// What a verified delivery asks of us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    /// `user.created` or `user.updated`.
    UserUpserted(ExternalIdentity),
    /// `user.deleted`. Local users are never deleted.
    UserDeleted { external_id: Option<String> },
    /// Any other event type.
    Ignored { kind: String },
}

fn signing_key(secret: &str) -> Result<Vec<u8>, AuthError> {
    let encoded = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);
    STANDARD
        .decode(encoded)
        .map_err(|e| AuthError::Crypto(format!("bad webhook secret: {e}")))
}

fn mac_for(key: &[u8], id: &str, timestamp: &str, body: &[u8]) -> Result<Vec<u8>, AuthError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AuthError::Crypto(format!("failed to create HMAC: {e}")))?;
    mac.update(id.as_bytes());
    mac.update(b".");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Produce a `v1,<base64>` signature entry for a delivery.
pub fn sign_webhook(
    secret: &str,
    id: &str,
    timestamp: &str,
    body: &[u8],
) -> Result<String, AuthError> {
    let key = signing_key(secret)?;
    let mac = mac_for(&key, id, timestamp, body)?;
    Ok(format!("v1,{}", STANDARD.encode(mac)))
}

/// Verify a delivery against the configured secret.
///
/// `now` is the current unix time in seconds. Fails with
/// [`AuthError::Crypto`] when no secret is configured.
pub fn verify_webhook(
    config: &AuthConfig,
    headers: WebhookHeaders<'_>,
    body: &[u8],
    now: i64,
) -> Result<(), AuthError> {
    let secret = config
        .webhook_secret
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AuthError::Crypto("webhook secret is not configured".into()))?;

    if headers.id.is_empty() || headers.signature.is_empty() {
        return Err(AuthError::WebhookSignature("missing signature headers".into()));
    }

    let sent_at: i64 = headers
        .timestamp
        .trim()
        .parse()
        .map_err(|_| AuthError::WebhookSignature("bad timestamp".into()))?;
    let tolerance = u64::try_from(config.webhook_tolerance_secs).unwrap_or(0);
    let within_tolerance = now
        .checked_sub(sent_at)
        .map(i64::unsigned_abs)
        .is_some_and(|skew| skew <= tolerance);
    if !within_tolerance {
        return Err(AuthError::WebhookSignature(
            "timestamp outside tolerance".into(),
        ));
    }

    let key = signing_key(secret)?;
    let expected = mac_for(&key, headers.id, headers.timestamp.trim(), body)?;

    let matched = headers
        .signature
        .split_whitespace()
        .filter_map(|entry| entry.strip_prefix("v1,"))
        .filter_map(|sig| STANDARD.decode(sig).ok())
        .any(|sig| bool::from(sig.as_slice().ct_eq(expected.as_slice())));

    if matched {
        Ok(())
    } else {
        debug!(webhook_id = headers.id, "No webhook signature matched");
        Err(AuthError::WebhookSignature("no matching signature".into()))
    }
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Deserialize)]
struct RawUser {
    id: String,
    #[serde(default)]
    email_addresses: Vec<RawEmail>,
    first_name: Option<String>,
    last_name: Option<String>,
    image_url: Option<String>,
}

#[derive(Deserialize)]
struct RawEmail {
    email_address: String,
}

/// Parse a verified delivery body.
///
/// A user event without an email fails with [`AuthError::MissingEmail`].
pub fn parse_webhook_event(body: &[u8]) -> Result<WebhookEvent, AuthError> {
    let event: RawEvent =
        serde_json::from_slice(body).map_err(|e| AuthError::WebhookPayload(e.to_string()))?;

    match event.kind.as_str() {
        "user.created" | "user.updated" => {
            let user: RawUser = serde_json::from_value(event.data)
                .map_err(|e| AuthError::WebhookPayload(e.to_string()))?;
            let email = user.email_addresses.first().map(|e| e.email_address.as_str());
            let identity = ExternalIdentity::new(
                user.id,
                email,
                user.first_name.as_deref(),
                user.last_name.as_deref(),
                user.image_url.as_deref(),
            )?;
            Ok(WebhookEvent::UserUpserted(identity))
        }
        "user.deleted" => Ok(WebhookEvent::UserDeleted {
            external_id: event
                .data
                .get("id")
                .and_then(|v| v.as_str())
                .map(str::to_string),
        }),
        _ => Ok(WebhookEvent::Ignored { kind: event.kind }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";

    fn config() -> AuthConfig {
        AuthConfig {
            webhook_secret: Some(SECRET.into()),
            ..Default::default()
        }
    }

    fn headers<'a>(timestamp: &'a str, signature: &'a str) -> WebhookHeaders<'a> {
        WebhookHeaders {
            id: "msg_1",
            timestamp,
            signature,
        }
    }

    #[test]
    fn valid_signature_is_accepted() {
        let body = br#"{"type":"user.created","data":{}}"#;
        let sig = sign_webhook(SECRET, "msg_1", "1700000000", body).unwrap();
        let multi = format!("v1,bm9wZQ== {sig}");
        verify_webhook(&config(), headers("1700000000", &multi), body, 1_700_000_010).unwrap();
    }

    #[test]
    fn tampered_body_is_rejected() {
        let sig = sign_webhook(SECRET, "msg_1", "1700000000", b"{}").unwrap();
        let err = verify_webhook(&config(), headers("1700000000", &sig), b"{ }", 1_700_000_000)
            .unwrap_err();
        assert!(matches!(err, AuthError::WebhookSignature(_)));
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let sig = sign_webhook(SECRET, "msg_1", "1700000000", b"{}").unwrap();
        let err = verify_webhook(&config(), headers("1700000000", &sig), b"{}", 1_700_000_301)
            .unwrap_err();
        assert!(matches!(err, AuthError::WebhookSignature(_)));
    }

    #[test]
    fn extreme_timestamps_are_rejected_without_overflow() {
        for timestamp in ["-9223372036854775808", "9223372036854775807"] {
            let err = verify_webhook(&config(), headers(timestamp, "v1,bm9wZQ=="), b"{}", 1_700_000_000)
                .unwrap_err();
            assert!(matches!(err, AuthError::WebhookSignature(_)), "{timestamp}");
        }
        let err = verify_webhook(
            &config(),
            headers("1700000000", "v1,bm9wZQ=="),
            b"{}",
            i64::MIN,
        )
        .unwrap_err();
        assert!(matches!(err, AuthError::WebhookSignature(_)));
    }

    #[test]
    fn missing_secret_is_a_server_fault() {
        let err = verify_webhook(
            &AuthConfig::default(),
            headers("1700000000", "v1,abc"),
            b"{}",
            1_700_000_000,
        )
        .unwrap_err();
        assert!(matches!(err, AuthError::Crypto(_)));
    }

    #[test]
    fn user_event_maps_to_identity() {
        let body = br#"{
            "type": "user.updated",
            "data": {
                "id": "user_2x",
                "email_addresses": [{"email_address": "ada@example.com"}],
                "first_name": "Ada",
                "last_name": null,
                "image_url": "https://img.example.com/ada.png"
            }
        }"#;
        let WebhookEvent::UserUpserted(identity) = parse_webhook_event(body).unwrap() else {
            panic!("expected upsert");
        };
        assert_eq!(identity.external_id, "user_2x");
        assert_eq!(identity.email, "ada@example.com");
        assert_eq!(identity.display_name(), "Ada");
    }

    #[test]
    fn user_event_without_email_is_rejected() {
        let body = br#"{"type":"user.created","data":{"id":"user_2x","email_addresses":[]}}"#;
        assert!(matches!(
            parse_webhook_event(body).unwrap_err(),
            AuthError::MissingEmail
        ));
    }

    #[test]
    fn other_events_are_ignored() {
        let body = br#"{"type":"session.created","data":{"id":"sess_1"}}"#;
        assert_eq!(
            parse_webhook_event(body).unwrap(),
            WebhookEvent::Ignored {
                kind: "session.created".into()
            }
        );
        let body = br#"{"type":"user.deleted","data":{"id":"user_2x"}}"#;
        assert_eq!(
            parse_webhook_event(body).unwrap(),
            WebhookEvent::UserDeleted {
                external_id: Some("user_2x".into())
            }
        );
    }
}
