//! Verification of the `Stripe-Signature` header.
//!
//! Stripe signs each webhook delivery with the endpoint's signing secret. The header looks like
//!
//! ```text
//! Stripe-Signature: t=1492774577,v1=5257a869e7ecebeda32affa62cdca3fa51cad7e77a0e56ff536d0ce8e108d8bd,v0=...
//! ```
//!
//! The expected signature is the hex-encoded HMAC-SHA256 of `"{t}.{raw body}"`. Several `v1` entries may be present
//! while a secret is being rolled; the payload is accepted if any one of them matches.
use chrono::Utc;
use hmac::{Hmac, Mac};
use log::*;
use sha2::Sha256;

use crate::WebhookSignatureError;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

type HmacSha256 = Hmac<Sha256>;

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

fn parse_header(header: &str) -> Result<SignatureHeader, WebhookSignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        let (key, value) = part
            .trim()
            .split_once('=')
            .ok_or_else(|| WebhookSignatureError::MalformedHeader(format!("Unexpected element: {part}")))?;
        match key {
            "t" => {
                let t = value
                    .parse::<i64>()
                    .map_err(|e| WebhookSignatureError::MalformedHeader(format!("Invalid timestamp. {e}")))?;
                timestamp = Some(t);
            },
            // A badly encoded signature can never match, so it is skipped rather than rejected
            "v1" => match hex::decode(value) {
                Ok(sig) => signatures.push(sig),
                Err(e) => debug!("💳️ Ignoring undecodable v1 signature. {e}"),
            },
            _ => {},
        }
    }
    let timestamp = timestamp.ok_or_else(|| WebhookSignatureError::MalformedHeader("No timestamp".into()))?;
    if signatures.is_empty() {
        return Err(WebhookSignatureError::NoSignature);
    }
    Ok(SignatureHeader { timestamp, signatures })
}

fn signer(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, WebhookSignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| WebhookSignatureError::InvalidSecret)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Produces the hex-encoded `v1` signature Stripe would send for `payload` at `timestamp`.
pub fn compute_signature(payload: &[u8], secret: &str, timestamp: i64) -> Result<String, WebhookSignatureError> {
    let mac = signer(secret, timestamp, payload)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verifies a webhook delivery against the current time. See [`verify_webhook_signature_at`].
pub fn verify_webhook_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
) -> Result<(), WebhookSignatureError> {
    verify_webhook_signature_at(payload, header, secret, tolerance_secs, Utc::now().timestamp())
}

/// Verifies a webhook delivery.
///
/// A `tolerance_secs` of zero disables the replay window check.
pub fn verify_webhook_signature_at(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), WebhookSignatureError> {
    let header = parse_header(header)?;
    let age = now - header.timestamp;
    if tolerance_secs > 0 && age.abs() > tolerance_secs {
        return Err(WebhookSignatureError::StaleTimestamp { age });
    }
    let mac = signer(secret, header.timestamp, payload)?;
    let matched = header.signatures.iter().any(|sig| mac.clone().verify_slice(sig).is_ok());
    if matched {
        trace!("💳️ Webhook signature verified");
        Ok(())
    } else {
        Err(WebhookSignatureError::SignatureMismatch)
    }
}
