//! Request signing for the fingerprint provider.
//!
//! Every submission carries `base64(HMAC-SHA1(secret, canonical))` where the
//! canonical string is the newline-joined
//! `method, uri, access_key, data_type, signature_version, timestamp`.
//! The timestamp is read from an injected [`Clock`] for every request, so a
//! signature is never reused across segments.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use super::domain::Credentials;
use super::segment::Segment;

type HmacSha1 = Hmac<Sha1>;

pub const HTTP_METHOD: &str = "POST";
pub const IDENTIFY_URI: &str = "/v1/identify";
pub const DATA_TYPE: &str = "audio";
pub const SIGNATURE_VERSION: &str = "1";

/// Source of request timestamps.
pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch.
    fn unix_timestamp(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn unix_timestamp(&self) -> i64 {
        self.0
    }
}

/// Everything the signature is computed over (apart from the secret).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    pub method: String,
    pub uri: String,
    pub access_key: String,
    pub data_type: String,
    pub signature_version: String,
    pub timestamp: i64,
}

impl SigningContext {
    /// Context for an identify request at `timestamp`.
    pub fn identify(access_key: &str, timestamp: i64) -> Self {
        Self {
            method: HTTP_METHOD.to_string(),
            uri: IDENTIFY_URI.to_string(),
            access_key: access_key.to_string(),
            data_type: DATA_TYPE.to_string(),
            signature_version: SIGNATURE_VERSION.to_string(),
            timestamp,
        }
    }

    pub fn canonical_string(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            self.method,
            self.uri,
            self.access_key,
            self.data_type,
            self.signature_version,
            self.timestamp
        )
    }
}

/// `base64(HMAC-SHA1(secret, canonical_string))`.
pub fn sign(context: &SigningContext, secret: &str) -> String {
    let mut mac =
        HmacSha1::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(context.canonical_string().as_bytes());
    BASE64_STANDARD.encode(mac.finalize().into_bytes())
}

/// One signed segment, ready to be sent as multipart form data.
#[derive(Debug, Clone)]
pub struct SignedSubmission {
    /// Full endpoint URL
    pub url: String,
    pub ordinal: usize,
    pub access_key: String,
    pub data_type: String,
    pub signature_version: String,
    pub signature: String,
    /// Unix seconds, as sent
    pub timestamp: String,
    /// The segment's raw bytes
    pub sample: Vec<u8>,
}

impl SignedSubmission {
    /// Value of the `sample_bytes` field.
    pub fn sample_bytes(&self) -> usize {
        self.sample.len()
    }

    /// Text form fields in wire order (the `sample` part is sent separately).
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("access_key", self.access_key.clone()),
            ("data_type", self.data_type.clone()),
            ("signature_version", self.signature_version.clone()),
            ("signature", self.signature.clone()),
            ("timestamp", self.timestamp.clone()),
            ("sample_bytes", self.sample_bytes().to_string()),
        ]
    }
}

/// Builds a freshly signed submission per segment.
#[derive(Clone)]
pub struct SignedRequestBuilder {
    credentials: Credentials,
    clock: Arc<dyn Clock>,
}

impl SignedRequestBuilder {
    pub fn new(credentials: Credentials, clock: Arc<dyn Clock>) -> Self {
        Self { credentials, clock }
    }

    /// Sign `segment` of `container` using the current time.
    pub fn build(&self, container: &[u8], segment: &Segment) -> SignedSubmission {
        let context = SigningContext::identify(
            &self.credentials.access_key,
            self.clock.unix_timestamp(),
        );
        let signature = sign(&context, &self.credentials.access_secret);

        SignedSubmission {
            url: endpoint_url(&self.credentials.host),
            ordinal: segment.ordinal,
            access_key: context.access_key,
            data_type: context.data_type,
            signature_version: context.signature_version,
            signature,
            timestamp: context.timestamp.to_string(),
            sample: segment.slice(container).to_vec(),
        }
    }
}

/// Identify endpoint for a provider host.
///
/// Hosts given with an explicit scheme are used as-is, otherwise HTTPS.
pub fn endpoint_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{}{}", host, IDENTIFY_URI)
    } else {
        format!("https://{}{}", host, IDENTIFY_URI)
    }
}
