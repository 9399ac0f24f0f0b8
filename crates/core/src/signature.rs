//! GitHub webhook signature verification using HMAC-SHA256.
//!
//! GitHub signs every delivery with the shared webhook secret and sends the
//! result in `X-Hub-Signature-256` as `sha256=<hex>`. Verification is the only
//! authentication gate: nothing downstream looks at a request that fails it.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

const PREFIX: &str = "sha256=";

/// Why a signature was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("missing X-Hub-Signature-256 header")]
    Missing,

    #[error("malformed signature header")]
    Malformed,

    #[error("signature mismatch")]
    Mismatch,
}

/// Computes the raw HMAC-SHA256 digest of `body` keyed by `secret`.
pub fn compute_signature(body: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(body);
    mac.finalize().into_bytes().to_vec()
}

/// Formats a digest as a header value: `sha256=<hex>`.
pub fn format_signature_header(digest: &[u8]) -> String {
    format!("{PREFIX}{}", hex::encode(digest))
}

/// Checks a signature header against `body`, returning the rejection reason.
///
/// The digest comparison goes through [`Mac::verify_slice`], which runs in
/// constant time.
pub fn check_signature(
    body: &[u8],
    signature_header: Option<&str>,
    secret: &[u8],
) -> Result<(), SignatureError> {
    let header = signature_header.ok_or(SignatureError::Missing)?;
    let sig_hex = header
        .strip_prefix(PREFIX)
        .ok_or(SignatureError::Malformed)?;
    let expected = hex::decode(sig_hex).map_err(|_| SignatureError::Malformed)?;

    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::Mismatch)?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

/// Verify a GitHub HMAC-SHA256 webhook signature.
///
/// Returns `false` when the header is absent. Rejections are logged with
/// their reason.
pub fn verify_signature(body: &[u8], signature_header: Option<&str>, secret: &[u8]) -> bool {
    match check_signature(body, signature_header, secret) {
        Ok(()) => true,
        Err(reason) => {
            warn!(reason = %reason, "Rejected webhook signature");
            false
        }
    }
}
