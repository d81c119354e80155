//! Signed-envelope authentication for the `/send` API.
//!
//! A request carries a unix timestamp and an HMAC-SHA256 over
//! `"{timestamp}.{body}"`. Verification is stateless: freshness is judged
//! against the wall clock only.

use {
    hmac::{Hmac, Mac, digest::InvalidLength},
    secrecy::{ExposeSecret, Secret},
    sha2::Sha256,
    subtle::ConstantTimeEq,
    tracing::debug,
};

type HmacSha256 = Hmac<Sha256>;

pub const TIMESTAMP_HEADER: &str = "x-relay-timestamp";
pub const SIGNATURE_HEADER: &str = "x-relay-signature";

/// Default replay window in seconds.
pub const DEFAULT_LEEWAY_SECS: u64 = 300;

/// Computes and verifies request signatures with a shared secret.
#[derive(Clone)]
pub struct SignatureCodec {
    /// Keyed HMAC state; cloned per signature so the key schedule runs once.
    mac: HmacSha256,
    leeway_secs: u64,
}

impl std::fmt::Debug for SignatureCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureCodec")
            .field("leeway_secs", &self.leeway_secs)
            .finish_non_exhaustive()
    }
}

impl SignatureCodec {
    pub fn new(secret: &Secret<String>) -> Result<Self, InvalidLength> {
        Ok(Self {
            mac: HmacSha256::new_from_slice(secret.expose_secret().as_bytes())?,
            leeway_secs: DEFAULT_LEEWAY_SECS,
        })
    }

    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    pub fn leeway_secs(&self) -> u64 {
        self.leeway_secs
    }

    /// Lowercase hex HMAC-SHA256 of `"{timestamp}.{body}"`.
    pub fn sign(&self, body: &[u8], timestamp: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);
        format!("{:x}", mac.finalize().into_bytes())
    }

    /// Verify a presented signature against the current wall clock.
    pub fn verify(&self, body: &[u8], timestamp: &str, presented: &str) -> bool {
        self.verify_at(chrono::Utc::now().timestamp(), body, timestamp, presented)
    }

    /// Verify a presented signature as of `now` (unix seconds).
    ///
    /// The answer is a bare bool; callers never learn which check failed.
    pub fn verify_at(&self, now: i64, body: &[u8], timestamp: &str, presented: &str) -> bool {
        let Ok(ts) = timestamp.trim().parse::<i64>() else {
            debug!("signature rejected: unparseable timestamp");
            return false;
        };
        // Inclusive window: a skew of exactly `leeway_secs` is accepted.
        if now.abs_diff(ts) > self.leeway_secs {
            debug!(skew_secs = now.abs_diff(ts), "signature rejected: outside replay window");
            return false;
        }
        let expected = self.sign(body, timestamp);
        let supplied = presented_digest(presented);
        let ok: bool = expected.as_bytes().ct_eq(supplied.as_bytes()).into();
        if !ok {
            debug!("signature rejected: digest mismatch");
        }
        ok
    }

    /// Header values `(timestamp, "sha256=<hex>")` for signing `body` at `now`.
    pub fn signed_headers(&self, body: &[u8], now: i64) -> (String, String) {
        let timestamp = now.to_string();
        let signature = format!("sha256={}", self.sign(body, &timestamp));
        (timestamp, signature)
    }
}

/// Everything after the last `=`, so both `sha256=<hex>` and bare hex work.
fn presented_digest(header: &str) -> &str {
    header.rsplit_once('=').map_or(header, |(_, digest)| digest)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, rstest::rstest};

    const NOW: i64 = 1_700_000_000;

    fn codec() -> SignatureCodec {
        SignatureCodec::new(&Secret::new("0123456789abcdef".to_string())).unwrap()
    }

    #[test]
    fn sign_is_deterministic_hex() {
        let codec = codec();
        let a = codec.sign(b"{\"x\":1}", "1700000000");
        let b = codec.sign(b"{\"x\":1}", "1700000000");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn sign_covers_timestamp_dot_body() {
        let codec = codec();
        // "1.23" + "." + "4" and "1" + "." + "23.4" hash the same bytes.
        assert_eq!(codec.sign(b"4", "1.23"), codec.sign(b"23.4", "1"));
        assert_ne!(codec.sign(b"body", "1"), codec.sign(b"body", "2"));
    }

    #[test]
    fn matches_known_vector() {
        let codec = codec();
        let expected = "adc6dd484b44cd99e9825b07b9475d45999b82cf8071c60272358d4a51fe73e9";
        assert_eq!(codec.sign(b"hello", "1700000000"), expected);

        let (ts, header) = codec.signed_headers(b"hello", NOW);
        assert_eq!(ts, "1700000000");
        assert_eq!(header, format!("sha256={expected}"));
    }

    #[rstest]
    #[case::prefixed(true)]
    #[case::bare(false)]
    fn round_trips(#[case] prefixed: bool) {
        let codec = codec();
        let body = br#"{"channel_id":"42","content":"hi"}"#;
        let sig = codec.sign(body, "1700000000");
        let presented = if prefixed {
            format!("sha256={sig}")
        } else {
            sig
        };
        assert!(codec.verify_at(NOW, body, "1700000000", &presented));
    }

    #[test]
    fn verify_uses_wall_clock() {
        let codec = codec();
        let now = chrono::Utc::now().timestamp();
        let (ts, sig) = codec.signed_headers(b"payload", now);
        assert!(codec.verify(b"payload", &ts, &sig));
    }

    #[test]
    fn any_single_bit_flip_in_body_fails() {
        let codec = codec();
        let body = b"{\"content\":\"hi\"}".to_vec();
        let (ts, sig) = codec.signed_headers(&body, NOW);
        for i in 0..body.len() {
            for bit in 0..8 {
                let mut mutated = body.clone();
                mutated[i] ^= 1 << bit;
                assert!(
                    !codec.verify_at(NOW, &mutated, &ts, &sig),
                    "byte {i} bit {bit} accepted"
                );
            }
        }
    }

    #[test]
    fn any_single_bit_flip_in_signature_fails() {
        let codec = codec();
        let (ts, sig) = codec.signed_headers(b"body", NOW);
        let bytes = sig.as_bytes();
        for i in "sha256=".len()..bytes.len() {
            // Low seven bits keep the header ASCII.
            for bit in 0..7 {
                let mut mutated = bytes.to_vec();
                mutated[i] ^= 1 << bit;
                let mutated = String::from_utf8(mutated).unwrap();
                assert!(
                    !codec.verify_at(NOW, b"body", &ts, &mutated),
                    "byte {i} bit {bit} accepted"
                );
            }
        }
    }

    #[rstest]
    #[case::past_at_boundary(-300, true)]
    #[case::past_beyond(-301, false)]
    #[case::future_at_boundary(300, true)]
    #[case::future_beyond(301, false)]
    #[case::exact(0, true)]
    fn window_is_inclusive(#[case] offset: i64, #[case] accepted: bool) {
        let codec = codec();
        let ts = (NOW + offset).to_string();
        let sig = codec.sign(b"body", &ts);
        assert_eq!(codec.verify_at(NOW, b"body", &ts, &sig), accepted);
    }

    #[test]
    fn custom_leeway() {
        let codec = codec().with_leeway(10);
        assert_eq!(codec.leeway_secs(), 10);
        let ts = (NOW - 11).to_string();
        let sig = codec.sign(b"body", &ts);
        assert!(!codec.verify_at(NOW, b"body", &ts, &sig));
    }

    #[rstest]
    #[case("")]
    #[case("yesterday")]
    #[case("1700000000.5")]
    #[case("99999999999999999999999")]
    fn non_numeric_timestamp_fails(#[case] ts: &str) {
        let codec = codec();
        let sig = codec.sign(b"body", ts);
        assert!(!codec.verify_at(NOW, b"body", ts, &sig));
    }

    #[test]
    fn far_out_timestamps_do_not_overflow() {
        let codec = codec();
        for ts in [i64::MIN, i64::MAX] {
            let ts = ts.to_string();
            let sig = codec.sign(b"body", &ts);
            assert!(!codec.verify_at(NOW, b"body", &ts, &sig));
        }
    }

    #[test]
    fn wrong_secret_fails() {
        let other = SignatureCodec::new(&Secret::new("fedcba9876543210".to_string())).unwrap();
        let (ts, sig) = other.signed_headers(b"body", NOW);
        assert!(!codec().verify_at(NOW, b"body", &ts, &sig));
    }

    #[rstest]
    #[case("")]
    #[case("sha256=")]
    #[case("sha256=abc")]
    fn empty_or_truncated_signature_fails(#[case] presented: &str) {
        assert!(!codec().verify_at(NOW, b"body", "1700000000", presented));
    }

    #[test]
    fn digest_is_taken_after_last_equals() {
        assert_eq!(presented_digest("sha256=abcd"), "abcd");
        assert_eq!(presented_digest("v1=sha256=abcd"), "abcd");
        assert_eq!(presented_digest("abcd"), "abcd");
    }

    #[test]
    fn debug_hides_key() {
        let rendered = format!("{:?}", codec());
        assert!(rendered.contains("leeway_secs"));
        assert!(!rendered.contains("0123456789abcdef"));
    }
}
