//! Link Signer
//!
//! Builds and verifies signed verification links. A link binds the HTTP
//! method, the verification endpoint's path, and the exact query parameter
//! set to an HMAC-SHA256 signature and a fixed validity window; a presented
//! link with any parameter altered, or presented after the window has
//! elapsed, fails verification. This is the core security invariant of the
//! whole flow.

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use url::Url;

use crate::models::workflow::ExecutionId;
use crate::utils::error::{AppError, AppResult};
use crate::utils::security::constant_time_compare;

type HmacSha256 = Hmac<Sha256>;

/// Default validity window for issued links
pub const DEFAULT_VALID_FOR_HOURS: i64 = 24;

/// Verification failures for a presented link
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("link is malformed: {0}")]
    Malformed(String),

    #[error("link has expired")]
    Expired,

    #[error("link signature does not match")]
    SignatureMismatch,
}

/// Parameters recovered from a successfully verified link
#[derive(Debug, Clone)]
pub struct VerifiedLink {
    pub email: String,
    pub subject_id: String,
    /// Correlation handle embedded at issuance, when present
    pub execution_id: Option<ExecutionId>,
}

/// Signs deep links to the verification endpoint and verifies presented ones
pub struct LinkSigner {
    secret: String,
    verify_url: Url,
}

impl LinkSigner {
    /// Create a signer for the given verification endpoint URL
    pub fn new(secret: impl Into<String>, verify_url: &str) -> AppResult<Self> {
        let verify_url = Url::parse(verify_url)
            .map_err(|e| AppError::Configuration(format!("invalid verify URL: {}", e)))?;
        Ok(Self {
            secret: secret.into(),
            verify_url,
        })
    }

    /// Sign a link carrying `params`, valid for `valid_for` from `issued_at`.
    ///
    /// Deterministic given identical inputs, key and issuance instant. The
    /// returned URL carries the caller's parameters plus `issued`, `expires`
    /// and `signature`.
    pub fn sign(
        &self,
        params: &[(&str, &str)],
        valid_for: Duration,
        issued_at: DateTime<Utc>,
    ) -> AppResult<String> {
        let expires = issued_at + valid_for;

        let mut pairs: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        pairs.push(("issued".to_string(), issued_at.timestamp().to_string()));
        pairs.push(("expires".to_string(), expires.timestamp().to_string()));

        let canonical = canonical_query(&pairs);
        let signature = self.compute_signature(self.verify_url.path(), &canonical)?;

        let mut url = self.verify_url.clone();
        url.set_query(Some(&format!("{}&signature={}", canonical, signature)));
        Ok(url.to_string())
    }

    /// Verify a presented link given as its path-and-query.
    ///
    /// The signature is recomputed over the exact presented parameter set;
    /// the expiry check runs against `now` only after the signature holds.
    pub fn verify(
        &self,
        path_and_query: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedLink, LinkError> {
        let (path, query) = path_and_query
            .split_once('?')
            .ok_or_else(|| LinkError::Malformed("missing query string".to_string()))?;
        if path != self.verify_url.path() {
            return Err(LinkError::Malformed(format!("unexpected path: {}", path)));
        }

        let mut presented_signature: Option<String> = None;
        let mut pairs: Vec<(String, String)> = Vec::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if key == "signature" {
                if presented_signature.replace(value.into_owned()).is_some() {
                    return Err(LinkError::Malformed(
                        "duplicate signature parameter".to_string(),
                    ));
                }
            } else {
                pairs.push((key.into_owned(), value.into_owned()));
            }
        }
        let presented = presented_signature
            .ok_or_else(|| LinkError::Malformed("missing signature parameter".to_string()))?;

        let canonical = canonical_query(&pairs);
        let expected = self
            .compute_signature(path, &canonical)
            .map_err(|e| LinkError::Malformed(e.to_string()))?;
        if !constant_time_compare(&presented, &expected) {
            return Err(LinkError::SignatureMismatch);
        }

        let expires = param(&pairs, "expires")
            .and_then(|v| v.parse::<i64>().ok())
            .ok_or_else(|| {
                LinkError::Malformed("missing or malformed expires parameter".to_string())
            })?;
        if now.timestamp() > expires {
            return Err(LinkError::Expired);
        }

        Ok(VerifiedLink {
            email: param(&pairs, "email").unwrap_or_default().to_string(),
            subject_id: param(&pairs, "subjectId").unwrap_or_default().to_string(),
            execution_id: param(&pairs, "execution").map(ExecutionId::new),
        })
    }

    fn compute_signature(&self, path: &str, canonical_query: &str) -> AppResult<String> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| AppError::Signing(format!("invalid signing key: {}", e)))?;
        mac.update(format!("GET\n{}\n{}", path, canonical_query).as_bytes());
        Ok(format!("{:x}", mac.finalize().into_bytes()))
    }
}

/// Percent-encoded query string over the pairs sorted by key, then value
fn canonical_query(pairs: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = pairs.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in sorted {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

fn param<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn signer() -> LinkSigner {
        LinkSigner::new("test-signing-secret", "https://auth.example.com/verify").unwrap()
    }

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn sign_default(signer: &LinkSigner) -> String {
        signer
            .sign(
                &[
                    ("email", "user@example.com"),
                    ("subjectId", "sub-123"),
                    ("verified", "true"),
                    ("execution", "exec-1"),
                ],
                Duration::hours(24),
                issued_at(),
            )
            .unwrap()
    }

    fn token_of(signed: &str) -> &str {
        &signed[signed.find("/verify").unwrap()..]
    }

    #[test]
    fn test_sign_is_deterministic() {
        let signer = signer();
        assert_eq!(sign_default(&signer), sign_default(&signer));
    }

    #[test]
    fn test_sign_then_verify_round_trip() {
        let signer = signer();
        let signed = sign_default(&signer);

        let link = signer
            .verify(token_of(&signed), issued_at() + Duration::minutes(5))
            .unwrap();
        assert_eq!(link.email, "user@example.com");
        assert_eq!(link.subject_id, "sub-123");
        assert_eq!(link.execution_id, Some(ExecutionId::new("exec-1")));
    }

    #[test]
    fn test_verify_at_window_edge() {
        let signer = signer();
        let signed = sign_default(&signer);

        // Exactly at expiry is still valid; one second past is not
        assert!(signer
            .verify(token_of(&signed), issued_at() + Duration::hours(24))
            .is_ok());
        let err = signer
            .verify(
                token_of(&signed),
                issued_at() + Duration::hours(24) + Duration::seconds(1),
            )
            .unwrap_err();
        assert_eq!(err, LinkError::Expired);
    }

    #[test]
    fn test_verify_rejects_mutated_parameters() {
        let signer = signer();
        let signed = sign_default(&signer);

        for (from, to) in [
            ("user%40example.com", "mallory%40example.com"),
            ("sub-123", "sub-999"),
            ("verified=true", "verified=false"),
            ("exec-1", "exec-2"),
        ] {
            let tampered = signed.replace(from, to);
            assert_ne!(tampered, signed);
            let err = signer.verify(token_of(&tampered), issued_at()).unwrap_err();
            assert_eq!(err, LinkError::SignatureMismatch, "mutating {}", from);
        }
    }

    #[test]
    fn test_verify_rejects_extended_expiry() {
        let signer = signer();
        let signed = sign_default(&signer);

        let expires = issued_at() + Duration::hours(24);
        let tampered = signed.replace(
            &expires.timestamp().to_string(),
            &(expires.timestamp() + 3600).to_string(),
        );
        let err = signer.verify(token_of(&tampered), issued_at()).unwrap_err();
        assert_eq!(err, LinkError::SignatureMismatch);
    }

    #[test]
    fn test_verify_rejects_malformed_tokens() {
        let signer = signer();

        assert!(matches!(
            signer.verify("/verify", issued_at()),
            Err(LinkError::Malformed(_))
        ));
        assert!(matches!(
            signer.verify("/other?email=a%40b.io&signature=00", issued_at()),
            Err(LinkError::Malformed(_))
        ));
        assert!(matches!(
            signer.verify("/verify?email=a%40b.io", issued_at()),
            Err(LinkError::Malformed(_))
        ));
    }

    #[test]
    fn test_verify_with_wrong_key_fails() {
        let signed = sign_default(&signer());
        let other = LinkSigner::new("another-secret", "https://auth.example.com/verify").unwrap();
        let err = other.verify(token_of(&signed), issued_at()).unwrap_err();
        assert_eq!(err, LinkError::SignatureMismatch);
    }
}
