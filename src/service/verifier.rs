//! Challenge Verifier
//!
//! Exchanges a clicked verification link for an authentication result. The
//! verifier extracts the token from the incoming request, invokes the
//! downstream verification operation exactly once, and maps its result to a
//! redirect-or-error outcome; the actual signature/expiry checking lives
//! behind the [`ChallengeBackend`] boundary.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::providers::ChallengeBackend;
use crate::service::link_signer::{LinkError, LinkSigner, VerifiedLink};

/// Outcome of exchanging a clicked link for an authentication result
#[derive(Debug, Clone)]
pub struct ChallengeResult {
    pub authenticated: bool,
    /// Where the client should land after the exchange
    pub redirect_target: String,
    pub error: Option<String>,
    /// Parameters recovered from the link, when verification succeeded
    pub link: Option<VerifiedLink>,
}

/// Bundled backend wrapping the link signer's verification against the
/// current wall clock
pub struct SignedLinkBackend {
    signer: LinkSigner,
}

impl SignedLinkBackend {
    pub fn new(signer: LinkSigner) -> Self {
        Self { signer }
    }
}

#[async_trait]
impl ChallengeBackend for SignedLinkBackend {
    async fn verify_challenge(&self, token: &str) -> Result<VerifiedLink, LinkError> {
        self.signer.verify(token, Utc::now())
    }
}

/// Maps downstream verification results to redirect-or-error outcomes
pub struct ChallengeVerifier {
    backend: Arc<dyn ChallengeBackend>,
    landing_url: String,
}

impl ChallengeVerifier {
    pub fn new(backend: Arc<dyn ChallengeBackend>, landing_url: impl Into<String>) -> Self {
        Self {
            backend,
            landing_url: landing_url.into(),
        }
    }

    /// Verify a presented token (the clicked link's path-and-query)
    pub async fn verify(&self, token: &str) -> ChallengeResult {
        log::debug!("Processing verification token: {}", token);

        match self.backend.verify_challenge(token).await {
            Ok(link) => {
                log::info!("Link verified for: {}", link.email);
                ChallengeResult {
                    authenticated: true,
                    redirect_target: self.landing_url.clone(),
                    error: None,
                    link: Some(link),
                }
            }
            Err(e) => {
                log::warn!("Link verification failed: {}", e);
                ChallengeResult {
                    authenticated: false,
                    redirect_target: self.landing_url.clone(),
                    error: Some(e.to_string()),
                    link: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingBackend {
        calls: AtomicUsize,
        outcome: Result<VerifiedLink, LinkError>,
    }

    impl CountingBackend {
        fn new(outcome: Result<VerifiedLink, LinkError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome,
            }
        }
    }

    #[async_trait]
    impl ChallengeBackend for CountingBackend {
        async fn verify_challenge(&self, _token: &str) -> Result<VerifiedLink, LinkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn verified_link() -> VerifiedLink {
        VerifiedLink {
            email: "user@example.com".to_string(),
            subject_id: "sub-1".to_string(),
            execution_id: None,
        }
    }

    #[tokio::test]
    async fn test_valid_token_redirects_authenticated() {
        let backend = Arc::new(CountingBackend::new(Ok(verified_link())));
        let verifier = ChallengeVerifier::new(backend.clone(), "https://app.example.com/");

        let result = verifier.verify("/verify?whatever").await;
        assert!(result.authenticated);
        assert_eq!(result.redirect_target, "https://app.example.com/");
        assert!(result.error.is_none());
        assert_eq!(result.link.unwrap().email, "user@example.com");

        // Downstream verification is invoked exactly once per token
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_token_maps_to_error() {
        let backend = Arc::new(CountingBackend::new(Err(LinkError::SignatureMismatch)));
        let verifier = ChallengeVerifier::new(backend.clone(), "https://app.example.com/");

        let result = verifier.verify("/verify?whatever").await;
        assert!(!result.authenticated);
        assert!(result.error.unwrap().contains("signature"));
        assert!(result.link.is_none());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_signed_link_backend_round_trip() {
        let signer = LinkSigner::new("secret", "https://auth.example.com/verify").unwrap();
        let signed = signer
            .sign(
                &[("email", "user@example.com"), ("verified", "true")],
                Duration::hours(24),
                Utc::now(),
            )
            .unwrap();
        let token = &signed[signed.find("/verify").unwrap()..];

        let backend = SignedLinkBackend::new(signer);
        let link = backend.verify_challenge(token).await.unwrap();
        assert_eq!(link.email, "user@example.com");
    }
}
