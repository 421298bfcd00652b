//! Email Validator
//!
//! Deliverability validation for submitted addresses: syntax, MX records,
//! and the disposable-domain deny list. Checks run in order and
//! short-circuit on the first failure; the validator is a pure query against
//! the DNS and deny-list collaborators with no side effects.

use std::sync::Arc;

use crate::providers::{DisposableRegistry, MxResolver};
use crate::utils::validation::domain_of;

/// Which deliverability check rejected the address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    /// Not exactly one `@`, or an empty local part or domain
    MalformedAddress,
    /// The domain has no resolvable mail-exchange records (DNS errors fold
    /// into this)
    MxLookupFailed,
    /// The domain is a known disposable-email provider
    DisposableDomain,
}

/// Outcome of validating a submitted address
#[derive(Debug, Clone)]
pub struct Verdict {
    pub ok: bool,
    /// User-facing reason identifying which check failed
    pub reason: String,
    pub failure: Option<ValidationFailure>,
}

impl Verdict {
    fn pass() -> Self {
        Self {
            ok: true,
            reason: "Email is valid.".to_string(),
            failure: None,
        }
    }

    fn fail(failure: ValidationFailure, reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: reason.into(),
            failure: Some(failure),
        }
    }
}

/// Validates submitted addresses against DNS and the disposable deny list
pub struct EmailValidator {
    resolver: Arc<dyn MxResolver>,
    disposable: Arc<dyn DisposableRegistry>,
}

impl EmailValidator {
    pub fn new(resolver: Arc<dyn MxResolver>, disposable: Arc<dyn DisposableRegistry>) -> Self {
        Self {
            resolver,
            disposable,
        }
    }

    /// Validate an address for deliverability.
    ///
    /// The address must contain exactly one `@`; the substring after it is
    /// the domain checked against DNS and the deny list.
    pub async fn validate(&self, email: &str) -> Verdict {
        let Some(domain) = domain_of(email) else {
            return Verdict::fail(
                ValidationFailure::MalformedAddress,
                "Email address must contain exactly one '@' with a local part and a domain.",
            );
        };

        match self.resolver.lookup_mx(domain).await {
            Ok(records) if !records.is_empty() => {}
            Ok(_) | Err(_) => {
                return Verdict::fail(
                    ValidationFailure::MxLookupFailed,
                    format!("Failed to get MX records for domain: {}", domain),
                );
            }
        }

        if self.disposable.is_disposable(domain) {
            return Verdict::fail(
                ValidationFailure::DisposableDomain,
                format!("Email domain is disposable: {}", domain),
            );
        }

        Verdict::pass()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{DnsError, MxRecord};
    use async_trait::async_trait;

    struct FixedResolver {
        records: Vec<MxRecord>,
        fail: bool,
    }

    #[async_trait]
    impl MxResolver for FixedResolver {
        async fn lookup_mx(&self, _domain: &str) -> Result<Vec<MxRecord>, DnsError> {
            if self.fail {
                return Err(DnsError::Lookup("connection timed out".to_string()));
            }
            Ok(self.records.clone())
        }
    }

    struct DenyList(Vec<&'static str>);

    impl DisposableRegistry for DenyList {
        fn is_disposable(&self, domain: &str) -> bool {
            self.0.contains(&domain)
        }
    }

    fn validator(resolver: FixedResolver, deny: Vec<&'static str>) -> EmailValidator {
        EmailValidator::new(Arc::new(resolver), Arc::new(DenyList(deny)))
    }

    fn mx_record() -> MxRecord {
        MxRecord {
            preference: 10,
            exchange: "mx1.example.com.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_malformed_addresses_are_rejected() {
        let validator = validator(
            FixedResolver {
                records: vec![mx_record()],
                fail: false,
            },
            vec![],
        );

        for email in ["no-at-sign", "two@at@signs.com", "@example.com", "user@"] {
            let verdict = validator.validate(email).await;
            assert!(!verdict.ok, "{} should be rejected", email);
            assert_eq!(verdict.failure, Some(ValidationFailure::MalformedAddress));
        }
    }

    #[tokio::test]
    async fn test_mx_lookup_failure_is_rejected() {
        let validator = validator(
            FixedResolver {
                records: vec![],
                fail: true,
            },
            vec![],
        );

        let verdict = validator.validate("user@example.com").await;
        assert!(!verdict.ok);
        assert_eq!(verdict.failure, Some(ValidationFailure::MxLookupFailed));
        assert!(verdict.reason.contains("example.com"));
    }

    #[tokio::test]
    async fn test_empty_mx_records_are_rejected() {
        let validator = validator(
            FixedResolver {
                records: vec![],
                fail: false,
            },
            vec![],
        );

        let verdict = validator.validate("user@example.com").await;
        assert_eq!(verdict.failure, Some(ValidationFailure::MxLookupFailed));
    }

    #[tokio::test]
    async fn test_disposable_domain_is_rejected() {
        let validator = validator(
            FixedResolver {
                records: vec![mx_record()],
                fail: false,
            },
            vec!["mailinator.com"],
        );

        let verdict = validator.validate("user@mailinator.com").await;
        assert!(!verdict.ok);
        assert_eq!(verdict.failure, Some(ValidationFailure::DisposableDomain));
        assert!(verdict.reason.contains("disposable"));
    }

    #[tokio::test]
    async fn test_deliverable_address_passes() {
        let validator = validator(
            FixedResolver {
                records: vec![mx_record()],
                fail: false,
            },
            vec!["mailinator.com"],
        );

        let verdict = validator.validate("user@example.com").await;
        assert!(verdict.ok);
        assert!(verdict.failure.is_none());
        assert_eq!(verdict.reason, "Email is valid.");
    }
}
