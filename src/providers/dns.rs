//! DNS and Deny-List Providers
//!
//! Bundled implementations of the MX-resolution and disposable-domain
//! boundaries: a hickory-resolver backed MX lookup and a static deny list of
//! well-known disposable-email providers.

use std::collections::HashSet;

use async_trait::async_trait;
use hickory_resolver::{
    config::{ResolverConfig, ResolverOpts},
    TokioAsyncResolver,
};

use super::{DisposableRegistry, DnsError, MxRecord, MxResolver};

/// MX resolution backed by the system's DNS via hickory-resolver
pub struct HickoryMxResolver {
    resolver: TokioAsyncResolver,
}

impl HickoryMxResolver {
    pub fn new() -> Self {
        let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());
        Self { resolver }
    }
}

impl Default for HickoryMxResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MxResolver for HickoryMxResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        let lookup = self
            .resolver
            .mx_lookup(domain)
            .await
            .map_err(|e| DnsError::Lookup(e.to_string()))?;

        Ok(lookup
            .iter()
            .map(|mx| MxRecord {
                preference: mx.preference(),
                exchange: mx.exchange().to_utf8(),
            })
            .collect())
    }
}

/// Well-known disposable-email providers.
///
/// A static list stands in for the vendored deny-list service; deployments
/// with their own feed implement [`DisposableRegistry`] over it.
const DISPOSABLE_DOMAINS: &[&str] = &[
    "10minutemail.com",
    "dispostable.com",
    "getnada.com",
    "guerrillamail.com",
    "maildrop.cc",
    "mailinator.com",
    "sharklasers.com",
    "temp-mail.org",
    "tempmail.com",
    "throwawaymail.com",
    "trashmail.com",
    "yopmail.com",
];

/// Deny-list lookup over a fixed set of domains
pub struct StaticDisposableList {
    domains: HashSet<String>,
}

impl StaticDisposableList {
    /// Deny list with extra domains on top of the built-in set
    pub fn with_domains<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::default();
        list.domains
            .extend(extra.into_iter().map(|d| d.into().to_lowercase()));
        list
    }
}

impl Default for StaticDisposableList {
    fn default() -> Self {
        Self {
            domains: DISPOSABLE_DOMAINS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl DisposableRegistry for StaticDisposableList {
    fn is_disposable(&self, domain: &str) -> bool {
        self.domains.contains(&domain.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_list_contains_known_providers() {
        let list = StaticDisposableList::default();
        assert!(list.is_disposable("mailinator.com"));
        assert!(list.is_disposable("MAILINATOR.COM"));
        assert!(!list.is_disposable("example.com"));
    }

    #[test]
    fn test_static_list_with_extra_domains() {
        let list = StaticDisposableList::with_domains(["Corp-Burners.io"]);
        assert!(list.is_disposable("corp-burners.io"));
        assert!(list.is_disposable("yopmail.com"));
    }
}
