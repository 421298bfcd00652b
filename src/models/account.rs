//! Account Models
//!
//! Data structures for directory accounts and provisioning outcomes.

use serde::{Deserialize, Serialize};

/// How an account authenticates.
///
/// The flow only ever provisions link-based sign-in; the tag is recorded on
/// step outputs so downstream consumers don't have to infer it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignInMethod {
    MagicLink,
}

/// A provisioned directory account.
///
/// At most one record exists per email; uniqueness is enforced by the
/// identity provider, not by this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Address the account was provisioned for
    pub email: String,

    /// Immutable unique identifier assigned by the identity provider
    pub subject_id: String,

    /// How the account signs in
    pub sign_in_method: SignInMethod,
}

/// Result of an account-provisioning attempt.
///
/// "Already exists" is an explicit non-error branch: duplicate registration
/// routes to sign-in with the pre-existing identity rather than failing.
/// Provider failures keep the provider's message verbatim for diagnostics.
#[derive(Debug, Clone)]
pub enum ProvisionOutcome {
    /// A new account was created
    Created(AccountRecord),
    /// An account for this email already existed; the flow continues with
    /// the pre-existing identity
    AlreadyExists,
    /// The provider reported an error other than "already exists"
    Error(String),
}
