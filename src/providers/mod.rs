//! External Collaborators
//!
//! Trait boundaries for the external services the flow depends on: the
//! identity provider (account directory), the mail provider, DNS and the
//! disposable-domain deny list, the hosting execution store, and the
//! downstream challenge-verification operation. The core branches on these
//! traits' tagged results only; it never inspects provider-specific error
//! codes or representations.
//!
//! Each trait ships with a bundled implementation suitable for development
//! and tests; production deployments supply their own.

pub mod dns;
pub mod memory;
pub mod smtp;

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::workflow::{ExecutionId, WorkflowExecution, WorkflowState};
use crate::service::link_signer::{LinkError, VerifiedLink};
use crate::utils::error::AppResult;

// Re-export bundled implementations
pub use dns::{HickoryMxResolver, StaticDisposableList};
pub use memory::{InMemoryDirectory, InMemoryExecutionStore};
pub use smtp::SmtpMailer;

/// Account data returned by the identity provider on successful creation
#[derive(Debug, Clone)]
pub struct ProvisionedUser {
    /// Immutable unique identifier assigned by the provider
    pub subject_id: String,

    /// Provider-reported account attributes
    pub attributes: HashMap<String, String>,
}

/// Errors from the identity provider, already discriminated.
///
/// "Already exists" is its own variant so callers never have to compare
/// provider error-code strings to find the duplicate-account branch.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("An account with the given email already exists.")]
    AlreadyExists,

    #[error("{0}")]
    Provider(String),
}

/// The identity provider's account-creation operation
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account for `email` with a one-time temporary credential.
    ///
    /// `suppress_notification` asks the provider not to send its own welcome
    /// message; this flow delivers the sign-in link itself.
    async fn create_user(
        &self,
        email: &str,
        temp_credential: &str,
        suppress_notification: bool,
    ) -> Result<ProvisionedUser, IdentityError>;
}

/// A rendered transactional message ready for dispatch
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    /// Sender mailbox, display-name form (`Name <addr>`)
    pub from: String,
    /// Recipient address
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// Provider acknowledgement for a dispatched message
#[derive(Debug, Clone)]
pub struct SendReceipt {
    /// Provider-assigned message identifier, when one was reported
    pub message_id: Option<String>,
}

/// Errors from the mail provider
#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(String),

    #[error("{0}")]
    Transport(String),
}

/// The mail provider's dispatch operation
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<SendReceipt, MailError>;
}

/// A mail-exchange record for a domain
#[derive(Debug, Clone)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

/// Errors from DNS resolution
#[derive(Debug, Error)]
pub enum DnsError {
    #[error("{0}")]
    Lookup(String),
}

/// MX lookup against DNS
#[async_trait]
pub trait MxResolver: Send + Sync {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError>;
}

/// Deny-list lookup for disposable-email domains
pub trait DisposableRegistry: Send + Sync {
    fn is_disposable(&self, domain: &str) -> bool;
}

/// Persistence for workflow executions.
///
/// The hosting runtime owns the real store and its retention policy; the
/// core only reads and writes through this boundary. Execution ids are
/// minted here and returned as opaque handles.
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    /// Create a new execution for `email` in the `STARTED` state
    async fn create(&self, email: &str) -> AppResult<WorkflowExecution>;

    async fn get(&self, id: &ExecutionId) -> AppResult<Option<WorkflowExecution>>;

    /// Latest execution started for `email`, if any
    async fn find_by_email(&self, email: &str) -> AppResult<Option<WorkflowExecution>>;

    async fn update_state(&self, id: &ExecutionId, state: WorkflowState) -> AppResult<()>;
}

/// Downstream verification operation the Challenge Verifier delegates to.
///
/// The verifier invokes this exactly once per presented link and forwards
/// the result; the actual signature/expiry checking lives behind it.
#[async_trait]
pub trait ChallengeBackend: Send + Sync {
    async fn verify_challenge(&self, token: &str) -> Result<VerifiedLink, LinkError>;
}
