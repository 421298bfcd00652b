//! Magic Link Service Library
//!
//! A passwordless registration and sign-in service built around signed,
//! time-limited verification links. A client submits an email address; the
//! service validates it for deliverability, provisions a directory account
//! if needed, issues a signed verification link, emails it, and later
//! exchanges the clicked link for an authenticated redirect.
//!
//! # Features
//!
//! - **Deliverability Validation**: MX lookup and disposable-domain checks
//!   before any account work happens
//! - **Idempotent Provisioning**: duplicate registrations resolve to the
//!   existing account and continue toward sign-in
//! - **Signed Links**: HMAC-SHA256 over the method, path, and exact query
//!   parameter set, bound to a fixed validity window
//! - **Step-Wise Orchestration**: a pure transition function over explicit
//!   step outputs; any failed step halts the execution
//! - **Test Mail Routing**: a single override inbox can receive uniquely
//!   tagged copies of all outbound mail in non-production environments
//! - **Pluggable Collaborators**: identity provider, mail transport, DNS,
//!   and execution store behind traits with bundled implementations
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use magic_link_service::{
//!     providers::{InMemoryDirectory, InMemoryExecutionStore},
//!     service::{AccountProvisioner, WorkflowService},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let workflow = WorkflowService::new(Arc::new(InMemoryExecutionStore::new()));
//!     let provisioner = AccountProvisioner::new(Arc::new(InMemoryDirectory::new()));
//!
//!     let execution_id = workflow.start("alice@example.com", false).await?;
//!     let output = provisioner.provision("alice@example.com").await;
//!     println!("started {} -> {:?}", execution_id, output);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The library is organized into several layers:
//!
//! - **API Layer**: the two inbound wire contracts (registration POST,
//!   verification GET) and page rendering
//! - **Service Layer**: validator, provisioner, link signer, notifier,
//!   challenge verifier, and the workflow orchestrator
//! - **Providers**: trait boundaries for every external collaborator
//! - **Models**: workflow state, step outputs, account records
//! - **Utils**: error taxonomy, validation, credential generation

/// HTTP API layer with handlers and configurable routing
pub mod api;

/// Configuration management for all service settings
pub mod config;

/// Data models for workflow executions, accounts, and requests
pub mod models;

/// Trait boundaries and bundled implementations for external collaborators
pub mod providers;

/// Business logic for the magic-link flow
pub mod service;

/// Shared utilities for errors, validation, and credential generation
pub mod utils;

// Re-export commonly used types for convenient access
pub use api::{create_routes, AppState, RouterBuilder};
pub use config::{env, AppConfig, MailConfig, ServerConfig, SigningConfig, WorkflowConfig};
pub use models::{
    AccountRecord, ExecutionId, ProvisionOutcome, RegistrationForm, SignInMethod, StepOutput,
    StepState, WorkflowExecution, WorkflowState,
};
pub use service::{
    AccountProvisioner, ChallengeResult, ChallengeVerifier, EmailService, EmailValidator,
    LinkError, LinkSigner, RegistrationSteps, SignedLinkBackend, VerifiedLink, WorkflowService,
};
pub use utils::error::{AppError, AppResult, ErrorResponse};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
