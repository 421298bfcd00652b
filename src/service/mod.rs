//! Service Layer
//!
//! Business logic for the magic-link flow: deliverability validation,
//! account provisioning, link signing, email dispatch, challenge
//! verification, and the workflow orchestration tying them together.

pub mod email_service;
pub mod email_validator;
pub mod link_signer;
pub mod provisioner;
pub mod verifier;
pub mod workflow;

// Re-export services
pub use email_service::{fetch_destination, EmailService, NotifyError};
pub use email_validator::{EmailValidator, ValidationFailure, Verdict};
pub use link_signer::{LinkError, LinkSigner, VerifiedLink, DEFAULT_VALID_FOR_HOURS};
pub use provisioner::AccountProvisioner;
pub use verifier::{ChallengeResult, ChallengeVerifier, SignedLinkBackend};
pub use workflow::{
    drive_registration, transition, verify_step, RegistrationSteps, WorkflowService,
};
