//! Account Provisioner
//!
//! Idempotent "create user" operation against the identity provider. A
//! one-time temporary credential is generated to satisfy the provider's
//! account-creation precondition; it is never surfaced because sign-in is
//! link-based. "Already exists" is an explicit non-error branch so that
//! duplicate registrations (and concurrent provisioning races) resolve to
//! the pre-existing account.

use std::sync::Arc;

use crate::models::account::{AccountRecord, ProvisionOutcome, SignInMethod};
use crate::providers::{IdentityError, IdentityProvider};
use crate::utils::security::generate_temp_credential;

/// Provisions directory accounts for submitted addresses
pub struct AccountProvisioner {
    directory: Arc<dyn IdentityProvider>,
}

impl AccountProvisioner {
    pub fn new(directory: Arc<dyn IdentityProvider>) -> Self {
        Self { directory }
    }

    /// Create an account for `email`, or resolve to the existing one.
    ///
    /// At most one account is created per email; uniqueness is enforced by
    /// the provider. Provider failures keep the provider's message verbatim.
    pub async fn provision(&self, email: &str) -> ProvisionOutcome {
        let credential = generate_temp_credential();

        match self.directory.create_user(email, &credential, true).await {
            Ok(user) => {
                log::info!("User successfully added to the directory: {}", email);
                ProvisionOutcome::Created(AccountRecord {
                    email: email.to_string(),
                    subject_id: user.subject_id,
                    sign_in_method: SignInMethod::MagicLink,
                })
            }
            Err(IdentityError::AlreadyExists) => {
                log::warn!("User already exists in the directory: {}", email);
                ProvisionOutcome::AlreadyExists
            }
            Err(IdentityError::Provider(message)) => {
                log::error!("Error while adding user to the directory: {}", message);
                ProvisionOutcome::Error(message)
            }
        }
    }
}
