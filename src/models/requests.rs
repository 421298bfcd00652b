//! Request and Response Models
//!
//! Data structures for API request and response payloads with validation.

use serde::Deserialize;
use validator::Validate;

use crate::utils::validation::email_validator;

/// Form payload submitted from the registration page.
///
/// Consumed once by the orchestrator's start transition. `restart` opts into
/// minting a fresh execution for an email that already has one.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegistrationForm {
    /// Address to register or sign in (syntactic check here; deliverability
    /// checks run before the workflow starts)
    #[validate(custom(function = "email_validator"))]
    pub email: String,

    /// Start a fresh execution even if one already exists for this email
    #[serde(default)]
    pub restart: Option<bool>,
}

impl RegistrationForm {
    pub fn restart(&self) -> bool {
        self.restart.unwrap_or(false)
    }
}
