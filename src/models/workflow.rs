//! Workflow Models
//!
//! Data structures for the registration/verification workflow: the opaque
//! execution handle, the execution record itself, and the step outputs that
//! every workflow step produces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque correlation handle for one registration/verification attempt.
///
/// The handle threads a single execution across independently invoked steps.
/// It is minted by the execution store and treated as opaque everywhere else;
/// core logic never derives it from some larger compound identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionId(String);

impl ExecutionId {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a workflow execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowState {
    Started,
    UserProvisioned,
    LinkIssued,
    EmailSent,
    Success,
    Failed,
}

impl WorkflowState {
    /// Whether the execution has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Success | WorkflowState::Failed)
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowState::Started => "STARTED",
            WorkflowState::UserProvisioned => "USER_PROVISIONED",
            WorkflowState::LinkIssued => "LINK_ISSUED",
            WorkflowState::EmailSent => "EMAIL_SENT",
            WorkflowState::Success => "SUCCESS",
            WorkflowState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Outcome reported by an individual workflow step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepState {
    Success,
    Failed,
    UserAdded,
    UserExists,
}

/// One registration/verification attempt as persisted by the hosting
/// execution store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowExecution {
    /// Correlation handle for this execution
    pub id: ExecutionId,

    /// Address the execution was started for
    pub email: String,

    /// Current lifecycle state
    pub state: WorkflowState,

    /// When the execution was started
    pub started_at: DateTime<Utc>,
}

/// Result payload produced by every workflow step.
///
/// Steps are stateless; anything a later step needs must travel in this
/// payload or in the persisted execution record. The orchestrator's
/// transition function is a pure function of the current state plus this
/// output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutput {
    /// Outcome of the step
    pub state: StepState,

    /// Address the step operated on
    pub email: String,

    /// Human-readable diagnostic message
    pub message: String,

    /// Directory-assigned identifier, when provisioning produced one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,

    /// How the account signs in, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sign_in_method: Option<crate::models::account::SignInMethod>,

    /// Signed verification link, carried from the link-issue step to the
    /// notifier step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl StepOutput {
    /// Successful step outcome with a diagnostic message
    pub fn success(email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            state: StepState::Success,
            email: email.into(),
            message: message.into(),
            subject_id: None,
            sign_in_method: None,
            link: None,
        }
    }

    /// Failed step outcome with a diagnostic message
    pub fn failed(email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            state: StepState::Failed,
            email: email.into(),
            message: message.into(),
            subject_id: None,
            sign_in_method: None,
            link: None,
        }
    }

    pub fn with_subject_id(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_id_is_opaque() {
        let id = ExecutionId::new("abc-123");
        assert_eq!(id.as_str(), "abc-123");
        assert_eq!(id.to_string(), "abc-123");
    }

    #[test]
    fn test_workflow_state_terminal() {
        assert!(WorkflowState::Success.is_terminal());
        assert!(WorkflowState::Failed.is_terminal());
        assert!(!WorkflowState::Started.is_terminal());
        assert!(!WorkflowState::EmailSent.is_terminal());
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&WorkflowState::UserProvisioned).unwrap();
        assert_eq!(json, "\"USER_PROVISIONED\"");

        let json = serde_json::to_string(&StepState::UserExists).unwrap();
        assert_eq!(json, "\"USER_EXISTS\"");
    }

    #[test]
    fn test_step_output_builders() {
        let output = StepOutput::success("user@example.com", "done")
            .with_subject_id("sub-1")
            .with_link("https://example.com/verify?x=1");
        assert_eq!(output.state, StepState::Success);
        assert_eq!(output.subject_id.as_deref(), Some("sub-1"));
        assert!(output.link.is_some());

        let failed = StepOutput::failed("user@example.com", "boom");
        assert_eq!(failed.state, StepState::Failed);
        assert!(failed.subject_id.is_none());
    }
}
