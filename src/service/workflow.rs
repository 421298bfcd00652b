//! Workflow Orchestrator
//!
//! The registration/verification state machine. Each step executes as an
//! independent, stateless invocation; steps communicate only through the
//! persisted execution record and explicit [`StepOutput`] payloads. The
//! transition function is pure: next state is computed from the current
//! state plus the step outcome, any failed step halts the execution, and
//! duplicate accounts are the non-error branch that continues toward
//! link-based sign-in.
//!
//! Retries are not attempted here; they belong to whatever scheduler is
//! driving the steps. [`drive_registration`] is the development server's
//! stand-in for that scheduler, bounding every external call with the
//! invoker-supplied step timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};

use crate::models::account::{ProvisionOutcome, SignInMethod};
use crate::models::workflow::{
    ExecutionId, StepOutput, StepState, WorkflowExecution, WorkflowState,
};
use crate::providers::ExecutionStore;
use crate::service::email_service::EmailService;
use crate::service::link_signer::LinkSigner;
use crate::service::provisioner::AccountProvisioner;
use crate::service::verifier::ChallengeResult;
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::split_address;

/// Compute the next workflow state from the current state and a step outcome.
///
/// Terminal states are absorbing; any failed step halts the execution; both
/// provisioning outcomes advance the flow, since an existing account simply
/// skips ahead to issuing a link for the pre-existing identity.
pub fn transition(current: WorkflowState, output: &StepOutput) -> AppResult<WorkflowState> {
    if current.is_terminal() {
        return Err(AppError::Internal(format!(
            "execution is already terminal in state {}",
            current
        )));
    }

    let next = match (current, output.state) {
        (_, StepState::Failed) => WorkflowState::Failed,
        (WorkflowState::Started, StepState::UserAdded)
        | (WorkflowState::Started, StepState::UserExists) => WorkflowState::UserProvisioned,
        (WorkflowState::UserProvisioned, StepState::Success) => WorkflowState::LinkIssued,
        (WorkflowState::LinkIssued, StepState::Success) => WorkflowState::EmailSent,
        (WorkflowState::EmailSent, StepState::Success) => WorkflowState::Success,
        (state, step) => {
            return Err(AppError::Internal(format!(
                "no transition from {} for step outcome {:?}",
                state, step
            )));
        }
    };
    Ok(next)
}

/// Orchestrates workflow executions over the hosting execution store
pub struct WorkflowService {
    store: Arc<dyn ExecutionStore>,
}

impl WorkflowService {
    pub fn new(store: Arc<dyn ExecutionStore>) -> Self {
        Self { store }
    }

    /// Start (or re-enter) the workflow for an email.
    ///
    /// Without `restart`, an email that already has an execution gets its
    /// existing handle back unchanged; with `restart`, a fresh execution
    /// with a fresh handle is created.
    pub async fn start(&self, email: &str, restart: bool) -> AppResult<ExecutionId> {
        if split_address(email).is_none() {
            return Err(AppError::Validation(
                "Email address must contain exactly one '@' with a local part and a domain."
                    .to_string(),
            ));
        }

        if !restart {
            if let Some(existing) = self.store.find_by_email(email).await? {
                log::info!("[{}] Reusing existing execution for {}", existing.id, email);
                return Ok(existing.id);
            }
        }

        let execution = self.store.create(email).await?;
        log::info!("[{}] Started workflow for {}", execution.id, email);
        Ok(execution.id)
    }

    /// Apply a step outcome to an execution and persist the new state
    pub async fn advance(&self, id: &ExecutionId, output: &StepOutput) -> AppResult<WorkflowState> {
        let execution = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("unknown execution: {}", id)))?;

        let next = transition(execution.state, output)?;
        self.store.update_state(id, next).await?;

        log::info!(
            "[{}] {} -> {} ({})",
            id,
            execution.state,
            next,
            output.message
        );
        Ok(next)
    }

    /// Look up an execution by its handle
    pub async fn execution(&self, id: &ExecutionId) -> AppResult<Option<WorkflowExecution>> {
        self.store.get(id).await
    }
}

/// The stateless registration steps, invoked one at a time per execution
pub struct RegistrationSteps {
    provisioner: AccountProvisioner,
    signer: LinkSigner,
    notifier: EmailService,
    link_valid_for_hours: i64,
}

impl RegistrationSteps {
    pub fn new(
        provisioner: AccountProvisioner,
        signer: LinkSigner,
        notifier: EmailService,
        link_valid_for_hours: i64,
    ) -> Self {
        Self {
            provisioner,
            signer,
            notifier,
            link_valid_for_hours,
        }
    }

    /// Create-or-detect the directory account for the address
    pub async fn provision_step(&self, email: &str) -> StepOutput {
        match self.provisioner.provision(email).await {
            ProvisionOutcome::Created(record) => StepOutput {
                state: StepState::UserAdded,
                email: email.to_string(),
                message: "User has been added to the directory.".to_string(),
                subject_id: Some(record.subject_id),
                sign_in_method: Some(SignInMethod::MagicLink),
                link: None,
            },
            ProvisionOutcome::AlreadyExists => StepOutput {
                state: StepState::UserExists,
                email: email.to_string(),
                message: "An account with the given email already exists.".to_string(),
                subject_id: None,
                sign_in_method: Some(SignInMethod::MagicLink),
                link: None,
            },
            ProvisionOutcome::Error(message) => StepOutput::failed(
                email,
                format!("Error adding user to the directory: {}", message),
            ),
        }
    }

    /// Issue the signed verification link for the execution
    pub fn issue_link_step(&self, execution_id: &ExecutionId, prior: &StepOutput) -> StepOutput {
        let subject_id = prior.subject_id.clone().unwrap_or_default();
        let params = [
            ("email", prior.email.as_str()),
            ("subjectId", subject_id.as_str()),
            ("verified", "true"),
            ("execution", execution_id.as_str()),
        ];

        match self.signer.sign(
            &params,
            Duration::hours(self.link_valid_for_hours),
            Utc::now(),
        ) {
            Ok(url) => StepOutput {
                state: StepState::Success,
                email: prior.email.clone(),
                message: "Verification link issued.".to_string(),
                subject_id: prior.subject_id.clone(),
                sign_in_method: prior.sign_in_method,
                link: Some(url),
            },
            Err(e) => StepOutput::failed(
                &prior.email,
                format!("error in generating verification url: {}", e),
            ),
        }
    }

    /// Dispatch the verification email carrying the issued link
    pub async fn send_email_step(&self, prior: &StepOutput) -> StepOutput {
        let Some(link) = prior.link.as_deref() else {
            return StepOutput::failed(&prior.email, "no verification link available to send");
        };

        match self
            .notifier
            .send_verification_email(&prior.email, link, self.link_valid_for_hours)
            .await
        {
            Ok(receipt) => StepOutput::success(
                &prior.email,
                format!(
                    "Your email verification url link is {}. provider message id is {}",
                    link,
                    receipt.message_id.as_deref().unwrap_or("unknown")
                ),
            ),
            Err(e) => StepOutput::failed(&prior.email, e.to_string()),
        }
    }
}

/// Map a challenge-verification result to the finishing step's output
pub fn verify_step(result: &ChallengeResult) -> StepOutput {
    match &result.link {
        Some(link) if result.authenticated => {
            StepOutput::success(&link.email, "Auth challenge verified.")
        }
        _ => StepOutput::failed(
            "",
            result
                .error
                .clone()
                .unwrap_or_else(|| "auth challenge was not verified".to_string()),
        ),
    }
}

/// Drive one registration through its provisioning, link and email steps.
///
/// Plays the role of the external scheduler for the development server:
/// steps run one at a time, every external call is bounded by
/// `step_timeout`, and a timeout is treated like any other failed step. The
/// execution then waits in `EMAIL_SENT` until the link is clicked.
pub async fn drive_registration(
    workflow: Arc<WorkflowService>,
    steps: Arc<RegistrationSteps>,
    execution_id: ExecutionId,
    email: String,
    step_timeout: StdDuration,
) {
    let output = bounded(step_timeout, steps.provision_step(&email), &email, "provisioning").await;
    let Some(state) = advance_logged(&workflow, &execution_id, &output).await else {
        return;
    };
    if state == WorkflowState::Failed {
        return;
    }

    let output = steps.issue_link_step(&execution_id, &output);
    let Some(state) = advance_logged(&workflow, &execution_id, &output).await else {
        return;
    };
    if state == WorkflowState::Failed {
        return;
    }

    let output = bounded(
        step_timeout,
        steps.send_email_step(&output),
        &email,
        "email dispatch",
    )
    .await;
    let _ = advance_logged(&workflow, &execution_id, &output).await;
}

async fn bounded<F>(timeout: StdDuration, step: F, email: &str, label: &str) -> StepOutput
where
    F: Future<Output = StepOutput>,
{
    match tokio::time::timeout(timeout, step).await {
        Ok(output) => output,
        Err(_) => StepOutput::failed(
            email,
            format!("{} timed out after {}ms", label, timeout.as_millis()),
        ),
    }
}

async fn advance_logged(
    workflow: &WorkflowService,
    id: &ExecutionId,
    output: &StepOutput,
) -> Option<WorkflowState> {
    match workflow.advance(id, output).await {
        Ok(state) => Some(state),
        Err(e) => {
            log::error!("[{}] Failed to advance execution: {}", id, e);
            None
        }
    }
}
