//! HTTP Request Handlers
//!
//! Axum handlers for the two inbound wire contracts: the registration form
//! POST and the verification-link GET. Validation and verification failures
//! render as HTML messages; everything else surfaces through [`AppError`]'s
//! generic responses.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{OriginalUri, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use tera::Tera;
use validator::Validate;

use crate::models::requests::RegistrationForm;
use crate::models::workflow::WorkflowState;
use crate::service::{
    drive_registration, verify_step, ChallengeVerifier, EmailValidator, RegistrationSteps,
    WorkflowService,
};
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::{messages, normalize_email};

use super::templates::{REGISTRATION_RESPONSE, VERIFICATION_ERROR};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<EmailValidator>,
    pub workflow: Arc<WorkflowService>,
    pub steps: Arc<RegistrationSteps>,
    pub verifier: Arc<ChallengeVerifier>,
    pub pages: Arc<Tera>,
    pub step_timeout: Duration,
}

/// Handle a registration form submission.
///
/// The address goes through the syntactic check and the deliverability
/// validator; failures are echoed back as HTML and the workflow never
/// starts. A valid address starts (or re-enters) a workflow execution, the
/// steps are handed to the scheduler, and the confirmation page carries the
/// execution handle.
pub async fn submit_registration(
    State(state): State<AppState>,
    Form(form): Form<RegistrationForm>,
) -> AppResult<Response> {
    let email = normalize_email(&form.email);

    if form.validate().is_err() {
        let page = registration_page(&state.pages, &email, "", messages::INVALID_EMAIL)?;
        return Ok(page.into_response());
    }

    let verdict = state.validator.validate(&email).await;
    if !verdict.ok {
        log::info!("Rejected registration for {}: {}", email, verdict.reason);
        let page = registration_page(&state.pages, &email, "", &verdict.reason)?;
        return Ok(page.into_response());
    }

    let execution_id = state.workflow.start(&email, form.restart()).await?;

    // Only a freshly created execution gets driven; a reused handle is
    // already in flight or settled
    let execution = state
        .workflow
        .execution(&execution_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("unknown execution: {}", execution_id)))?;
    if execution.state == WorkflowState::Started {
        tokio::spawn(drive_registration(
            state.workflow.clone(),
            state.steps.clone(),
            execution_id.clone(),
            email.clone(),
            state.step_timeout,
        ));
    }

    let page = registration_page(&state.pages, &email, execution_id.as_str(), "")?;
    Ok(page.into_response())
}

/// Handle a clicked verification link.
///
/// The full path-and-query is the presented token. A verified token records
/// the execution's completion and redirects to the landing URL; a rejected
/// one renders the error page while the execution stays in its last
/// successful state.
pub async fn verify_link(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> AppResult<Response> {
    let token = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    let result = state.verifier.verify(&token).await;

    if !result.authenticated {
        let mut context = tera::Context::new();
        context.insert(
            "error_message",
            result
                .error
                .as_deref()
                .unwrap_or("The sign-in link could not be verified."),
        );
        context.insert("landing_url", &result.redirect_target);
        let body = state
            .pages
            .render(VERIFICATION_ERROR, &context)
            .map_err(|e| AppError::Internal(format!("Failed to render error page: {}", e)))?;
        return Ok((StatusCode::UNAUTHORIZED, Html(body)).into_response());
    }

    if let Some(link) = &result.link {
        if let Some(execution_id) = &link.execution_id {
            let output = verify_step(&result);
            if let Err(e) = state.workflow.advance(execution_id, &output).await {
                log::warn!(
                    "[{}] Could not record verification completion: {}",
                    execution_id,
                    e
                );
            }
        }
    }

    Ok((StatusCode::FOUND, [(header::LOCATION, result.redirect_target)]).into_response())
}

fn registration_page(
    pages: &Tera,
    email: &str,
    token: &str,
    error_message: &str,
) -> AppResult<Html<String>> {
    let mut context = tera::Context::new();
    context.insert("email", email);
    context.insert("token", token);
    context.insert("error_message", error_message);

    pages
        .render(REGISTRATION_RESPONSE, &context)
        .map(Html)
        .map_err(|e| AppError::Internal(format!("Failed to render registration page: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::templates::page_templates;

    #[test]
    fn test_registration_page_renders_confirmation_and_error() {
        let pages = page_templates().unwrap();

        let Html(confirmation) =
            registration_page(&pages, "user@example.com", "exec-1", "").unwrap();
        assert!(confirmation.contains("exec-1"));

        let Html(error) =
            registration_page(&pages, "user@example.com", "", "Email is not deliverable").unwrap();
        assert!(error.contains("Email is not deliverable"));
    }
}
