//! Page Templates
//!
//! Embedded HTML snippets rendered back to the browser: the registration
//! response (echoing either a validation error or a confirmation carrying
//! the execution handle) and the verification-error page. Built once at
//! startup and shared immutably through the application state.

use tera::Tera;

use crate::utils::error::{AppError, AppResult};

/// Template name for the registration response page
pub const REGISTRATION_RESPONSE: &str = "registration_response.html";

/// Template name for the verification-error page
pub const VERIFICATION_ERROR: &str = "verification_error.html";

/// Build the page template set
pub fn page_templates() -> AppResult<Tera> {
    let mut tera = Tera::default();

    let registration_response = r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Sign in or register</title>
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }
        .error { color: #b02a37; background: #f8d7da; padding: 12px; border-radius: 4px; }
        .handle { font-size: 12px; color: #666; }
    </style>
</head>
<body>
    <div id="unauthenticated">
    {% if error_message %}
        <p class="error">{{ error_message }}</p>
    {% else %}
        <p>Check your inbox: a sign-in link is on its way to <strong>{{ email }}</strong>.</p>
        <p class="handle">Request reference: <code>{{ token }}</code></p>
    {% endif %}
    </div>
</body>
</html>
    "#;

    let verification_error = r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Sign-in link not accepted</title>
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }
        .error { color: #b02a37; background: #f8d7da; padding: 12px; border-radius: 4px; }
    </style>
</head>
<body>
    <p class="error">{{ error_message }}</p>
    <p><a href="{{ landing_url }}">Request a new sign-in link</a></p>
</body>
</html>
    "#;

    tera.add_raw_template(REGISTRATION_RESPONSE, registration_response)
        .map_err(|e| {
            AppError::Configuration(format!("Failed to add registration template: {}", e))
        })?;
    tera.add_raw_template(VERIFICATION_ERROR, verification_error)
        .map_err(|e| {
            AppError::Configuration(format!("Failed to add verification template: {}", e))
        })?;

    Ok(tera)
}
