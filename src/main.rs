//! Magic Link Service Development Server
//!
//! A complete HTTP server for local development and testing of the
//! passwordless flow. It wires the bundled in-memory directory and execution
//! store behind the provider traits and plays the step scheduler itself;
//! production deployments supply their own identity provider, execution
//! store, and scheduler and use the RouterBuilder from their own binary.

use std::sync::Arc;

use dotenv::dotenv;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use magic_link_service::{
    api::{AppState, RouterBuilder},
    config::AppConfig,
    providers::{
        HickoryMxResolver, InMemoryDirectory, InMemoryExecutionStore, SmtpMailer,
        StaticDisposableList,
    },
    service::{
        AccountProvisioner, ChallengeVerifier, EmailService, EmailValidator, LinkSigner,
        RegistrationSteps, SignedLinkBackend, WorkflowService,
    },
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv().ok();

    // Initialize structured logging for development
    env_logger::init();

    log::info!(
        "🚀 Starting Magic Link Service v{}",
        magic_link_service::VERSION
    );

    // Load configuration from environment
    let config = AppConfig::from_env()?;
    config.validate()?;

    log::info!("✅ Configuration loaded and validated");

    // External collaborators: DNS, deny list, SMTP, and the in-memory
    // directory and execution store standing in for production services
    let resolver = Arc::new(HickoryMxResolver::new());
    let disposable = Arc::new(StaticDisposableList::default());
    let mailer = Arc::new(SmtpMailer::new(&config.mail)?);
    let directory = Arc::new(InMemoryDirectory::new());
    let store = Arc::new(InMemoryExecutionStore::new());

    log::info!("✅ Providers initialized");
    log::info!("   - MX resolution via system DNS");
    log::info!("   - SMTP relay: {}:{}", config.mail.smtp_host, config.mail.smtp_port);
    log::info!("   - In-memory directory and execution store (development)");

    // Core services
    let validator = Arc::new(EmailValidator::new(resolver, disposable));
    let workflow = Arc::new(WorkflowService::new(store));
    let signer = LinkSigner::new(config.signing.secret.clone(), &config.signing.verify_url)?;
    let notifier = EmailService::new(config.mail.clone(), mailer)?;
    let steps = Arc::new(RegistrationSteps::new(
        AccountProvisioner::new(directory),
        signer,
        notifier,
        config.signing.valid_for_hours,
    ));
    let verifier = Arc::new(ChallengeVerifier::new(
        Arc::new(SignedLinkBackend::new(LinkSigner::new(
            config.signing.secret.clone(),
            &config.signing.verify_url,
        )?)),
        config.signing.landing_url.clone(),
    ));

    log::info!("✅ Core services initialized");
    log::info!(
        "   - Verification links valid for {}h",
        config.signing.valid_for_hours
    );
    if config.mail.test_to_address.is_empty() {
        log::info!("   - Mail delivered to real recipients");
    } else {
        log::warn!(
            "⚠️  Test routing override active: all mail goes to {}",
            config.mail.test_to_address
        );
    }

    // Create application state
    let app_state = AppState {
        validator,
        workflow,
        steps,
        verifier,
        pages: Arc::new(magic_link_service::api::page_templates()?),
        step_timeout: config.workflow.step_timeout(),
    };

    let router = RouterBuilder::with_all_routes().build(app_state);

    let app = router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any) // Permissive CORS for development
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .into_inner(),
    );

    // Server configuration
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    log::info!("🌐 Starting server on {}", bind_addr);

    log::info!("📋 API Endpoints:");
    log::info!("   POST /account - Submit an email to register or sign in");
    log::info!("   GET  /verify  - Exchange a clicked link for a session redirect");

    // Start the server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    log::info!("✅ Server listening and ready for requests");
    axum::serve(listener, app).await?;

    Ok(())
}
