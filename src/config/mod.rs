//! Configuration Module
//!
//! Centralized configuration management for the magic-link service: server,
//! link signing, mail, and workflow settings, all sourced from environment
//! variables. Configuration is immutable process-wide state constructed once
//! at startup and passed explicitly into each component.

use anyhow::Result;

use crate::service::link_signer::DEFAULT_VALID_FOR_HOURS;

/// Environment variable helpers
pub mod env {
    use std::env;

    /// Get environment variable as string with default
    pub fn get_string(key: &str, default: &str) -> String {
        env::var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get environment variable as boolean with default
    pub fn get_bool(key: &str, default: bool) -> bool {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as u16 with default
    pub fn get_u16(key: &str, default: u16) -> u16 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as u64 with default
    pub fn get_u64(key: &str, default: u64) -> u64 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as i64 with default
    pub fn get_i64(key: &str, default: i64) -> i64 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Check if environment variable is set
    pub fn is_set(key: &str) -> bool {
        env::var(key).is_ok()
    }

    /// Get required environment variable or panic
    pub fn get_required(key: &str) -> String {
        env::var(key).unwrap_or_else(|_| panic!("Required environment variable {} is not set", key))
    }
}

/// Application configuration combining all service configurations
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Link signing configuration
    pub signing: SigningConfig,

    /// Mail configuration
    pub mail: MailConfig,

    /// Workflow configuration
    pub workflow: WorkflowConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

/// Link signing configuration
#[derive(Debug, Clone)]
pub struct SigningConfig {
    /// HMAC key the verification links are signed with
    pub secret: String,

    /// Absolute URL of the verification endpoint embedded in links
    pub verify_url: String,

    /// Where verified clients are redirected
    pub landing_url: String,

    /// Validity window for issued links
    pub valid_for_hours: i64,
}

/// Mail configuration
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
    /// Subject line of the verification email
    pub subject: String,
    /// Test-routing override inbox; empty means deliver to real recipients
    pub test_to_address: String,
}

/// Workflow configuration
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Upper bound for each step's external call
    pub step_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: env::get_string("SERVER_HOST", "0.0.0.0"),
            port: env::get_u16("SERVER_PORT", 3000),
            cors_origins: env::get_string("CORS_ORIGINS", "*")
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
        }
    }
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            secret: env::get_required("LINK_SIGNING_SECRET"),
            verify_url: env::get_string("VERIFY_URL", "http://localhost:3000/verify"),
            landing_url: env::get_string("LANDING_URL", "http://localhost:3000/"),
            valid_for_hours: env::get_i64("LINK_VALID_FOR_HOURS", DEFAULT_VALID_FOR_HOURS),
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            step_timeout_seconds: env::get_u64("STEP_TIMEOUT_SECONDS", 10),
        }
    }
}

impl WorkflowConfig {
    /// Step timeout as a duration
    pub fn step_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.step_timeout_seconds)
    }
}

impl MailConfig {
    /// Create mail configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            smtp_host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            smtp_port: env::get_u16("SMTP_PORT", 587),
            smtp_username: std::env::var("SMTP_USERNAME")
                .map_err(|_| anyhow::anyhow!("SMTP_USERNAME environment variable is required"))?,
            smtp_password: std::env::var("SMTP_PASSWORD")
                .map_err(|_| anyhow::anyhow!("SMTP_PASSWORD environment variable is required"))?,
            from_email: std::env::var("FROM_EMAIL")
                .map_err(|_| anyhow::anyhow!("FROM_EMAIL environment variable is required"))?,
            from_name: env::get_string("FROM_NAME", "Magic Link Service"),
            subject: env::get_string("MAIL_SUBJECT", "Your sign-in link"),
            test_to_address: env::get_string("MAIL_TEST_TO_ADDRESS", ""),
        })
    }
}

impl AppConfig {
    /// Load complete application configuration from environment
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            server: ServerConfig::default(),
            signing: SigningConfig::default(),
            mail: MailConfig::from_env()?,
            workflow: WorkflowConfig::default(),
        })
    }

    /// Validate the complete configuration
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".into());
        }

        if self.signing.secret.is_empty() {
            return Err("Link signing secret cannot be empty".into());
        }

        if url::Url::parse(&self.signing.verify_url).is_err() {
            return Err("VERIFY_URL must be an absolute URL".into());
        }

        if self.signing.valid_for_hours <= 0 {
            return Err("LINK_VALID_FOR_HOURS must be greater than 0".into());
        }

        if self.workflow.step_timeout_seconds == 0 {
            return Err("STEP_TIMEOUT_SECONDS must be greater than 0".into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_helpers() {
        assert!(env::get_bool("NONEXISTENT_BOOL", true));
        assert!(!env::get_bool("NONEXISTENT_BOOL", false));
        assert_eq!(env::get_u16("NONEXISTENT_U16", 42), 42);
        assert_eq!(env::get_string("NONEXISTENT_STRING", "default"), "default");
        assert!(!env::is_set("NONEXISTENT_FLAG"));
    }

    #[test]
    fn test_workflow_config_timeout() {
        let config = WorkflowConfig {
            step_timeout_seconds: 7,
        };
        assert_eq!(config.step_timeout(), std::time::Duration::from_secs(7));
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let config = AppConfig {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                cors_origins: vec!["*".to_string()],
            },
            signing: SigningConfig {
                secret: String::new(),
                verify_url: "http://localhost:3000/verify".to_string(),
                landing_url: "http://localhost:3000/".to_string(),
                valid_for_hours: 24,
            },
            mail: MailConfig {
                smtp_host: "localhost".to_string(),
                smtp_port: 587,
                smtp_username: "u".to_string(),
                smtp_password: "p".to_string(),
                from_email: "noreply@example.com".to_string(),
                from_name: "Magic Link Service".to_string(),
                subject: "Your sign-in link".to_string(),
                test_to_address: String::new(),
            },
            workflow: WorkflowConfig {
                step_timeout_seconds: 10,
            },
        };
        assert!(config.validate().is_err());

        let mut valid = config;
        valid.signing.secret = "a-long-enough-signing-secret".to_string();
        assert!(valid.validate().is_ok());
    }
}
