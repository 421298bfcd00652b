//! In-Memory Providers
//!
//! Bundled directory and execution-store implementations for the development
//! server and tests. Both are concurrency-safe; distinct executions may be
//! driven in parallel against them.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use super::{ExecutionStore, IdentityError, IdentityProvider, ProvisionedUser};
use crate::models::account::{AccountRecord, SignInMethod};
use crate::models::workflow::{ExecutionId, WorkflowExecution, WorkflowState};
use crate::utils::error::{AppError, AppResult};

/// In-memory account directory.
///
/// Enforces the at-most-one-account-per-email invariant the way the real
/// directory does: a second creation attempt reports "already exists"
/// instead of failing, which also resolves concurrent provisioning races.
#[derive(Default)]
pub struct InMemoryDirectory {
    accounts: DashMap<String, AccountRecord>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the stored record for an email
    pub fn account(&self, email: &str) -> Option<AccountRecord> {
        self.accounts.get(email).map(|r| r.clone())
    }
}

#[async_trait]
impl IdentityProvider for InMemoryDirectory {
    async fn create_user(
        &self,
        email: &str,
        temp_credential: &str,
        _suppress_notification: bool,
    ) -> Result<ProvisionedUser, IdentityError> {
        if temp_credential.len() < 12 {
            return Err(IdentityError::Provider(
                "temporary credential does not satisfy the directory policy".to_string(),
            ));
        }

        match self.accounts.entry(email.to_string()) {
            Entry::Occupied(_) => Err(IdentityError::AlreadyExists),
            Entry::Vacant(vacant) => {
                let subject_id = Uuid::new_v4().to_string();
                vacant.insert(AccountRecord {
                    email: email.to_string(),
                    subject_id: subject_id.clone(),
                    sign_in_method: SignInMethod::MagicLink,
                });

                let mut attributes = HashMap::new();
                attributes.insert("email".to_string(), email.to_string());
                attributes.insert("sub".to_string(), subject_id.clone());

                Ok(ProvisionedUser {
                    subject_id,
                    attributes,
                })
            }
        }
    }
}

/// In-memory execution store.
///
/// Mints opaque execution handles and keeps the latest execution per email.
/// Retention is process-lifetime; the hosting runtime owns real persistence.
#[derive(Default)]
pub struct InMemoryExecutionStore {
    executions: DashMap<String, WorkflowExecution>,
    by_email: DashMap<String, String>,
}

impl InMemoryExecutionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExecutionStore for InMemoryExecutionStore {
    async fn create(&self, email: &str) -> AppResult<WorkflowExecution> {
        let id = ExecutionId::new(Uuid::new_v4().to_string());
        let execution = WorkflowExecution {
            id: id.clone(),
            email: email.to_string(),
            state: WorkflowState::Started,
            started_at: Utc::now(),
        };

        self.executions
            .insert(id.as_str().to_string(), execution.clone());
        self.by_email
            .insert(email.to_string(), id.as_str().to_string());

        Ok(execution)
    }

    async fn get(&self, id: &ExecutionId) -> AppResult<Option<WorkflowExecution>> {
        Ok(self.executions.get(id.as_str()).map(|r| r.clone()))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<WorkflowExecution>> {
        let Some(id) = self.by_email.get(email).map(|r| r.clone()) else {
            return Ok(None);
        };
        Ok(self.executions.get(&id).map(|r| r.clone()))
    }

    async fn update_state(&self, id: &ExecutionId, state: WorkflowState) -> AppResult<()> {
        let mut execution = self
            .executions
            .get_mut(id.as_str())
            .ok_or_else(|| AppError::Internal(format!("unknown execution: {}", id)))?;
        execution.state = state;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_directory_assigns_stable_subject_ids() {
        let directory = InMemoryDirectory::new();
        let credential = "Aa1!Aa1!Aa1!";

        let user = directory
            .create_user("user@example.com", credential, true)
            .await
            .unwrap();
        assert_eq!(user.attributes.get("sub"), Some(&user.subject_id));

        let err = directory
            .create_user("user@example.com", credential, true)
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::AlreadyExists));

        // The original record survives the duplicate attempt
        let record = directory.account("user@example.com").unwrap();
        assert_eq!(record.subject_id, user.subject_id);
    }

    #[tokio::test]
    async fn test_directory_rejects_weak_credentials() {
        let directory = InMemoryDirectory::new();
        let err = directory
            .create_user("user@example.com", "short", true)
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::Provider(_)));
    }

    #[tokio::test]
    async fn test_execution_store_round_trip() {
        let store = InMemoryExecutionStore::new();

        let execution = store.create("user@example.com").await.unwrap();
        assert_eq!(execution.state, WorkflowState::Started);

        let found = store.get(&execution.id).await.unwrap().unwrap();
        assert_eq!(found.email, "user@example.com");

        store
            .update_state(&execution.id, WorkflowState::UserProvisioned)
            .await
            .unwrap();
        let found = store.find_by_email("user@example.com").await.unwrap().unwrap();
        assert_eq!(found.state, WorkflowState::UserProvisioned);
    }

    #[tokio::test]
    async fn test_execution_store_latest_per_email() {
        let store = InMemoryExecutionStore::new();

        let first = store.create("user@example.com").await.unwrap();
        let second = store.create("user@example.com").await.unwrap();
        assert_ne!(first.id, second.id);

        let found = store.find_by_email("user@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, second.id);
    }

    #[tokio::test]
    async fn test_update_unknown_execution_fails() {
        let store = InMemoryExecutionStore::new();
        let missing = ExecutionId::new("nope");
        assert!(store
            .update_state(&missing, WorkflowState::Failed)
            .await
            .is_err());
    }
}
