//! WizardManager: holds the in-progress brand setup wizards.
//!
//! Wizards live in memory only. Each belongs to the email of the session
//! that created it; a wizard owned by someone else is reported as not found.
//! Submitted and idle wizards are dropped by [`WizardManager::purge_stale`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::WizardError;

use super::state::WizardState;

#[derive(Default)]
pub struct WizardManager {
    wizards: RwLock<HashMap<Uuid, WizardState>>,
}

impl WizardManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new wizard for `owner` on the brand-info step.
    pub async fn create(&self, owner: &str) -> WizardState {
        let state = WizardState::new(owner);
        self.wizards.write().await.insert(state.id, state.clone());
        tracing::info!(wizard = %state.id, owner, "Brand setup wizard started");
        state
    }

    /// Snapshot of a wizard owned by `owner`.
    pub async fn get(&self, id: Uuid, owner: &str) -> Result<WizardState, WizardError> {
        let wizards = self.wizards.read().await;
        wizards
            .get(&id)
            .filter(|w| w.owner == owner)
            .cloned()
            .ok_or(WizardError::NotFound { id })
    }

    /// Wizards owned by `owner`, oldest first.
    pub async fn list_for(&self, owner: &str) -> Vec<WizardState> {
        let wizards = self.wizards.read().await;
        let mut owned: Vec<_> = wizards
            .values()
            .filter(|w| w.owner == owner)
            .cloned()
            .collect();
        owned.sort_by_key(|w| w.created_at);
        owned
    }

    /// Apply `f` to the wizard under the write lock and return its result
    /// together with the updated snapshot.
    pub async fn mutate<T, F>(
        &self,
        id: Uuid,
        owner: &str,
        f: F,
    ) -> Result<(T, WizardState), WizardError>
    where
        F: FnOnce(&mut WizardState) -> Result<T, WizardError>,
    {
        let mut wizards = self.wizards.write().await;
        let wizard = wizards
            .get_mut(&id)
            .filter(|w| w.owner == owner)
            .ok_or(WizardError::NotFound { id })?;

        match f(wizard) {
            Ok(out) => Ok((out, wizard.clone())),
            Err(e) => {
                if let WizardError::Blocked { step, notification } = &e {
                    tracing::debug!(
                        wizard = %id,
                        %step,
                        title = %notification.title,
                        "Wizard transition blocked"
                    );
                }
                Err(e)
            }
        }
    }

    /// Drop every wizard owned by `owner`. Used on sign-out.
    pub async fn discard_for(&self, owner: &str) -> usize {
        let mut wizards = self.wizards.write().await;
        let before = wizards.len();
        wizards.retain(|_, w| w.owner != owner);
        before - wizards.len()
    }

    /// Drop submitted wizards and those untouched since `cutoff`.
    pub async fn purge_stale(&self, cutoff: DateTime<Utc>) -> usize {
        let mut wizards = self.wizards.write().await;
        let before = wizards.len();
        wizards.retain(|_, w| !w.submitted && w.updated_at >= cutoff);
        before - wizards.len()
    }
}
