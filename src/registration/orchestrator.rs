//! Sign-up submission lifecycle.
//!
//! One submission runs validation, then credential creation, then the profile
//! write, strictly in that order. The two remote steps are not atomic: if the
//! profile write fails the account already exists. By default that account is
//! left in place (orphaned); with compensation enabled it is deleted again.
//!
//! State transitions:
//!
//! ```text
//! Idle | Succeeded | Failed --submit--> Submitting
//! Submitting --validation rejected--> Idle
//! Submitting --remote call failed--> Failed(message)
//! Submitting --profile stored--> Succeeded
//! Submitting --submission dropped--> Failed(message)
//! ```

use crate::registration::config::RegistrationConfig;
use crate::registration::error::{Compensation, RegistrationError};
use crate::registration::form::RegistrationForm;
use crate::registration::ports::{Credential, DocumentStore, IdentityProvider, UserId};
use crate::registration::profile::ProfileRecord;
use crate::registration::state::RegistrationState;
use crate::registration::validation::FormValidationResult;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

const INTERRUPTED: &str = "Signup Failed: the submission was interrupted before it completed";

pub struct RegistrationOrchestrator {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
    collection: String,
    compensate: bool,
    state: watch::Sender<RegistrationState>,
}

impl RegistrationOrchestrator {
    pub fn new(identity: Arc<dyn IdentityProvider>, store: Arc<dyn DocumentStore>) -> Self {
        let (state, _) = watch::channel(RegistrationState::Idle);
        Self {
            identity,
            store,
            collection: "users".to_string(),
            compensate: false,
            state,
        }
    }

    pub fn from_config(
        config: &RegistrationConfig,
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self::new(identity, store)
            .with_collection(config.users_collection.clone())
            .with_compensation(config.compensate_orphaned_credentials)
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_compensation(mut self, enabled: bool) -> Self {
        self.compensate = enabled;
        self
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> RegistrationState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<RegistrationState> {
        self.state.subscribe()
    }

    /// Run one submission for `form`.
    ///
    /// Returns the new account's id on success. A call made while another
    /// submission is in flight is refused with
    /// [`RegistrationError::AlreadySubmitting`] and leaves the state alone.
    pub async fn submit(&self, form: RegistrationForm) -> Result<UserId, RegistrationError> {
        let Some(in_flight) = self.begin() else {
            warn!("Ignoring submit while a registration is in flight");
            return Err(RegistrationError::AlreadySubmitting);
        };

        let attempt = Uuid::new_v4();
        let result = self
            .register(form)
            .instrument(info_span!("registration", %attempt))
            .await;

        match &result {
            Ok(user_id) => {
                info!(%attempt, %user_id, "Registration succeeded");
                in_flight.finish(RegistrationState::Succeeded);
            }
            Err(RegistrationError::Validation(rejection)) => {
                info!(%attempt, field = %rejection.field, "Registration form rejected: {}", rejection.message);
                in_flight.finish(RegistrationState::Idle);
            }
            Err(err) => {
                error!(%attempt, "Registration failed: {}", err);
                in_flight.finish(RegistrationState::Failed(err.failure_message()));
            }
        }
        result
    }

    // Atomic check-and-set so two submits can never both enter Submitting.
    fn begin(&self) -> Option<InFlight<'_>> {
        let entered = self.state.send_if_modified(|state| {
            if state.is_submitting() {
                false
            } else {
                *state = RegistrationState::Submitting;
                true
            }
        });
        entered.then(|| InFlight {
            state: &self.state,
            finished: false,
        })
    }

    async fn register(&self, form: RegistrationForm) -> Result<UserId, RegistrationError> {
        if let Some(rejection) = FormValidationResult::validate(&form).into_rejection() {
            return Err(RegistrationError::Validation(rejection));
        }

        let email = form.email.trim();
        let credential = self
            .identity
            .create_credential(email, form.password.trim())
            .await
            .map_err(RegistrationError::Credential)?;

        let record = ProfileRecord::new(form.first_name.trim(), form.last_name.trim(), email, Utc::now());

        if let Err(source) = self.store.write(&self.collection, &credential, &record).await {
            let compensation = self.compensate_for(&credential).await;
            return Err(RegistrationError::Persistence {
                user_id: credential.into_user_id(),
                source,
                compensation,
            });
        }

        Ok(credential.into_user_id())
    }

    async fn compensate_for(&self, credential: &Credential) -> Compensation {
        if !self.compensate {
            warn!(user_id = %credential.user_id(), "Profile not stored; account left without a profile");
            return Compensation::NotAttempted;
        }

        match self.identity.delete_credential(credential).await {
            Ok(()) => {
                info!(user_id = %credential.user_id(), "Rolled back account after failed profile write");
                Compensation::RolledBack
            }
            Err(e) => {
                error!(user_id = %credential.user_id(), "Rollback of account failed: {}", e);
                Compensation::RollbackFailed(e)
            }
        }
    }
}

/// Owns the `Submitting` state for one submission. Dropped before an outcome
/// is published, it moves the state to `Failed`.
struct InFlight<'a> {
    state: &'a watch::Sender<RegistrationState>,
    finished: bool,
}

impl InFlight<'_> {
    fn finish(mut self, next: RegistrationState) {
        self.state.send_replace(next);
        self.finished = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        warn!("Registration dropped before completion");
        self.state.send_if_modified(|state| {
            if !state.is_submitting() {
                return false;
            }
            *state = RegistrationState::Failed(INTERRUPTED.to_string());
            true
        });
    }
}
