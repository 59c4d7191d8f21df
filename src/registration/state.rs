//! Registration lifecycle observed by the presentation shell

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum RegistrationState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed(String),
}

impl RegistrationState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, RegistrationState::Submitting)
    }
}

impl std::fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationState::Idle => write!(f, "idle"),
            RegistrationState::Submitting => write!(f, "submitting"),
            RegistrationState::Succeeded => write!(f, "succeeded"),
            RegistrationState::Failed(message) => write!(f, "failed: {}", message),
        }
    }
}
