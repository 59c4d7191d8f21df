//! Account registration: local form validation, credential creation with the
//! identity provider, then a profile write to the document store.

pub mod config;
pub mod document_store;
pub mod error;
pub mod form;
pub mod identity;
pub mod orchestrator;
pub mod ports;
pub mod profile;
pub mod state;
#[cfg(test)]
pub mod test_support;
pub mod transport;
pub mod validation;

pub use config::RegistrationConfig;
pub use document_store::FirestoreDocumentStore;
pub use error::{Compensation, ProviderError, RegistrationError, StoreError, TransportError};
pub use form::{Field, RegistrationForm};
pub use identity::FirebaseIdentityProvider;
pub use orchestrator::RegistrationOrchestrator;
pub use ports::{Ack, Credential, DocumentStore, IdentityProvider, UserId};
pub use profile::ProfileRecord;
pub use state::RegistrationState;
pub use validation::{FormValidationResult, ValidationRejection, ValidationResult};
