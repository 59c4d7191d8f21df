//! Account sign-up: local form validation, credential creation with an
//! identity provider, and profile persistence in a document store.

pub mod api;
pub mod registration;
