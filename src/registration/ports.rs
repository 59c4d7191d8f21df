//! Capabilities the orchestrator consumes: credential creation and profile
//! persistence. Concrete adapters live in `identity` and `document_store`.

use crate::registration::error::{ProviderError, StoreError};
use crate::registration::profile::ProfileRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account identifier issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A freshly created account. Lives only for one registration attempt and is
/// never stored locally.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    user_id: UserId,
    id_token: Option<String>,
}

impl Credential {
    pub fn new(user_id: UserId, id_token: Option<String>) -> Self {
        Self { user_id, id_token }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Session token the document store authenticates the write with.
    pub fn id_token(&self) -> Option<&str> {
        self.id_token.as_deref()
    }

    pub fn into_user_id(self) -> UserId {
        self.user_id
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("user_id", &self.user_id)
            .field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Acknowledgement of a document write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub document_path: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account for `email`/`password`. Provider-side rejections
    /// (weak password, address in use, malformed address) come back as
    /// [`ProviderError`].
    async fn create_credential(&self, email: &str, password: &str) -> Result<Credential, ProviderError>;

    /// Remove an account created by [`IdentityProvider::create_credential`].
    async fn delete_credential(&self, credential: &Credential) -> Result<(), ProviderError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Write `record` to `collection`, keyed by the credential's user id.
    /// Overwrites any existing document with that id.
    async fn write(
        &self,
        collection: &str,
        credential: &Credential,
        record: &ProfileRecord,
    ) -> Result<Ack, StoreError>;
}
