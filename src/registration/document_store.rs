//! Profile persistence through the Cloud Firestore REST API
//! Structure: {collection}/{user_id}

use crate::registration::config::RegistrationConfig;
use crate::registration::error::StoreError;
use crate::registration::ports::{Ack, Credential, DocumentStore};
use crate::registration::profile::ProfileRecord;
use crate::registration::transport::HttpClient;
use async_trait::async_trait;
use hyper::Method;
use tracing::{info, warn};

pub struct FirestoreDocumentStore {
    client: HttpClient,
    endpoint: String,
    project_id: String,
}

impl FirestoreDocumentStore {
    pub fn new(config: &RegistrationConfig) -> Self {
        Self {
            client: HttpClient::new(),
            endpoint: config.firestore_endpoint.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
        }
    }

    fn document_url(&self, document_path: &str) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.endpoint, self.project_id, document_path
        )
    }
}

#[async_trait]
impl DocumentStore for FirestoreDocumentStore {
    async fn write(
        &self,
        collection: &str,
        credential: &Credential,
        record: &ProfileRecord,
    ) -> Result<Ack, StoreError> {
        let document_path = format!("{}/{}", collection, credential.user_id());

        // PATCH without an update mask replaces the whole document.
        let response = self
            .client
            .send_json(
                Method::PATCH,
                &self.document_url(&document_path),
                credential.id_token(),
                &record.to_document(),
            )
            .await?;

        if !response.status.is_success() {
            let (code, message) = response.error_parts();
            warn!(code = %code, document = %document_path, "Profile write rejected: {}", message);
            return Err(StoreError::new(code, message));
        }

        info!(document = %document_path, "Stored profile");
        Ok(Ack { document_path })
    }
}
