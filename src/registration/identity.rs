//! Firebase Authentication REST adapter

use crate::registration::config::RegistrationConfig;
use crate::registration::error::ProviderError;
use crate::registration::ports::{Credential, IdentityProvider, UserId};
use crate::registration::transport::{HttpClient, JsonResponse};
use async_trait::async_trait;
use hyper::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
    id_token: Option<String>,
}

pub struct FirebaseIdentityProvider {
    client: HttpClient,
    endpoint: String,
    api_key: String,
}

impl FirebaseIdentityProvider {
    pub fn new(config: &RegistrationConfig) -> Self {
        Self {
            client: HttpClient::new(),
            endpoint: config.identity_endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn accounts_url(&self, action: &str) -> String {
        format!("{}/accounts:{}?key={}", self.endpoint, action, self.api_key)
    }
}

fn rejected(response: &JsonResponse) -> ProviderError {
    let (code, message) = response.error_parts();
    ProviderError::new(code, message)
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn create_credential(&self, email: &str, password: &str) -> Result<Credential, ProviderError> {
        let body = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        let response = self
            .client
            .send_json(Method::POST, &self.accounts_url("signUp"), None, &body)
            .await?;

        if !response.status.is_success() {
            let err = rejected(&response);
            warn!(code = %err.code, "Identity provider rejected sign-up: {}", err.message);
            return Err(err);
        }

        let payload: SignUpResponse = serde_json::from_value(response.body).map_err(|e| {
            ProviderError::new("malformed_response", format!("Unexpected sign-up response: {}", e))
        })?;

        info!(user_id = %payload.local_id, "Created account");
        Ok(Credential::new(UserId::new(payload.local_id), payload.id_token))
    }

    async fn delete_credential(&self, credential: &Credential) -> Result<(), ProviderError> {
        let id_token = credential.id_token().ok_or_else(|| {
            ProviderError::new("missing_token", "Credential carries no session token to delete with")
        })?;

        let response = self
            .client
            .send_json(
                Method::POST,
                &self.accounts_url("delete"),
                None,
                &json!({ "idToken": id_token }),
            )
            .await?;

        if !response.status.is_success() {
            return Err(rejected(&response));
        }

        info!(user_id = %credential.user_id(), "Deleted account");
        Ok(())
    }
}
