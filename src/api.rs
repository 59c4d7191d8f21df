//! HTTP shell for the sign-up flow

use crate::registration::{Field, RegistrationError, RegistrationForm, RegistrationOrchestrator, RegistrationState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<RegistrationOrchestrator>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignupResponse {
    pub success: bool,
    pub message: String,
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<Field, String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub service: String,
}

// Configure routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/signup", post(signup))
        .route("/signup/state", get(current_state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(StatusResponse {
        status: "ok".to_string(),
        service: "signup-flow".to_string(),
    })
}

async fn current_state(State(state): State<AppState>) -> Json<RegistrationState> {
    Json(state.orchestrator.state())
}

fn status_for(err: &RegistrationError) -> StatusCode {
    match err {
        RegistrationError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RegistrationError::AlreadySubmitting => StatusCode::CONFLICT,
        RegistrationError::Credential(_) | RegistrationError::Persistence { .. } => StatusCode::BAD_GATEWAY,
        RegistrationError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn signup(
    State(state): State<AppState>,
    Json(form): Json<RegistrationForm>,
) -> (StatusCode, Json<SignupResponse>) {
    info!("Sign-up request for email: {}", form.email.trim());

    // Detached: the submission runs to completion even if the client hangs up.
    let orchestrator = state.orchestrator.clone();
    let outcome = tokio::spawn(async move { orchestrator.submit(form).await }).await;

    match outcome {
        Ok(Ok(user_id)) => (
            StatusCode::CREATED,
            Json(SignupResponse {
                success: true,
                message: "Account created".to_string(),
                user_id: Some(user_id.to_string()),
                errors: BTreeMap::new(),
            }),
        ),
        Ok(Err(err)) => {
            let status = status_for(&err);
            let (message, errors) = match err {
                RegistrationError::Validation(rejection) => (rejection.message, rejection.errors),
                busy @ RegistrationError::AlreadySubmitting => (busy.to_string(), BTreeMap::new()),
                other => (other.failure_message(), BTreeMap::new()),
            };
            (
                status,
                Json(SignupResponse {
                    success: false,
                    message,
                    user_id: None,
                    errors,
                }),
            )
        }
        Err(join_error) => {
            error!("Sign-up task aborted: {}", join_error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SignupResponse {
                    success: false,
                    message: "Sign-up was interrupted".to_string(),
                    user_id: None,
                    errors: BTreeMap::new(),
                }),
            )
        }
    }
}
