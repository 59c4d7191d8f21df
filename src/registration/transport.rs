//! JSON-over-HTTPS client shared by the identity and document store adapters

use crate::registration::error::TransportError;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{header, Method, Request, StatusCode};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde_json::Value;
use tracing::{debug, warn};

type HttpsClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

#[derive(Clone)]
pub struct HttpClient {
    inner: HttpsClient,
}

#[derive(Debug, Clone)]
pub struct JsonResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl JsonResponse {
    /// `(code, message)` from a Google-style `{"error": {...}}` body. Falls
    /// back to the HTTP status when the body carries no usable detail.
    pub fn error_parts(&self) -> (String, String) {
        let error = &self.body["error"];
        let code = error["status"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| self.status.as_u16().to_string());
        let message = error["message"]
            .as_str()
            .or_else(|| self.body.as_str())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                self.status
                    .canonical_reason()
                    .unwrap_or("Unexpected response")
                    .to_string()
            });
        (code, message)
    }
}

impl HttpClient {
    pub fn new() -> Self {
        let _ = rustls::crypto::ring::default_provider().install_default();

        let builder = match hyper_rustls::HttpsConnectorBuilder::new().with_native_roots() {
            Ok(builder) => builder,
            Err(e) => {
                warn!("Native root certificates unavailable ({}), using bundled roots", e);
                hyper_rustls::HttpsConnectorBuilder::new().with_webpki_roots()
            }
        };

        // Plain HTTP stays allowed so local emulators work.
        let connector = builder.https_or_http().enable_http1().enable_http2().build();

        Self {
            inner: Client::builder(TokioExecutor::new()).build(connector),
        }
    }

    pub async fn send_json(
        &self,
        method: Method,
        url: &str,
        bearer: Option<&str>,
        body: &Value,
    ) -> Result<JsonResponse, TransportError> {
        let payload = serde_json::to_vec(body)?;

        let mut builder = Request::builder()
            .method(method.clone())
            .uri(url)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = builder
            .body(Full::new(Bytes::from(payload)))
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let response = self
            .inner
            .request(request)
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?
            .to_bytes();

        debug!("{} {} -> {}", method, strip_query(url), status);

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        Ok(JsonResponse { status, body })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

// Query strings carry the API key; keep it out of logs.
fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_parts_prefer_status_name() {
        let response = JsonResponse {
            status: StatusCode::FORBIDDEN,
            body: json!({ "error": { "code": 403, "message": "Missing or insufficient permissions.", "status": "PERMISSION_DENIED" } }),
        };
        assert_eq!(
            response.error_parts(),
            ("PERMISSION_DENIED".to_string(), "Missing or insufficient permissions.".to_string())
        );
    }

    #[test]
    fn error_parts_fall_back_to_http_status() {
        let auth_style = JsonResponse {
            status: StatusCode::BAD_REQUEST,
            body: json!({ "error": { "code": 400, "message": "EMAIL_EXISTS" } }),
        };
        assert_eq!(auth_style.error_parts(), ("400".to_string(), "EMAIL_EXISTS".to_string()));

        let empty = JsonResponse {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: Value::Null,
        };
        assert_eq!(empty.error_parts(), ("503".to_string(), "Service Unavailable".to_string()));
    }

    #[test]
    fn strip_query_hides_api_key() {
        assert_eq!(strip_query("http://x/v1/accounts:signUp?key=secret"), "http://x/v1/accounts:signUp");
        assert_eq!(strip_query("http://x/v1/doc"), "http://x/v1/doc");
    }
}
