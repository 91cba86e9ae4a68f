//! Remote identity service: login, "who am I", logout, heartbeat.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use backoffice_auth::Actor;

use crate::error::ServiceError;

/// The four calls the session core depends on.
///
/// Implementations report every failure as a [`ServiceError`]; the session
/// store decides what each failure means for the session.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Exchange credentials for an access token.
    async fn login(&self, handle: &str, secret: &str) -> Result<String, ServiceError>;

    /// Fetch the actor the token belongs to.
    async fn fetch_actor(&self, token: &str) -> Result<Actor, ServiceError>;

    async fn logout(&self, token: &str) -> Result<(), ServiceError>;

    async fn heartbeat(&self, token: &str) -> Result<(), ServiceError>;
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(alias = "token", default)]
    access_token: Option<String>,
}

/// HTTP client for the identity endpoints under `{api_url}/auth/`.
#[derive(Debug, Clone)]
pub struct HttpIdentityClient {
    api_url: String,
    http: reqwest::Client,
}

impl HttpIdentityClient {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn request(&self, method: reqwest::Method, endpoint: &str) -> reqwest::RequestBuilder {
        let request_id = Uuid::now_v7();
        let url = format!("{}/auth/{}", self.api_url, endpoint);
        tracing::debug!(%request_id, %method, %url, "identity request");
        self.http
            .request(method, url)
            .header("x-request-id", request_id.to_string())
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ServiceError> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ServiceError::Api {
            status: status.as_u16(),
            message: server_message(&body),
        })
    }
}

/// Prefer the `message` field of a JSON error body; fall back to the raw text.
fn server_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Accept the actor either at the top level or wrapped as `{"user": {...}}`.
pub(crate) fn actor_from_body(body: Value) -> Result<Actor, ServiceError> {
    let actor = match body {
        Value::Object(mut map) if map.get("user").is_some_and(Value::is_object) => {
            map.remove("user").unwrap_or(Value::Null)
        }
        Value::Object(map) => Value::Object(map),
        other => {
            return Err(ServiceError::MalformedActor(format!(
                "expected an object, got {other}"
            )));
        }
    };
    serde_json::from_value(actor).map_err(|e| ServiceError::MalformedActor(e.to_string()))
}

#[async_trait]
impl IdentityService for HttpIdentityClient {
    async fn login(&self, handle: &str, secret: &str) -> Result<String, ServiceError> {
        let req = self
            .request(reqwest::Method::POST, "login")
            .json(&LoginRequest {
                username: handle,
                password: secret,
            });
        let resp = self.send(req).await?;
        let body: LoginResponse = resp
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))?;
        match body.access_token {
            Some(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(ServiceError::MissingToken),
        }
    }

    async fn fetch_actor(&self, token: &str) -> Result<Actor, ServiceError> {
        let req = self.request(reqwest::Method::GET, "me").bearer_auth(token);
        let resp = self.send(req).await?;
        let body: Value = resp
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))?;
        actor_from_body(body)
    }

    async fn logout(&self, token: &str) -> Result<(), ServiceError> {
        let req = self.request(reqwest::Method::POST, "logout").bearer_auth(token);
        self.send(req).await.map(|_| ())
    }

    async fn heartbeat(&self, token: &str) -> Result<(), ServiceError> {
        let req = self
            .request(reqwest::Method::POST, "heartbeat")
            .bearer_auth(token);
        self.send(req).await.map(|_| ())
    }
}
