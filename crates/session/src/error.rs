//! Failures of the remote identity service and of credential persistence.
//!
//! None of these reach a lifecycle caller as an `Err`: the session store
//! folds them into state transitions or an [`AuthOutcome`](crate::AuthOutcome).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("login response did not include an access token")]
    MissingToken,

    #[error("identity response did not include a valid actor: {0}")]
    MalformedActor(String),

    #[error("no stored credential")]
    NoCredential,
}

impl ServiceError {
    /// Message suitable for an inline form error.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Api { message, .. } if !message.trim().is_empty() => message.clone(),
            ServiceError::Api { status: 401 | 403 | 422, .. } => {
                "Invalid username or password".to_string()
            }
            ServiceError::Api { status, .. } => format!("The server rejected the request ({status})"),
            ServiceError::Network(_) => "Could not reach the server".to_string(),
            ServiceError::Parse(_) | ServiceError::MissingToken | ServiceError::MalformedActor(_) => {
                "The server sent an unexpected response".to_string()
            }
            ServiceError::NoCredential => "You are not signed in".to_string(),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Parse(err.to_string())
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("token storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored token is not valid UTF-8")]
    Encoding,
}
