use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AuthIdentity, AuthProviderError, BaseAuthProvider};
use crate::common::Email;

/// Client for the hosted identity REST API (email/password accounts)
pub struct IdentityToolkitClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

/// Sign-up and sign-in share one request shape
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl IdentityToolkitClient {
    pub fn new(api_key: String, base_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn password_call(
        &self,
        endpoint: &str,
        email: &Email,
        password: &str,
    ) -> Result<AuthIdentity, AuthProviderError> {
        let url = format!("{}/accounts:{}", self.base_url, endpoint);
        let request = PasswordRequest {
            email: email.as_str(),
            password,
            return_secure_token: true,
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .context("Failed to reach identity provider")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            debug!(%status, endpoint, "Identity provider rejected request");
            return Err(map_provider_error(&body)
                .unwrap_or_else(|| anyhow::anyhow!("Identity API error {}: {}", status, body).into()));
        }

        let body: PasswordResponse = response
            .json()
            .await
            .context("Failed to parse identity provider response")?;

        let email = Email::parse(&body.email)
            .map_err(|e| anyhow::anyhow!("Provider returned unusable email: {}", e))?;

        Ok(AuthIdentity {
            email,
            provider_uid: body.local_id,
        })
    }
}

/// Translate the provider's error codes into typed errors.
///
/// Returns `None` when the body is not a recognizable error envelope.
fn map_provider_error(body: &str) -> Option<AuthProviderError> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    let message = envelope.error.message;

    // Codes look like "WEAK_PASSWORD : Password should be at least 6 characters"
    let (code, detail) = match message.split_once(':') {
        Some((code, detail)) => (code.trim(), detail.trim()),
        None => (message.trim(), ""),
    };

    let error = match code {
        "EMAIL_EXISTS" => AuthProviderError::EmailExists,
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
            AuthProviderError::InvalidCredentials
        }
        "WEAK_PASSWORD" => AuthProviderError::WeakPassword(if detail.is_empty() {
            "password is too weak".to_string()
        } else {
            detail.to_string()
        }),
        other => AuthProviderError::Other(anyhow::anyhow!("Identity provider error: {}", other)),
    };
    Some(error)
}

#[async_trait]
impl BaseAuthProvider for IdentityToolkitClient {
    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<AuthIdentity, AuthProviderError> {
        self.password_call("signUp", email, password).await
    }

    async fn sign_in(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<AuthIdentity, AuthProviderError> {
        self.password_call("signInWithPassword", email, password).await
    }
}
