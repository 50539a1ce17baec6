//! JSON-over-HTTP experiment platform
//!
//! Routes, relative to the configured base URL:
//! - `POST /api/auth/login` with `{email, password}`, answers `{token}`
//! - `POST /api/experiments` with the create parameters
//! - `GET /api/experiments/{id}/metrics`
//! - `GET /api/experiments`
//! - `POST /api/auth/logout`

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use super::http_client::HttpClientTrait;
use crate::domain::experiment::ExperimentMetrics;
use crate::domain::platform::{
    CreateExperimentParams, ExperimentMetadata, ExperimentPlatform, ExperimentSummary,
    PlatformConnector,
};
use crate::domain::DomainError;

/// Seller account used to sign in
#[derive(Clone, Default)]
pub struct PlatformCredentials {
    pub email: String,
    pub password: String,
}

impl PlatformCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(DomainError::credential(
                "Platform email and password must be configured",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for PlatformCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformCredentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Opens HTTP sessions against the platform API
#[derive(Debug, Clone)]
pub struct HttpPlatformConnector {
    client: Arc<dyn HttpClientTrait>,
    base_url: String,
    credentials: PlatformCredentials,
}

impl HttpPlatformConnector {
    pub fn new(
        client: Arc<dyn HttpClientTrait>,
        base_url: impl Into<String>,
        credentials: PlatformCredentials,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }
}

#[async_trait]
impl PlatformConnector for HttpPlatformConnector {
    async fn connect(&self) -> Result<Arc<dyn ExperimentPlatform>, DomainError> {
        debug!(base_url = %self.base_url, "Opening platform session");

        Ok(Arc::new(HttpPlatformSession {
            client: Arc::clone(&self.client),
            base_url: self.base_url.clone(),
            credentials: self.credentials.clone(),
            token: RwLock::new(None),
        }))
    }
}

/// One authenticated conversation with the platform API
#[derive(Debug)]
pub struct HttpPlatformSession {
    client: Arc<dyn HttpClientTrait>,
    base_url: String,
    credentials: PlatformCredentials,
    token: RwLock<Option<String>>,
}

impl HttpPlatformSession {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self, operation: &str) -> Result<String, DomainError> {
        let token = self
            .token
            .read()
            .map_err(|e| DomainError::internal(format!("Session lock poisoned: {}", e)))?;

        token
            .as_ref()
            .map(|t| format!("Bearer {}", t))
            .ok_or_else(|| DomainError::platform(operation, "Session is not logged in"))
    }

    fn set_token(&self, token: Option<String>) -> Result<(), DomainError> {
        *self
            .token
            .write()
            .map_err(|e| DomainError::internal(format!("Session lock poisoned: {}", e)))? = token;
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, operation: &str, path: &str) -> Result<T, DomainError> {
        let bearer = self.bearer(operation)?;
        let value = self
            .client
            .get_json(&self.url(path), vec![("Authorization", bearer.as_str())])
            .await
            .map_err(|e| relabel(operation, e))?;

        parse(operation, value)
    }
}

#[async_trait]
impl ExperimentPlatform for HttpPlatformSession {
    async fn login(&self) -> Result<(), DomainError> {
        self.credentials.check()?;

        let body = json!({
            "email": self.credentials.email,
            "password": self.credentials.password,
        });

        let response = self
            .client
            .post_json(&self.url("/api/auth/login"), vec![], &body)
            .await
            .map_err(|e| relabel("login", e))?;

        let token = response
            .get("token")
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DomainError::credential("Login response did not include a token"))?;

        self.set_token(Some(token.to_string()))?;
        info!(email = %self.credentials.email, "Logged in to experiment platform");
        Ok(())
    }

    async fn create_experiment(
        &self,
        params: &CreateExperimentParams,
    ) -> Result<ExperimentMetadata, DomainError> {
        let bearer = self.bearer("create_experiment")?;
        let body = serde_json::to_value(params)
            .map_err(|e| DomainError::internal(format!("Failed to encode request: {}", e)))?;

        let response = self
            .client
            .post_json(
                &self.url("/api/experiments"),
                vec![("Authorization", bearer.as_str())],
                &body,
            )
            .await
            .map_err(|e| relabel("create_experiment", e))?;

        if response.is_null() {
            return Ok(ExperimentMetadata::default());
        }

        parse("create_experiment", response)
    }

    async fn fetch_metrics(&self, experiment_id: &str) -> Result<ExperimentMetrics, DomainError> {
        self.get(
            "fetch_metrics",
            &format!("/api/experiments/{}/metrics", experiment_id),
        )
        .await
    }

    async fn list_experiments(&self) -> Result<Vec<ExperimentSummary>, DomainError> {
        self.get("list_experiments", "/api/experiments").await
    }

    async fn close(&self) -> Result<(), DomainError> {
        let Ok(bearer) = self.bearer("close") else {
            return Ok(());
        };

        self.set_token(None)?;
        self.client
            .post_json(
                &self.url("/api/auth/logout"),
                vec![("Authorization", bearer.as_str())],
                &json!({}),
            )
            .await
            .map_err(|e| relabel("close", e))?;

        debug!("Logged out of experiment platform");
        Ok(())
    }
}

/// Attach the session operation to errors coming from the HTTP layer
fn relabel(operation: &str, error: DomainError) -> DomainError {
    match error {
        DomainError::Platform { message, .. } => DomainError::platform(operation, message),
        other => other,
    }
}

fn parse<T: DeserializeOwned>(operation: &str, value: serde_json::Value) -> Result<T, DomainError> {
    serde_json::from_value(value)
        .map_err(|e| DomainError::platform(operation, format!("Unexpected response: {}", e)))
}
