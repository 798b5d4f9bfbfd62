use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::dto::candidate_dto::{CreateCandidatePayload, MessageResponse, UpdateCandidatePayload};
use crate::error::ErrorResponse;
use crate::models::candidate::{Candidate, CandidateStatus};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid base URL: {0}")]
    BaseUrl(String),
}

impl ClientError {
    /// The message the server put in its `{ "error": ... }` body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// The candidate REST surface as seen from a client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandidateApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Candidate>, ClientError>;

    async fn get(&self, id: i32) -> Result<Candidate, ClientError>;

    async fn list_skills(&self) -> Result<Vec<String>, ClientError>;

    async fn create(&self, payload: &CreateCandidatePayload) -> Result<Candidate, ClientError>;

    async fn update(
        &self,
        id: i32,
        payload: &UpdateCandidatePayload,
    ) -> Result<Candidate, ClientError>;

    async fn update_status(
        &self,
        id: i32,
        status: CandidateStatus,
    ) -> Result<Candidate, ClientError>;

    async fn delete(&self, id: i32) -> Result<(), ClientError>;
}

#[derive(Clone)]
pub struct HttpCandidateApi {
    client: Client,
    base: Url,
}

impl HttpCandidateApi {
    /// `base_url` points at the API root, e.g. `http://localhost:5000/api`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ClientError> {
        let mut raw = base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base = Url::parse(&raw).map_err(|e| ClientError::BaseUrl(format!("{}: {}", base_url, e)))?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path)
            .map_err(|e| ClientError::BaseUrl(e.to_string()))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    };
    debug!(status = status.as_u16(), message = %message, "API request rejected");
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl CandidateApi for HttpCandidateApi {
    async fn list(&self) -> Result<Vec<Candidate>, ClientError> {
        let response = self.client.get(self.url("candidates")?).send().await?;
        decode(response).await
    }

    async fn get(&self, id: i32) -> Result<Candidate, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("candidates/{}", id))?)
            .send()
            .await?;
        decode(response).await
    }

    async fn list_skills(&self) -> Result<Vec<String>, ClientError> {
        let response = self
            .client
            .get(self.url("candidates/all-skills")?)
            .send()
            .await?;
        decode(response).await
    }

    async fn create(&self, payload: &CreateCandidatePayload) -> Result<Candidate, ClientError> {
        let response = self
            .client
            .post(self.url("candidates")?)
            .json(payload)
            .send()
            .await?;
        decode(response).await
    }

    async fn update(
        &self,
        id: i32,
        payload: &UpdateCandidatePayload,
    ) -> Result<Candidate, ClientError> {
        let response = self
            .client
            .put(self.url(&format!("candidates/{}", id))?)
            .json(payload)
            .send()
            .await?;
        decode(response).await
    }

    async fn update_status(
        &self,
        id: i32,
        status: CandidateStatus,
    ) -> Result<Candidate, ClientError> {
        let response = self
            .client
            .patch(self.url(&format!("candidates/{}/status", id))?)
            .json(&json!({ "status": status }))
            .send()
            .await?;
        decode(response).await
    }

    async fn delete(&self, id: i32) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("candidates/{}", id))?)
            .send()
            .await?;
        decode::<MessageResponse>(response).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_a_trailing_slash() {
        let api = HttpCandidateApi::new("http://localhost:5000/api").unwrap();
        assert_eq!(api.base_url().as_str(), "http://localhost:5000/api/");
        assert_eq!(
            api.url("candidates/3/status").unwrap().as_str(),
            "http://localhost:5000/api/candidates/3/status"
        );
    }

    #[test]
    fn malformed_base_url_is_rejected() {
        assert!(matches!(
            HttpCandidateApi::new("not a url"),
            Err(ClientError::BaseUrl(_))
        ));
    }

    #[test]
    fn only_api_errors_carry_a_server_message() {
        let err = ClientError::Api {
            status: 400,
            message: "Email already exists".into(),
        };
        assert_eq!(err.server_message(), Some("Email already exists"));
        assert_eq!(ClientError::BaseUrl("x".into()).server_message(), None);
    }
}
