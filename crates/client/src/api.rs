//! REST API client for the portal backend.
//!
//! Wraps the backend HTTP API (application CRUD, attachments, review state,
//! OIDC userinfo) using [`reqwest`]. This layer reports raw HTTP outcomes;
//! mapping them to user-visible dispositions happens in
//! [`error`](crate::error) and [`sync`](crate::sync).

use serde::de::DeserializeOwned;

use hakemus_core::application::Application;
use hakemus_core::review::ReviewState;
use hakemus_core::types::{ApplicationId, AttachmentId};

use crate::config::ClientConfig;

/// HTTP client for one backend instance.
#[derive(Clone)]
pub struct PortalApi {
    client: reqwest::Client,
    base_url: String,
}

/// Errors from the REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl ApiError {
    /// The HTTP status, when the failure carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

impl PortalApi {
    /// Build a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    /// Build an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// `GET /v1/applications/{id}/`
    pub async fn get_application(&self, id: ApplicationId) -> Result<Application, ApiError> {
        let response = self
            .client
            .get(format!("{}/v1/applications/{id}/", self.base_url))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `GET /v1/applications/` filtered to the statuses an applicant may
    /// still edit. Used by fetch-or-create to find an existing draft.
    pub async fn list_editable_applications(&self) -> Result<Vec<Application>, ApiError> {
        let response = self
            .client
            .get(format!("{}/v1/applications/", self.base_url))
            .query(&[("status", "draft,additional_information_needed")])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `POST /v1/applications/` — create a new draft.
    pub async fn create_application(&self) -> Result<Application, ApiError> {
        let response = self
            .client
            .post(format!("{}/v1/applications/", self.base_url))
            .json(&Application::new_draft())
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `PUT /v1/applications/{id}/` — full replacement of the resource.
    pub async fn update_application(
        &self,
        id: ApplicationId,
        application: &Application,
    ) -> Result<Application, ApiError> {
        let response = self
            .client
            .put(format!("{}/v1/applications/{id}/", self.base_url))
            .json(application)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `DELETE /v1/applications/{id}/attachments/{attachment_id}/`
    pub async fn delete_attachment(
        &self,
        application_id: ApplicationId,
        attachment_id: AttachmentId,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(format!(
                "{}/v1/applications/{application_id}/attachments/{attachment_id}/",
                self.base_url
            ))
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// `GET /v1/applications/{id}/review/`
    pub async fn get_review(&self, id: ApplicationId) -> Result<ReviewState, ApiError> {
        let response = self
            .client
            .get(format!("{}/v1/applications/{id}/review/", self.base_url))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `PUT /v1/applications/{id}/review/` — the full flag set; the backend
    /// treats the review resource as one document.
    pub async fn update_review(
        &self,
        id: ApplicationId,
        review: &ReviewState,
    ) -> Result<ReviewState, ApiError> {
        let response = self
            .client
            .put(format!("{}/v1/applications/{id}/review/", self.base_url))
            .json(review)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `GET /oidc/userinfo/` — the sole authentication signal.
    ///
    /// A 2xx response with the user payload means authenticated; any error
    /// response means not authenticated.
    pub async fn userinfo(&self) -> Result<serde_json::Value, ApiError> {
        let response = self
            .client
            .get(format!("{}/oidc/userinfo/", self.base_url))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or an [`ApiError::Status`] containing the
    /// status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_accessor_reads_status_variant() {
        let err = ApiError::Status {
            status: 403,
            body: "forbidden".to_string(),
        };
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn base_url_is_kept_verbatim() {
        let api = PortalApi::with_client(reqwest::Client::new(), "http://backend:8000".into());
        assert_eq!(api.base_url, "http://backend:8000");
    }
}
