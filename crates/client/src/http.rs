//! `reqwest` implementation of [`MatrixApi`].

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use inmoadmin_auth::Credential;
use inmoadmin_core::{ModuleId, TemplateId};
use inmoadmin_permissions::{
    GrantEntry, MatrixResponse, PermissionGrant, PropagateResponse, TemplateList, TemplateSummary,
};

use crate::api::MatrixApi;
use crate::config::ClientConfig;
use crate::error::ClientError;

/// Error body returned by the catalog API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
    message: String,
}

#[derive(Debug, Clone)]
pub struct HttpMatrixApi {
    api_url: String,
    client: reqwest::Client,
}

impl HttpMatrixApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            api_url: config.api_url.clone(),
            client,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn execute(&self, req: RequestBuilder, credential: &Credential) -> Result<Response, ClientError> {
        let resp = req
            .bearer_auth(credential.token())
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorBody>(&text) {
            Ok(body) => format!("{}: {}", body.error, body.message),
            Err(_) if text.is_empty() => "request failed".to_string(),
            Err(_) => text,
        };
        Err(ClientError::Api(status, message))
    }

    async fn json<T: DeserializeOwned>(&self, req: RequestBuilder, credential: &Credential) -> Result<T, ClientError> {
        let resp = self.execute(req, credential).await?;
        resp.json::<T>()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }
}

#[async_trait]
impl MatrixApi for HttpMatrixApi {
    async fn list_templates(&self, credential: &Credential) -> Result<Vec<TemplateSummary>, ClientError> {
        let req = self.client.get(self.url("/templates"));
        let list: TemplateList = self.json(req, credential).await?;
        Ok(list.templates)
    }

    async fn load_matrix(
        &self,
        credential: &Credential,
        template_id: TemplateId,
    ) -> Result<MatrixResponse, ClientError> {
        let req = self
            .client
            .get(self.url(&format!("/templates/{template_id}/matrix")));
        self.json(req, credential).await
    }

    async fn save_matrix(
        &self,
        credential: &Credential,
        template_id: TemplateId,
        entries: &[GrantEntry],
    ) -> Result<(), ClientError> {
        let req = self
            .client
            .put(self.url(&format!("/templates/{template_id}/modulos")))
            .json(entries);
        self.execute(req, credential).await?;
        Ok(())
    }

    async fn propagate_module(
        &self,
        credential: &Credential,
        template_id: TemplateId,
        module_id: ModuleId,
        grant: &PermissionGrant,
    ) -> Result<PropagateResponse, ClientError> {
        let req = self
            .client
            .post(self.url(&format!(
                "/templates/{template_id}/modulos/{module_id}/propagate"
            )))
            .json(grant);
        self.json(req, credential).await
    }
}
