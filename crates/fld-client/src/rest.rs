//! reqwest-backed implementation of [`FieldService`].

use std::time::Duration;

use async_trait::async_trait;
use fld_config::ServiceConfig;
use fld_core::entities::{ChecklistQuestion, PendingInstallationRecord};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::http::{decode, screen_response};
use crate::service::FieldService;
use crate::types::{BulkInstallRequest, BulkInstallResponse, CustomerPage, SerialCandidate};

#[derive(Deserialize)]
struct CandidateList {
    items: Vec<SerialCandidate>,
}

#[derive(Deserialize)]
struct ComplianceResponse {
    regulated: bool,
}

#[derive(Deserialize)]
struct ChecklistSchema {
    questions: Vec<ChecklistQuestion>,
}

#[derive(Serialize)]
struct OtpRequest<'a> {
    address: &'a str,
}

#[derive(Serialize)]
struct OtpVerifyRequest<'a> {
    address: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
struct OtpVerifyResponse {
    verified: bool,
}

/// HTTP client for the field-service REST API.
pub struct HttpFieldService {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl HttpFieldService {
    /// Build a client from the `service` config section.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConfigured`] when `base_url` is empty, or
    /// [`ClientError::Http`] if the underlying `reqwest::Client` fails to build.
    pub fn new(config: &ServiceConfig) -> Result<Self, ClientError> {
        if !config.is_configured() {
            return Err(ClientError::NotConfigured);
        }
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            api_token: config.api_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_token.is_empty() {
            req
        } else {
            req.bearer_auth(&self.api_token)
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        screen_response(self.authorize(req).send().await?).await
    }
}

#[async_trait]
impl FieldService for HttpFieldService {
    async fn lookup_serials(
        &self,
        query: &str,
        scope: &str,
        limit: usize,
    ) -> Result<Vec<SerialCandidate>, ClientError> {
        let url = self.url(&format!(
            "/equipment/pending?q={}&scope={}&limit={limit}",
            urlencoding::encode(query),
            urlencoding::encode(scope),
        ));
        let resp = self.send(self.http.get(&url)).await?;
        let list: CandidateList = decode(resp, "serial lookup").await?;
        Ok(list.items)
    }

    async fn fetch_pending_record(
        &self,
        serial: &str,
    ) -> Result<PendingInstallationRecord, ClientError> {
        let url = self.url(&format!("/equipment/pending/{}", urlencoding::encode(serial)));
        let resp = self.send(self.http.get(&url)).await?;
        decode(resp, "pending record").await
    }

    async fn check_compliance(&self, material_code: &str) -> Result<bool, ClientError> {
        let url = self.url(&format!("/compliance/{}", urlencoding::encode(material_code)));
        let resp = self.send(self.http.get(&url)).await?;
        let data: ComplianceResponse = decode(resp, "compliance").await?;
        Ok(data.regulated)
    }

    async fn fetch_checklist(
        &self,
        material_code: &str,
    ) -> Result<Vec<ChecklistQuestion>, ClientError> {
        let url = self.url(&format!("/checklists/{}", urlencoding::encode(material_code)));
        let resp = self.send(self.http.get(&url)).await?;
        let schema: ChecklistSchema = decode(resp, "checklist schema").await?;
        Ok(schema.questions)
    }

    async fn request_otp(&self, address: &str) -> Result<(), ClientError> {
        let url = self.url("/otp/request");
        self.send(self.http.post(&url).json(&OtpRequest { address }))
            .await?;
        Ok(())
    }

    async fn verify_otp(&self, address: &str, code: &str) -> Result<bool, ClientError> {
        let url = self.url("/otp/verify");
        let resp = self
            .send(self.http.post(&url).json(&OtpVerifyRequest { address, code }))
            .await?;
        let data: OtpVerifyResponse = decode(resp, "otp verify").await?;
        Ok(data.verified)
    }

    async fn bulk_create(
        &self,
        request: &BulkInstallRequest,
    ) -> Result<BulkInstallResponse, ClientError> {
        let url = self.url("/installations/bulk");
        let resp = self.send(self.http.post(&url).json(request)).await?;
        decode(resp, "bulk create").await
    }

    async fn retire_pending(&self, serial: &str) -> Result<(), ClientError> {
        let url = self.url(&format!("/equipment/pending/{}", urlencoding::encode(serial)));
        self.send(self.http.delete(&url)).await?;
        Ok(())
    }

    async fn search_customers(
        &self,
        query: &str,
        page: usize,
        page_size: usize,
    ) -> Result<CustomerPage, ClientError> {
        let url = self.url(&format!(
            "/customers?q={}&page={page}&page_size={page_size}",
            urlencoding::encode(query),
        ));
        let resp = self.send(self.http.get(&url)).await?;
        decode(resp, "customer search").await
    }
}
