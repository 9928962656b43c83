pub mod authority;
pub mod directory;
pub mod dto;

use crate::utils::error::Result;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

pub fn build_http_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!("domainbook-sync/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// API 根網址 + 共用的 HTTP client
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// 讀出失敗回應的狀態碼與內容並寫入日誌
pub(crate) async fn log_failure(response: Response, context: &str) -> (StatusCode, String) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::error!("{}: status code {}", context, status);
    tracing::error!("{}", body);
    (status, body)
}
