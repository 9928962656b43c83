use crate::adapters::http::dto::{
    DataRequest, Envelope, FolderEntry, GroupQuery, GroupRef, MemberRef, MembersEntry,
    PagedRequest, TokenResponse,
};
use crate::adapters::http::{log_failure, ApiClient};
use crate::core::batch::RATE_LIMIT_RESET_HEADER;
use crate::domain::model::{BearerToken, Domain, DomainSet, GroupId};
use crate::utils::error::{Result, SyncError};
use reqwest::StatusCode;

const TOKEN_PATH: &str = "/oauth/token";
const FIND_GROUPS_PATH: &str = "/api/directory/find-groups";
const GROUP_MEMBERS_PATH: &str = "/api/directory/get-group-members";
const REMOVE_MEMBER_PATH: &str = "/api/directory/remove-group-member";
const ADD_MEMBER_PATH: &str = "/api/directory/add-group-member";

const GROUP_SEARCH_PAGE_SIZE: usize = 25;
const DEFAULT_MEMBER_PAGE_SIZE: usize = 100;

/// 單一批次送出後的結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Accepted,
    RateLimited { reset: Option<String> },
}

/// 目錄服務 REST API 的各個呼叫，每個方法只發出必要的請求，不做重試
pub struct DirectoryApi {
    api: ApiClient,
    member_page_size: usize,
    group_source: String,
}

impl DirectoryApi {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            member_page_size: DEFAULT_MEMBER_PAGE_SIZE,
            group_source: "cloud".to_string(),
        }
    }

    pub fn with_member_page_size(mut self, page_size: usize) -> Self {
        self.member_page_size = page_size;
        self
    }

    pub fn with_group_source(mut self, source: impl Into<String>) -> Self {
        self.group_source = source.into();
        self
    }

    /// client credentials 換取 bearer token
    #[tracing::instrument(name = "authenticate", skip_all)]
    pub async fn authenticate(&self, client_id: &str, client_secret: &str) -> Result<BearerToken> {
        let response = self
            .api
            .client()
            .post(self.api.endpoint(TOKEN_PATH))
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;
        tracing::debug!("Status code: {}", response.status());

        if !response.status().is_success() {
            let (status, body) = log_failure(response, "Token exchange failed").await;
            return Err(SyncError::Auth { status, body });
        }

        let token: TokenResponse = response.json().await?;
        tracing::info!("Successfully obtained token");
        Ok(BearerToken::new(token.access_token))
    }

    /// 只採用第一筆搜尋結果的第一個 folder
    #[tracing::instrument(name = "find_group", skip(self, token))]
    pub async fn find_group(&self, token: &BearerToken, query: &str) -> Result<GroupId> {
        let body = PagedRequest::new(
            GROUP_SEARCH_PAGE_SIZE,
            "",
            GroupQuery {
                query,
                source: &self.group_source,
            },
        );

        let response = self
            .api
            .client()
            .post(self.api.endpoint(FIND_GROUPS_PATH))
            .bearer_auth(token.expose())
            .json(&body)
            .send()
            .await?;
        tracing::debug!("Status code: {}", response.status());

        if !response.status().is_success() {
            let (status, body) = log_failure(response, "Group lookup failed").await;
            return Err(SyncError::Fetch {
                resource: "group",
                status,
                body,
            });
        }

        let envelope: Envelope<FolderEntry> = response.json().await?;
        // 只看第一筆結果
        let folders = envelope
            .data
            .into_iter()
            .next()
            .map(|entry| entry.folders)
            .unwrap_or_default();

        for folder in &folders {
            tracing::debug!(
                "Found group {} ({})",
                folder.id,
                folder.description.as_deref().unwrap_or("-")
            );
        }
        if folders.len() > 1 {
            tracing::warn!(
                "Query '{}' matched {} groups, using the first one",
                query,
                folders.len()
            );
        }

        let folder = folders
            .into_iter()
            .next()
            .ok_or_else(|| SyncError::GroupNotFound {
                query: query.to_string(),
            })?;
        tracing::debug!("Successfully obtained group ID {}", folder.id);
        Ok(GroupId::new(folder.id))
    }

    /// 逐頁讀取群組成員直到回應不再帶有 next
    #[tracing::instrument(name = "list_members", skip(self, token), fields(group = %group_id))]
    pub async fn list_members(&self, token: &BearerToken, group_id: &GroupId) -> Result<DomainSet> {
        let mut domains = DomainSet::new();
        let mut page_token = String::new();
        let mut page = 1usize;

        loop {
            let body = PagedRequest::new(
                self.member_page_size,
                page_token.as_str(),
                GroupRef {
                    id: group_id.as_str(),
                },
            );

            let response = self
                .api
                .client()
                .post(self.api.endpoint(GROUP_MEMBERS_PATH))
                .bearer_auth(token.expose())
                .json(&body)
                .send()
                .await?;
            tracing::debug!("Status code: {}", response.status());

            if !response.status().is_success() {
                let (status, body) = log_failure(response, "Error getting group members").await;
                return Err(SyncError::Fetch {
                    resource: "group members",
                    status,
                    body,
                });
            }

            tracing::debug!("Page: {}", page);
            let envelope: Envelope<MembersEntry> = response.json().await?;
            let next = envelope.next_page_token().map(str::to_string);

            for member in envelope.data.into_iter().flat_map(|entry| entry.group_members) {
                match member.domain {
                    Some(domain) => {
                        tracing::debug!("Added: {}", domain);
                        domains.insert(Domain::new(domain));
                    }
                    None => tracing::debug!(
                        "Skipping member without domain: {}",
                        member.email_address.as_deref().unwrap_or("<unknown>")
                    ),
                }
            }

            match next {
                Some(next) => {
                    page_token = next;
                    page += 1;
                }
                None => break,
            }
        }

        tracing::info!("Group holds {} domains across {} pages", domains.len(), page);
        Ok(domains)
    }

    pub async fn remove_member(
        &self,
        token: &BearerToken,
        group_id: &GroupId,
        domain: &Domain,
    ) -> Result<()> {
        let body = DataRequest {
            data: vec![MemberRef {
                id: group_id.as_str(),
                domain: domain.as_str(),
            }],
        };

        let response = self
            .api
            .client()
            .post(self.api.endpoint(REMOVE_MEMBER_PATH))
            .bearer_auth(token.expose())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, body) = log_failure(response, "Removing domain failed").await;
            return Err(SyncError::Mutation {
                action: "remove",
                domain: domain.to_string(),
                status,
                body,
            });
        }

        tracing::debug!("Successfully removed {}", domain);
        Ok(())
    }

    /// 送出一個 add 批次；429 交由呼叫端決定如何等待
    pub async fn submit_batch(
        &self,
        token: &BearerToken,
        group_id: &GroupId,
        batch: &[Domain],
    ) -> Result<BatchOutcome> {
        let body = DataRequest {
            data: batch
                .iter()
                .map(|domain| MemberRef {
                    id: group_id.as_str(),
                    domain: domain.as_str(),
                })
                .collect(),
        };

        let response = self
            .api
            .client()
            .post(self.api.endpoint(ADD_MEMBER_PATH))
            .bearer_auth(token.expose())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(BatchOutcome::Accepted);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let reset = response
                .headers()
                .get(RATE_LIMIT_RESET_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            tracing::debug!("Rate limit response headers: {:?}", response.headers());
            return Ok(BatchOutcome::RateLimited { reset });
        }

        let (status, body) = log_failure(response, "Adding domains failed").await;
        Err(SyncError::Mutation {
            action: "add",
            domain: describe_batch(batch),
            status,
            body,
        })
    }
}

fn describe_batch(batch: &[Domain]) -> String {
    match (batch.first(), batch.last()) {
        (Some(first), Some(last)) if batch.len() > 1 => {
            format!("batch of {} domains ({} .. {})", batch.len(), first, last)
        }
        (Some(only), _) => only.to_string(),
        _ => "empty batch".to_string(),
    }
}
