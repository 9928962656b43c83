use crate::adapters::http::log_failure;
use crate::domain::model::{domains_from_whitespace, DomainSet};
use crate::utils::error::{Result, SyncError};
use regex::Regex;
use reqwest::Client;

/// 下載並解析權威網域清單 (domainbook)
pub struct AuthorityFetcher {
    client: Client,
    comment: Regex,
}

impl AuthorityFetcher {
    pub fn new(client: Client, comment_marker: &str) -> Result<Self> {
        // 從註解標記開始到行尾一律移除
        let comment = Regex::new(&format!("(?m){}.*$", regex::escape(comment_marker)))
            .map_err(|e| SyncError::Config {
                message: format!("invalid comment marker '{}': {}", comment_marker, e),
            })?;
        Ok(Self { client, comment })
    }

    #[tracing::instrument(name = "authority", skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<DomainSet> {
        let response = self.client.get(url).send().await?;
        tracing::debug!("Status code: {}", response.status());

        if !response.status().is_success() {
            let (status, body) = log_failure(response, "Fetching domain list failed").await;
            return Err(SyncError::Fetch {
                resource: "authoritative domain list",
                status,
                body,
            });
        }

        let text = response.text().await?;
        tracing::info!("Successfully obtained domain list");
        tracing::debug!("{}", text);

        Ok(self.parse(&text))
    }

    pub fn parse(&self, text: &str) -> DomainSet {
        let stripped = self.comment.replace_all(text, "");
        domains_from_whitespace(&stripped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Domain;
    use httpmock::prelude::*;

    fn fetcher() -> AuthorityFetcher {
        AuthorityFetcher::new(Client::new(), "###").unwrap()
    }

    #[test]
    fn test_parse_strips_comment_lines() {
        let text = "### Domainbook export\n### generated nightly\na.com\nb.com c.com\n\n### trailing";
        let set = fetcher().parse(text);

        let expected: DomainSet = ["a.com", "b.com", "c.com"].into_iter().map(Domain::from).collect();
        assert_eq!(set, expected);
    }

    #[test]
    fn test_parse_strips_trailing_comment_on_line() {
        let set = fetcher().parse("a.com ### moved in 2020\r\nb.com\n");
        assert_eq!(set.len(), 2);
        assert!(set.contains(&Domain::from("a.com")));
        assert!(!set.iter().any(|d| d.as_str().contains("moved")));
    }

    #[test]
    fn test_custom_marker_is_escaped() {
        let fetcher = AuthorityFetcher::new(Client::new(), "#.").unwrap();
        let set = fetcher.parse("#. comment\na.com\n#x.com\n");
        assert_eq!(set.len(), 2);
        assert!(set.contains(&Domain::from("#x.com")));
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start();
        let list_mock = server.mock(|when, then| {
            when.method(GET).path("/domainbook.txt");
            then.status(200).body("### header\nzorg.example\nclinic.example\n");
        });

        let set = fetcher().fetch(&server.url("/domainbook.txt")).await.unwrap();

        list_mock.assert();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&Domain::from("clinic.example")));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_fatal() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/domainbook.txt");
            then.status(503).body("maintenance");
        });

        let result = fetcher().fetch(&server.url("/domainbook.txt")).await;

        match result {
            Err(SyncError::Fetch { status, body, .. }) => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("expected fetch error, got {:?}", other),
        }
    }
}
