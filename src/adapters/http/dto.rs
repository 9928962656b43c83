use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct PagedRequest<T> {
    pub meta: RequestMeta,
    pub data: Vec<T>,
}

impl<T> PagedRequest<T> {
    pub fn new(page_size: usize, page_token: impl Into<String>, item: T) -> Self {
        Self {
            meta: RequestMeta {
                pagination: PageRequest {
                    page_size,
                    page_token: page_token.into(),
                },
            },
            data: vec![item],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RequestMeta {
    pub pagination: PageRequest,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page_size: usize,
    pub page_token: String,
}

#[derive(Debug, Serialize)]
pub struct DataRequest<T> {
    pub data: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct GroupQuery<'a> {
    pub query: &'a str,
    pub source: &'a str,
}

#[derive(Debug, Serialize)]
pub struct GroupRef<'a> {
    pub id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct MemberRef<'a> {
    pub id: &'a str,
    pub domain: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: ResponseMeta,
}

impl<T> Envelope<T> {
    /// 空字串視同沒有下一頁
    pub fn next_page_token(&self) -> Option<&str> {
        self.meta
            .pagination
            .as_ref()
            .and_then(|p| p.next.as_deref())
            .filter(|next| !next.is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ResponseMeta {
    #[serde(default)]
    pub pagination: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FolderEntry {
    #[serde(default)]
    pub folders: Vec<Folder>,
}

#[derive(Debug, Deserialize)]
pub struct Folder {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MembersEntry {
    #[serde(rename = "groupMembers", default)]
    pub group_members: Vec<GroupMember>,
}

#[derive(Debug, Deserialize)]
pub struct GroupMember {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(rename = "emailAddress", default)]
    pub email_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paged_request_shape() {
        let body = PagedRequest::new(
            25,
            "",
            GroupQuery {
                query: "Relay",
                source: "cloud",
            },
        );
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "meta": {"pagination": {"pageSize": 25, "pageToken": ""}},
                "data": [{"query": "Relay", "source": "cloud"}]
            })
        );
    }

    #[test]
    fn test_next_page_token() {
        let with_next: Envelope<MembersEntry> = serde_json::from_value(serde_json::json!({
            "data": [{"groupMembers": []}],
            "meta": {"pagination": {"pageSize": 100, "next": "abc"}}
        }))
        .unwrap();
        assert_eq!(with_next.next_page_token(), Some("abc"));

        let last: Envelope<MembersEntry> = serde_json::from_value(serde_json::json!({
            "data": [{"groupMembers": []}],
            "meta": {"pagination": {"pageSize": 100}}
        }))
        .unwrap();
        assert_eq!(last.next_page_token(), None);

        let empty: Envelope<MembersEntry> = serde_json::from_value(serde_json::json!({
            "data": [],
            "meta": {"pagination": {"next": ""}}
        }))
        .unwrap();
        assert_eq!(empty.next_page_token(), None);
    }

    #[test]
    fn test_folder_envelope_deserializes() {
        let envelope: Envelope<FolderEntry> = serde_json::from_value(serde_json::json!({
            "meta": {"status": 200},
            "data": [{"folders": [{"id": "grp-1", "description": "Relay"}, {"id": "grp-2"}]}],
            "fail": []
        }))
        .unwrap();
        assert_eq!(envelope.data.len(), 1);
        assert_eq!(envelope.data[0].folders[0].id, "grp-1");
        assert_eq!(envelope.data[0].folders[1].description, None);
        assert_eq!(envelope.next_page_token(), None);

        let without_data: Envelope<FolderEntry> =
            serde_json::from_value(serde_json::json!({"meta": {}})).unwrap();
        assert!(without_data.data.is_empty());
    }
}
