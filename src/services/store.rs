use crate::models::{ChatMessage, Hackathon, RequestStatus, Team, TeamRequest, UserProfile};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with the document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Collection IDs in the document store
#[derive(Debug, Clone)]
pub struct StoreCollections {
    pub users: String,
    pub hackathons: String,
    pub teams: String,
    pub requests: String,
    pub messages: String,
}

/// Document store API client
///
/// The store is the sole owner of durable state. Nothing is cached here:
/// every operation re-reads current documents, trading redundant reads for
/// freedom from stale-data bugs.
pub struct StoreClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    client: Client,
    collections: StoreCollections,
}

impl StoreClient {
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collections: StoreCollections,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            project_id,
            database_id,
            client,
            collections,
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            collection
        )
    }

    /// List documents in a collection matching the given query expressions
    async fn query_documents(
        &self,
        collection: &str,
        queries: &[String],
    ) -> Result<Vec<Value>, StoreError> {
        let queries_json = serde_json::to_string(queries)
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        let encoded = urlencoding::encode(&queries_json);
        let url = format!("{}?query={}", self.collection_url(collection), encoded);

        tracing::debug!("Querying {}: {:?}", collection, queries);

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(StoreError::Unauthorized);
        }
        if !status.is_success() {
            return Err(StoreError::ApiError(format!(
                "Failed to query {}: {}",
                collection, status
            )));
        }

        let json: Value = response.json().await?;
        json.get("documents")
            .and_then(|d| d.as_array())
            .cloned()
            .ok_or_else(|| StoreError::InvalidResponse("Missing documents array".into()))
    }

    fn parse_doc<T: DeserializeOwned>(doc: &Value) -> Result<T, StoreError> {
        let data = doc.get("data").unwrap_or(doc);
        serde_json::from_value(data.clone())
            .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse document: {}", e)))
    }

    fn parse_docs<T: DeserializeOwned>(docs: &[Value]) -> Vec<T> {
        docs.iter().filter_map(|doc| Self::parse_doc(doc).ok()).collect()
    }

    async fn insert_document<T: Serialize>(
        &self,
        collection: &str,
        document: &T,
    ) -> Result<(), StoreError> {
        let url = self.collection_url(collection);
        let payload = serde_json::to_value(document)
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        let response = self
            .client
            .post(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::ApiError(format!(
                "Failed to insert into {}: {}",
                collection,
                response.status()
            )));
        }
        Ok(())
    }

    async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        payload: &Value,
    ) -> Result<(), StoreError> {
        let url = format!("{}/{}", self.collection_url(collection), document_id);

        let response = self
            .client
            .patch(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(format!(
                "{}/{}",
                collection, document_id
            )));
        }
        if !status.is_success() {
            return Err(StoreError::ApiError(format!(
                "Failed to update {}/{}: {}",
                collection, document_id, status
            )));
        }
        Ok(())
    }

    /// Get a single user profile by user id
    pub async fn get_user(&self, user_id: &str) -> Result<UserProfile, StoreError> {
        let queries = vec![format!("equal(\"userId\", \"{}\")", user_id)];
        let docs = self.query_documents(&self.collections.users, &queries).await?;
        let doc = docs
            .first()
            .ok_or_else(|| StoreError::NotFound(format!("Profile not found for user {}", user_id)))?;
        Self::parse_doc(doc)
    }

    /// Fetch several user profiles, preserving the order of `user_ids`
    ///
    /// Fails with NotFound naming the first id that has no profile.
    pub async fn get_users(&self, user_ids: &[String]) -> Result<Vec<UserProfile>, StoreError> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }
        let id_list = user_ids
            .iter()
            .map(|id| format!("\"{}\"", id))
            .collect::<Vec<_>>()
            .join(",");
        let queries = vec![format!("in(\"userId\", [{}])", id_list)];
        let docs = self.query_documents(&self.collections.users, &queries).await?;
        let profiles: Vec<UserProfile> = Self::parse_docs(&docs);

        let mut ordered = Vec::with_capacity(user_ids.len());
        for id in user_ids {
            let profile = profiles
                .iter()
                .find(|p| &p.user_id == id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(format!("Profile not found for user {}", id)))?;
            ordered.push(profile);
        }
        Ok(ordered)
    }

    pub async fn get_hackathon(&self, hackathon_id: &str) -> Result<Hackathon, StoreError> {
        let url = format!(
            "{}/{}",
            self.collection_url(&self.collections.hackathons),
            hackathon_id
        );

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(format!("Hackathon {}", hackathon_id)));
        }
        if !status.is_success() {
            return Err(StoreError::ApiError(format!(
                "Failed to fetch hackathon: {}",
                status
            )));
        }

        let json: Value = response.json().await?;
        Self::parse_doc(&json)
    }

    /// Find the open (non-full) team for a hackathon, if any
    pub async fn find_open_team(&self, hackathon_id: &str) -> Result<Option<Team>, StoreError> {
        let queries = vec![
            format!("equal(\"hackathonId\", \"{}\")", hackathon_id),
            "equal(\"isFull\", false)".to_string(),
        ];
        let docs = self.query_documents(&self.collections.teams, &queries).await?;
        let teams: Vec<Team> = Self::parse_docs(&docs);
        Ok(teams.into_iter().find(Team::is_open))
    }

    /// Find the team a user belongs to for a hackathon, if any
    pub async fn find_team_for_member(
        &self,
        hackathon_id: &str,
        user_id: &str,
    ) -> Result<Option<Team>, StoreError> {
        let queries = vec![format!("equal(\"hackathonId\", \"{}\")", hackathon_id)];
        let docs = self.query_documents(&self.collections.teams, &queries).await?;
        let teams: Vec<Team> = Self::parse_docs(&docs);
        Ok(teams.into_iter().find(|t| t.has_member(user_id)))
    }

    pub async fn insert_team(&self, team: &Team) -> Result<(), StoreError> {
        self.insert_document(&self.collections.teams, team).await
    }

    pub async fn update_team(&self, team: &Team) -> Result<(), StoreError> {
        let payload = serde_json::to_value(team)
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        self.update_document(&self.collections.teams, &team.id, &payload)
            .await
    }

    pub async fn get_request(&self, request_id: &str) -> Result<TeamRequest, StoreError> {
        let url = format!(
            "{}/{}",
            self.collection_url(&self.collections.requests),
            request_id
        );

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(format!("Request {}", request_id)));
        }
        if !status.is_success() {
            return Err(StoreError::ApiError(format!(
                "Failed to fetch request: {}",
                status
            )));
        }

        let json: Value = response.json().await?;
        Self::parse_doc(&json)
    }

    pub async fn insert_request(&self, request: &TeamRequest) -> Result<(), StoreError> {
        self.insert_document(&self.collections.requests, request).await
    }

    pub async fn update_request_status(
        &self,
        request_id: &str,
        status: RequestStatus,
    ) -> Result<(), StoreError> {
        let payload = serde_json::json!({ "status": status });
        self.update_document(&self.collections.requests, request_id, &payload)
            .await
    }

    /// Count the sender's currently pending requests
    pub async fn count_pending_by_sender(&self, user_id: &str) -> Result<usize, StoreError> {
        let queries = vec![
            format!("equal(\"fromUserId\", \"{}\")", user_id),
            "equal(\"status\", \"pending\")".to_string(),
        ];
        let docs = self.query_documents(&self.collections.requests, &queries).await?;
        Ok(docs.len())
    }

    /// Find a pending request for an exact (sender, recipient) pair
    pub async fn find_pending_pair(
        &self,
        from_user_id: &str,
        to_user_id: &str,
    ) -> Result<Option<TeamRequest>, StoreError> {
        let queries = vec![
            format!("equal(\"fromUserId\", \"{}\")", from_user_id),
            format!("equal(\"toUserId\", \"{}\")", to_user_id),
            "equal(\"status\", \"pending\")".to_string(),
        ];
        let docs = self.query_documents(&self.collections.requests, &queries).await?;
        let requests: Vec<TeamRequest> = Self::parse_docs(&docs);
        Ok(requests.into_iter().next())
    }

    /// List pending requests where any of the given users is sender or recipient
    pub async fn list_pending_involving(
        &self,
        user_ids: &[String],
    ) -> Result<Vec<TeamRequest>, StoreError> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }
        let id_list = user_ids
            .iter()
            .map(|id| format!("\"{}\"", id))
            .collect::<Vec<_>>()
            .join(",");

        // The store's query language has no cross-field OR, so the sender and
        // recipient sides are fetched separately and merged by document id.
        let sender_queries = vec![
            format!("in(\"fromUserId\", [{}])", id_list),
            "equal(\"status\", \"pending\")".to_string(),
        ];
        let recipient_queries = vec![
            format!("in(\"toUserId\", [{}])", id_list),
            "equal(\"status\", \"pending\")".to_string(),
        ];

        let sender_docs = self
            .query_documents(&self.collections.requests, &sender_queries)
            .await?;
        let recipient_docs = self
            .query_documents(&self.collections.requests, &recipient_queries)
            .await?;

        let mut requests: Vec<TeamRequest> = Self::parse_docs(&sender_docs);
        for request in Self::parse_docs::<TeamRequest>(&recipient_docs) {
            if !requests.iter().any(|r| r.id == request.id) {
                requests.push(request);
            }
        }
        Ok(requests)
    }

    pub async fn insert_message(&self, message: &ChatMessage) -> Result<(), StoreError> {
        self.insert_document(&self.collections.messages, message).await
    }

    /// List a team's messages, oldest first (the client polls this)
    pub async fn list_messages(&self, team_id: &str) -> Result<Vec<ChatMessage>, StoreError> {
        let queries = vec![format!("equal(\"teamId\", \"{}\")", team_id)];
        let docs = self.query_documents(&self.collections.messages, &queries).await?;
        let mut messages: Vec<ChatMessage> = Self::parse_docs(&docs);
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }
}

impl crate::core::assembly::AssemblyStore for StoreClient {
    fn find_open_team(
        &self,
        hackathon_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Team>, StoreError>> + Send {
        StoreClient::find_open_team(self, hackathon_id)
    }

    fn find_team_for_member(
        &self,
        hackathon_id: &str,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Team>, StoreError>> + Send {
        StoreClient::find_team_for_member(self, hackathon_id, user_id)
    }

    fn insert_team(
        &self,
        team: &Team,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send {
        StoreClient::insert_team(self, team)
    }

    fn update_team(
        &self,
        team: &Team,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send {
        StoreClient::update_team(self, team)
    }

    fn get_request(
        &self,
        request_id: &str,
    ) -> impl std::future::Future<Output = Result<TeamRequest, StoreError>> + Send {
        StoreClient::get_request(self, request_id)
    }

    fn insert_request(
        &self,
        request: &TeamRequest,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send {
        StoreClient::insert_request(self, request)
    }

    fn update_request_status(
        &self,
        request_id: &str,
        status: RequestStatus,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send {
        StoreClient::update_request_status(self, request_id, status)
    }

    fn count_pending_by_sender(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<usize, StoreError>> + Send {
        StoreClient::count_pending_by_sender(self, user_id)
    }

    fn find_pending_pair(
        &self,
        from_user_id: &str,
        to_user_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<TeamRequest>, StoreError>> + Send {
        StoreClient::find_pending_pair(self, from_user_id, to_user_id)
    }

    fn list_pending_involving(
        &self,
        user_ids: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<TeamRequest>, StoreError>> + Send {
        StoreClient::list_pending_involving(self, user_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_client(base_url: String) -> StoreClient {
        StoreClient::new(
            base_url,
            "test_key".to_string(),
            "test_project".to_string(),
            "test_db".to_string(),
            StoreCollections {
                users: "users".to_string(),
                hackathons: "hackathons".to_string(),
                teams: "teams".to_string(),
                requests: "requests".to_string(),
                messages: "messages".to_string(),
            },
        )
    }

    #[test]
    fn test_store_client_creation() {
        let client = test_client("https://store.test/v1".to_string());
        assert_eq!(client.base_url, "https://store.test/v1");
        assert_eq!(client.api_key, "test_key");
    }

    #[tokio::test]
    async fn test_get_user_parses_document() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "total": 1,
            "documents": [{
                "$id": "doc1",
                "data": {
                    "userId": "u1",
                    "name": "Ada",
                    "skills": ["Rust"],
                    "techStack": ["Postgres"],
                }
            }]
        });
        let _mock = server
            .mock(
                "GET",
                mockito::Matcher::Regex(r"^/databases/test_db/collections/users/documents".to_string()),
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = test_client(server.url());
        let profile = client.get_user("u1").await.unwrap();
        assert_eq!(profile.user_id, "u1");
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.skills, vec!["Rust"]);
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock(
                "GET",
                mockito::Matcher::Regex(r"^/databases/test_db/collections/users/documents".to_string()),
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "total": 0, "documents": [] }).to_string())
            .create_async()
            .await;

        let client = test_client(server.url());
        assert!(matches!(
            client.get_user("missing").await,
            Err(StoreError::NotFound(_))
        ));
    }
}
