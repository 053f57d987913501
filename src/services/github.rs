use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors from the GitHub gathering collaborator
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("GitHub returned error: {0}")]
    ApiError(String),

    #[error("GitHub user not found: {0}")]
    NotFound(String),

    #[error("invalid GitHub URL: {0}")]
    InvalidUrl(String),
}

/// Fetches a GitHub account and flattens it into a text blob for extraction
///
/// Only a data-gathering collaborator: everything it returns is plain text
/// that the extraction engine interprets.
pub struct GithubClient {
    base_url: String,
    client: Client,
}

impl GithubClient {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("hackmate-algo")
            .build()
            .expect("Failed to create HTTP client");

        Self { base_url, client }
    }

    /// Pull the username out of a profile URL or accept a bare handle
    pub fn parse_handle(url: &str) -> Result<&str, GithubError> {
        let trimmed = url.trim().trim_end_matches('/');
        let handle = match trimmed.rfind('/') {
            Some(idx) => &trimmed[idx + 1..],
            None => trimmed,
        };
        // GitHub usernames are alphanumerics and hyphens; anything else means
        // we grabbed a domain or a malformed path segment
        let valid = !handle.is_empty()
            && handle
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return Err(GithubError::InvalidUrl(url.to_string()));
        }
        Ok(handle)
    }

    async fn get_json(&self, path: &str) -> Result<Value, GithubError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GithubError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(GithubError::ApiError(format!("{} on {}", status, path)));
        }
        Ok(response.json().await?)
    }

    /// Fetch the account profile and repository listing, flattened to text
    pub async fn gather_profile_text(&self, handle: &str) -> Result<String, GithubError> {
        let user = self.get_json(&format!("/users/{}", handle)).await?;
        let repos = self
            .get_json(&format!("/users/{}/repos?sort=updated&per_page=30", handle))
            .await?;

        let mut blob = String::new();
        for (label, key) in [
            ("Login", "login"),
            ("Name", "name"),
            ("Bio", "bio"),
            ("Company", "company"),
            ("Location", "location"),
            ("Email", "email"),
        ] {
            if let Some(value) = user.get(key).and_then(Value::as_str) {
                blob.push_str(&format!("{}: {}\n", label, value));
            }
        }

        blob.push_str("\nRepositories:\n");
        if let Some(items) = repos.as_array() {
            for repo in items {
                let name = repo.get("name").and_then(Value::as_str).unwrap_or("?");
                let language = repo
                    .get("language")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown");
                let description = repo
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or("");
                blob.push_str(&format!("- {} [{}] {}\n", name, language, description));
            }
        }

        tracing::debug!("Gathered {} chars of GitHub text for {}", blob.len(), handle);
        Ok(blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_handle_variants() {
        assert_eq!(
            GithubClient::parse_handle("https://github.com/octocat").unwrap(),
            "octocat"
        );
        assert_eq!(
            GithubClient::parse_handle("https://github.com/octocat/").unwrap(),
            "octocat"
        );
        assert_eq!(GithubClient::parse_handle("octocat").unwrap(), "octocat");
        assert!(GithubClient::parse_handle("https://github.com/").is_err());
    }

    #[tokio::test]
    async fn test_gather_flattens_profile_and_repos() {
        let mut server = mockito::Server::new_async().await;
        let _user = server
            .mock("GET", "/users/octocat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({ "login": "octocat", "name": "The Octocat", "bio": "likes Rust" }).to_string(),
            )
            .create_async()
            .await;
        let _repos = server
            .mock("GET", "/users/octocat/repos?sort=updated&per_page=30")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([
                    { "name": "hello-world", "language": "Rust", "description": "demo" }
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let client = GithubClient::new(server.url());
        let blob = client.gather_profile_text("octocat").await.unwrap();
        assert!(blob.contains("Login: octocat"));
        assert!(blob.contains("hello-world [Rust] demo"));
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _user = server
            .mock("GET", "/users/ghost")
            .with_status(404)
            .create_async()
            .await;

        let client = GithubClient::new(server.url());
        assert!(matches!(
            client.gather_profile_text("ghost").await,
            Err(GithubError::NotFound(_))
        ));
    }
}
