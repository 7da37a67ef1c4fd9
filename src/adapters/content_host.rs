use crate::domain::ports::ContentSource;
use crate::utils::error::{DownloadError, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;

pub const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";

/// Reads raw files from a private GitHub repository through the contents API.
#[derive(Clone)]
pub struct GitHubContentSource {
    client: Client,
    api_base: String,
    repository: String,
    token: String,
    user_agent: String,
}

impl GitHubContentSource {
    pub fn new(
        client: Client,
        api_base: impl Into<String>,
        repository: impl Into<String>,
        token: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            repository: repository.into(),
            token: token.into(),
            user_agent: user_agent.into(),
        }
    }

    fn contents_url(&self, file_name: &str) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.api_base.trim_end_matches('/'),
            self.repository,
            file_name
        )
    }
}

impl std::fmt::Debug for GitHubContentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubContentSource")
            .field("api_base", &self.api_base)
            .field("repository", &self.repository)
            .field("token", &"***")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[async_trait]
impl ContentSource for GitHubContentSource {
    async fn fetch(&self, file_name: &str) -> Result<String> {
        tracing::debug!("Fetching {} from {}", file_name, self.repository);

        let response = self
            .client
            .get(self.contents_url(file_name))
            .bearer_auth(&self.token)
            .header(ACCEPT, RAW_MEDIA_TYPE)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Content host returned {} for {}", status, file_name);
            return Err(DownloadError::ContentHostError {
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn source(server: &MockServer) -> GitHubContentSource {
        GitHubContentSource::new(
            Client::new(),
            server.base_url(),
            "acme/products",
            "test-token",
            "Shop-Test",
        )
    }

    #[tokio::test]
    async fn test_fetch_returns_body_verbatim() {
        let server = MockServer::start();
        let body = "# Playbook\n\n  indented line\r\nlast line without newline";
        let file_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/repos/acme/products/contents/advanced-security-playbook.md")
                .header("Authorization", "Bearer test-token")
                .header("Accept", RAW_MEDIA_TYPE)
                .header("User-Agent", "Shop-Test");
            then.status(200).body(body);
        });

        let content = source(&server)
            .fetch("advanced-security-playbook.md")
            .await
            .unwrap();

        file_mock.assert();
        assert_eq!(content, body);
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported() {
        let server = MockServer::start();
        let file_mock = server.mock(|when, then| {
            when.method(GET).path("/repos/acme/products/contents/missing.md");
            then.status(404).body("Not Found");
        });

        let err = source(&server).fetch("missing.md").await.unwrap_err();

        file_mock.assert();
        assert!(matches!(err, DownloadError::ContentHostError { status: 404 }));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_debug_hides_token() {
        let source = GitHubContentSource::new(
            Client::new(),
            "https://api.github.com/",
            "acme/products",
            "secret-token",
            "Shop",
        );
        assert_eq!(
            source.contents_url("a.md"),
            "https://api.github.com/repos/acme/products/contents/a.md"
        );
        assert!(!format!("{:?}", source).contains("secret-token"));
    }
}
