pub mod types;

pub use types::{Issue, IssuePage, IssueState};

use async_trait::async_trait;
use octocrab::Octocrab;
use thiserror::Error;
use tracing::debug;

use crate::config::GitHubSettings;

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("Failed to set up GitHub client: {0}")]
    Client(#[source] octocrab::Error),

    #[error("GitHub API request failed: {0}")]
    Transport(#[source] octocrab::Error),

    #[error("Failed to decode GitHub issues response: {0}")]
    Decode(#[source] octocrab::Error),
}

impl From<octocrab::Error> for IssueError {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::Serde { .. } | octocrab::Error::Json { .. } => IssueError::Decode(err),
            _ => IssueError::Transport(err),
        }
    }
}

/// Anything that can hand out issues one page at a time.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Fetch the page at `index` (0 is the first page).
    async fn fetch_page(&self, index: u32) -> Result<IssuePage, IssueError>;
}

/// Query parameters of one issue listing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListParams {
    pub state: IssueState,
    pub per_page: u8,
    /// 1-based GitHub page number
    pub page: u32,
}

/// Lists repository issues through the GitHub REST API.
pub struct GitHubIssues {
    client: Octocrab,
    authenticated: bool,
    owner: String,
    repo: String,
    state: IssueState,
    per_page: u8,
}

impl GitHubIssues {
    /// Must be called inside a tokio runtime.
    pub fn new(
        settings: &GitHubSettings,
        state: IssueState,
        per_page: usize,
    ) -> Result<Self, IssueError> {
        let mut builder = Octocrab::builder();

        if let Some(ref token) = settings.token {
            builder = builder.personal_token(token.clone());
        }

        let api_url = settings.api_url.trim_end_matches('/');
        if api_url != crate::config::DEFAULT_GITHUB_API {
            builder = builder.base_uri(api_url).map_err(IssueError::Client)?;
        }

        let client = builder.build().map_err(IssueError::Client)?;

        Ok(Self {
            client,
            authenticated: settings.token.is_some(),
            owner: settings.owner.clone(),
            repo: settings.repo.clone(),
            state,
            per_page: u8::try_from(per_page).unwrap_or(u8::MAX),
        })
    }

    /// GitHub pages start at 1; page=0 silently aliases page 1.
    fn list_params(&self, index: u32) -> ListParams {
        ListParams {
            state: self.state,
            per_page: self.per_page,
            page: index + 1,
        }
    }
}

#[async_trait]
impl IssueSource for GitHubIssues {
    async fn fetch_page(&self, index: u32) -> Result<IssuePage, IssueError> {
        let params = self.list_params(index);
        debug!(
            owner = %self.owner,
            repo = %self.repo,
            page = params.page,
            authenticated = self.authenticated,
            "listing issues"
        );

        let page = self
            .client
            .issues(&self.owner, &self.repo)
            .list()
            .state(params.state.as_param())
            .per_page(params.per_page)
            .page(params.page)
            .send()
            .await?;

        let has_next = page.next.is_some();
        let issues: Vec<Issue> = page
            .items
            .into_iter()
            .map(|issue| Issue::new(issue.html_url.to_string(), issue.body))
            .collect();
        debug!(page = params.page, issues = issues.len(), has_next, "received issues");

        Ok(IssuePage { issues, has_next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_url: &str, token: Option<&str>) -> GitHubSettings {
        GitHubSettings {
            api_url: api_url.to_string(),
            token: token.map(str::to_string),
            owner: "octo".to_string(),
            repo: "hello".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_params_map_index_to_github_page() {
        let source =
            GitHubIssues::new(&settings("https://api.github.com", None), IssueState::All, 5)
                .unwrap();

        let first = source.list_params(0);
        assert_eq!(first.state, IssueState::All);
        assert_eq!(first.state.as_str(), "all");
        assert_eq!(first.per_page, 5);
        assert_eq!(first.page, 1);
        assert_eq!(source.list_params(2).page, 3);
    }

    #[tokio::test]
    async fn test_list_params_follow_settings() {
        let source = GitHubIssues::new(
            &settings("https://api.github.com/", None),
            IssueState::Closed,
            3,
        )
        .unwrap();
        let params = source.list_params(0);
        assert_eq!(params.state, IssueState::Closed);
        assert_eq!(params.per_page, 3);
    }

    #[tokio::test]
    async fn test_token_only_used_when_configured() {
        let anonymous =
            GitHubIssues::new(&settings("https://api.github.com", None), IssueState::All, 5)
                .unwrap();
        assert!(!anonymous.authenticated);

        let authenticated = GitHubIssues::new(
            &settings("https://github.example.com/api/v3", Some("pat")),
            IssueState::All,
            5,
        )
        .unwrap();
        assert!(authenticated.authenticated);
    }

    #[tokio::test]
    async fn test_invalid_api_url_is_client_error() {
        let err = GitHubIssues::new(&settings("not a uri", None), IssueState::All, 5)
            .err()
            .unwrap();
        assert!(matches!(err, IssueError::Client(_)));
    }

    #[tokio::test]
    async fn test_unreachable_api_is_transport_error() {
        let source =
            GitHubIssues::new(&settings("http://127.0.0.1:1", None), IssueState::All, 5).unwrap();
        let err = source.fetch_page(0).await.unwrap_err();
        assert!(matches!(err, IssueError::Transport(_)));
    }
}
