use serde::Deserialize;

/// Which issues to list, mirroring GitHub's `state` query parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
    #[default]
    All,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
            IssueState::All => "all",
        }
    }

    pub fn as_param(self) -> octocrab::params::State {
        match self {
            IssueState::Open => octocrab::params::State::Open,
            IssueState::Closed => octocrab::params::State::Closed,
            IssueState::All => octocrab::params::State::All,
        }
    }
}

impl std::fmt::Display for IssueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single issue as far as the scan is concerned.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    /// Browser URL of the issue, used as the document id
    pub url: String,
    /// Issue body; empty when the tracker has none
    pub body: String,
}

impl Issue {
    pub fn new(url: impl Into<String>, body: Option<String>) -> Self {
        Self {
            url: url.into(),
            body: body.unwrap_or_default(),
        }
    }
}

/// One page of issues plus whether the tracker has another page after it.
#[derive(Debug, Clone, Default)]
pub struct IssuePage {
    pub issues: Vec<Issue>,
    pub has_next: bool,
}
