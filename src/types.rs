use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Number of search results requested per GraphQL page.
pub const SEARCH_PAGE_SIZE: u32 = 100;

/// Error returned when constructing an invalid repository identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum RepoError {
    EmptyOwner,
    EmptyName,
    InvalidCharacter { part: &'static str, value: String },
    InvalidFormat(String),
}

impl fmt::Display for RepoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoError::EmptyOwner => write!(f, "repository owner must not be empty"),
            RepoError::EmptyName => write!(f, "repository name must not be empty"),
            RepoError::InvalidCharacter { part, value } => {
                write!(f, "repository {part} '{value}' contains '/' or whitespace")
            }
            RepoError::InvalidFormat(value) => {
                write!(f, "expected 'owner/repo', got '{value}'")
            }
        }
    }
}

impl std::error::Error for RepoError {}

/// A GitHub repository identifier (owner and name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repo {
    owner: String,
    name: String,
}

impl Repo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, RepoError> {
        let owner = owner.into().trim().to_string();
        let name = name.into().trim().to_string();

        if owner.is_empty() {
            return Err(RepoError::EmptyOwner);
        }
        if name.is_empty() {
            return Err(RepoError::EmptyName);
        }
        for (part, value) in [("owner", &owner), ("name", &name)] {
            if value.contains('/') || value.chars().any(char::is_whitespace) {
                return Err(RepoError::InvalidCharacter {
                    part,
                    value: value.clone(),
                });
            }
        }

        Ok(Self { owner, name })
    }

    /// Parses the `owner/name` form GraphQL returns as `nameWithOwner`.
    pub fn parse(full_name: &str) -> Result<Self, RepoError> {
        match full_name.split_once('/') {
            Some((owner, name)) => Self::new(owner, name),
            None => Err(RepoError::InvalidFormat(full_name.to_string())),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Pull request lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    #[serde(alias = "OPEN")]
    Open,
    #[serde(alias = "CLOSED")]
    Closed,
    #[serde(alias = "MERGED")]
    Merged,
}

impl PrState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrState::Open => "open",
            PrState::Closed => "closed",
            PrState::Merged => "merged",
        }
    }
}

impl fmt::Display for PrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A repository as referenced from a pull request: its node id and full
/// `owner/name`.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoRef {
    pub id: String,
    pub full_name: String,
}

/// A git ref as referenced from a pull request: its node id and branch name.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchRef {
    pub id: String,
    pub name: String,
}

/// Snapshot of a single pull request, fetched once before any mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
    pub id: String,
    pub number: u64,
    pub title: String,
    pub url: String,
    pub state: PrState,
    pub base_repository: RepoRef,
    /// Absent when the head branch has already been deleted.
    pub head_ref: Option<BranchRef>,
    /// Absent when the fork the PR came from has been deleted.
    pub head_repository: Option<RepoRef>,
}

impl PullRequest {
    pub fn is_open(&self) -> bool {
        self.state == PrState::Open
    }

    /// True when the head branch lives in the base repository, i.e. the PR
    /// does not come from a fork.
    pub fn is_same_repository(&self) -> bool {
        self.head_repository
            .as_ref()
            .is_some_and(|head| head.id == self.base_repository.id)
    }
}

/// One search result as emitted by `list-pr`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestSummary {
    pub number: u64,
    pub title: String,
    pub state: PrState,
    pub url: String,
}

/// One page of search results plus the cursor needed to fetch the next one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub results: Vec<PullRequestSummary>,
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

/// Everything the close workflow needs, built once from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseSpec {
    pub repo: Repo,
    pub number: u64,
    pub close_comment: Option<String>,
    pub delete_branch: bool,
    pub strict: bool,
}

impl CloseSpec {
    /// The comment to post, exactly as given. Blank input means no comment.
    pub fn comment(&self) -> Option<&str> {
        self.close_comment
            .as_deref()
            .filter(|body| !body.trim().is_empty())
    }
}

/// Inputs for the search listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSpec {
    pub query: String,
    pub pretty: bool,
}

/// What happened to the head branch after a successful close.
#[derive(Debug, Clone, PartialEq)]
pub enum BranchOutcome {
    NotRequested,
    Deleted { name: String },
    SkippedFork { head: String, base: String },
    Missing,
}

/// Terminal success states of the close workflow. Failures are errors.
#[derive(Debug, Clone, PartialEq)]
pub enum CloseOutcome {
    Skipped { state: PrState },
    Closed { branch: BranchOutcome },
}

/// Remote pull request host.
///
/// Every method is a single remote call. Implementations report failures
/// as [`Error`] values wrapped in `anyhow` so callers can add context.
#[async_trait]
pub trait Forge {
    async fn fetch_pull_request(&self, repo: &Repo, number: u64) -> Result<PullRequest>;

    async fn add_comment(&self, pr: &PullRequest, body: &str) -> Result<()>;

    async fn close_pull_request(&self, pr: &PullRequest) -> Result<()>;

    async fn delete_ref(&self, branch: &BranchRef) -> Result<()>;

    async fn search_pull_requests(&self, query: &str, after: Option<&str>) -> Result<SearchPage>;
}

impl From<RepoError> for Error {
    fn from(err: RepoError) -> Self {
        Error::Argument(err.to_string())
    }
}
