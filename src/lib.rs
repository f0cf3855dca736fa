//! prkit: single-purpose GitHub pull request tools.
//!
//! Provides the workflows behind the `close-pr` and `list-pr` commands:
//! resolving a pull request, closing it (optionally commenting first and
//! deleting its branch afterwards), and paging through every pull request
//! matching a search query. The remote side sits behind the [`Forge`]
//! trait, implemented for GitHub's GraphQL API by [`GitHub`].

pub mod cli;
pub mod close;
pub mod error;
pub mod github;
pub mod graphql;
pub mod search;
pub mod types;

pub use cli::{parse_close_args, parse_list_args};
pub use close::{close_pull_request, close_resolved};
pub use error::{Error, exit_code_for};
pub use github::GitHub;
pub use search::{list_pull_requests, write_json};
pub use types::{
    BranchOutcome, BranchRef, CloseOutcome, CloseSpec, Forge, ListSpec, PrState, PullRequest,
    PullRequestSummary, Repo, RepoError, RepoRef, SEARCH_PAGE_SIZE, SearchPage,
};
