#![allow(dead_code)]

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use prkit::{
    BranchRef, Error, Forge, PrState, PullRequest, PullRequestSummary, Repo, RepoRef, SearchPage,
};

/// A remote call observed by [`MockHub`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Fetch(String, u64),
    Comment(String, String),
    Close(String),
    DeleteRef(String),
    Search(String, Option<String>),
}

/// Which call the mock should fail, and with what.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailOn {
    Nothing,
    Fetch,
    Comment,
    Close,
    DeleteRef,
    Search,
}

/// In-memory forge that records every call in order.
pub struct MockHub {
    pub pr: Option<PullRequest>,
    pub pages: Vec<SearchPage>,
    pub fail_on: FailOn,
    calls: Mutex<Vec<Call>>,
}

impl MockHub {
    pub fn with_pr(pr: PullRequest) -> Self {
        Self {
            pr: Some(pr),
            pages: Vec::new(),
            fail_on: FailOn::Nothing,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_pages(pages: Vec<SearchPage>) -> Self {
        Self {
            pr: None,
            pages,
            fail_on: FailOn::Nothing,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, fail_on: FailOn) -> Self {
        self.fail_on = fail_on;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that change remote state.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| {
                matches!(
                    call,
                    Call::Comment(..) | Call::Close(_) | Call::DeleteRef(_)
                )
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, step: FailOn) -> Result<()> {
        if self.fail_on == step {
            return Err(Error::Transport(format!("simulated {step:?} failure")).into());
        }
        Ok(())
    }
}

#[async_trait]
impl Forge for MockHub {
    async fn fetch_pull_request(&self, repo: &Repo, number: u64) -> Result<PullRequest> {
        self.record(Call::Fetch(repo.to_string(), number));
        self.check(FailOn::Fetch)?;
        self.pr
            .clone()
            .filter(|pr| pr.number == number)
            .ok_or_else(|| Error::NotFound(format!("PR {number} in {repo}")).into())
    }

    async fn add_comment(&self, pr: &PullRequest, body: &str) -> Result<()> {
        self.record(Call::Comment(pr.id.clone(), body.to_string()));
        self.check(FailOn::Comment)
    }

    async fn close_pull_request(&self, pr: &PullRequest) -> Result<()> {
        self.record(Call::Close(pr.id.clone()));
        self.check(FailOn::Close)
    }

    async fn delete_ref(&self, branch: &BranchRef) -> Result<()> {
        self.record(Call::DeleteRef(branch.id.clone()));
        self.check(FailOn::DeleteRef)
    }

    async fn search_pull_requests(&self, query: &str, after: Option<&str>) -> Result<SearchPage> {
        self.record(Call::Search(query.to_string(), after.map(str::to_string)));
        self.check(FailOn::Search)?;

        let index = match after {
            None => 0,
            Some(cursor) => cursor
                .strip_prefix("cursor-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| Error::Api(format!("unknown cursor {cursor}")))?,
        };
        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }
}

pub fn acme_widgets() -> Repo {
    Repo::new("acme", "widgets").unwrap()
}

/// Open same-repository PR `acme/widgets#42` with head branch `feature/sprockets`.
pub fn open_pr() -> PullRequest {
    PullRequest {
        id: "PR_42".to_string(),
        number: 42,
        title: "Add sprockets".to_string(),
        url: "https://github.com/acme/widgets/pull/42".to_string(),
        state: PrState::Open,
        base_repository: RepoRef {
            id: "R1".to_string(),
            full_name: "acme/widgets".to_string(),
        },
        head_ref: Some(BranchRef {
            id: "REF_sprockets".to_string(),
            name: "feature/sprockets".to_string(),
        }),
        head_repository: Some(RepoRef {
            id: "R1".to_string(),
            full_name: "acme/widgets".to_string(),
        }),
    }
}

/// Same PR opened from the fork `alice/widgets` (`R2`).
pub fn fork_pr() -> PullRequest {
    PullRequest {
        head_repository: Some(RepoRef {
            id: "R2".to_string(),
            full_name: "alice/widgets".to_string(),
        }),
        ..open_pr()
    }
}

/// Builds `sizes.len()` linked pages with globally increasing PR numbers.
pub fn search_pages(sizes: &[usize]) -> Vec<SearchPage> {
    let mut next_number = 1u64;
    sizes
        .iter()
        .enumerate()
        .map(|(index, &size)| {
            let results = (0..size)
                .map(|_| {
                    let number = next_number;
                    next_number += 1;
                    PullRequestSummary {
                        number,
                        title: format!("PR {number}"),
                        state: PrState::Open,
                        url: format!("https://github.com/acme/widgets/pull/{number}"),
                    }
                })
                .collect();
            let has_next_page = index + 1 < sizes.len();
            SearchPage {
                results,
                end_cursor: Some(format!("cursor-{}", index + 1)),
                has_next_page,
            }
        })
        .collect()
}
