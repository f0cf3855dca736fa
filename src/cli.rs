use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser};

use crate::{
    error::Error,
    github::DEFAULT_TIMEOUT,
    types::{CloseSpec, ListSpec, Repo},
};

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

#[derive(Args, Debug, Clone)]
struct ClientArgs {
    /// Give up on a single GitHub API call after this many seconds
    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = DEFAULT_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,
}

impl ClientArgs {
    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "close-pr",
    about = "Close a GitHub pull request, optionally commenting on it and deleting its branch",
    after_help = "A GitHub API token must be set in the GITHUB_TOKEN environment variable."
)]
#[command(long_version = BUILD_INFO_HUMAN)]
struct CloseArgs {
    /// Comment to post on the PR before closing it
    #[arg(long = "close-comment", value_name = "STRING")]
    pub close_comment: Option<String>,

    /// Delete the PR branch when it lives in the base repository
    #[arg(long = "delete-branch")]
    pub delete_branch: bool,

    /// Fail when the PR is not open instead of warning
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    pub client: ClientArgs,

    /// Repository owner
    #[arg(value_name = "OWNER")]
    pub owner: String,

    /// Repository name
    #[arg(value_name = "REPO")]
    pub repo: String,

    /// Pull request number
    #[arg(value_name = "NUMBER", allow_negative_numbers = true, value_parser = parse_pr_number)]
    pub number: u64,
}

#[derive(Parser, Debug)]
#[command(
    name = "list-pr",
    about = "List all GitHub pull requests matching a search query as a JSON array",
    after_help = "A GitHub API token must be set in the GITHUB_TOKEN environment variable."
)]
#[command(long_version = BUILD_INFO_HUMAN)]
struct ListArgs {
    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    #[command(flatten)]
    pub client: ClientArgs,

    /// GitHub search query (e.g. "repo:owner/name is:open author:alice")
    #[arg(value_name = "QUERY")]
    pub query: String,
}

fn parse_pr_number(value: &str) -> Result<u64, String> {
    match value.trim().parse::<u64>() {
        Ok(number) if number > 0 => Ok(number),
        _ => Err(format!("PR number {value} must be a valid positive number")),
    }
}

/// Parses `close-pr` arguments into the workflow configuration and the
/// per-call timeout.
pub fn parse_close_args<I, T>(args: I) -> Result<(CloseSpec, Duration)>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = CloseArgs::try_parse_from(args)?;
    let repo = Repo::new(cli.owner, cli.repo).map_err(Error::from)?;

    let spec = CloseSpec {
        repo,
        number: cli.number,
        close_comment: cli.close_comment,
        delete_branch: cli.delete_branch,
        strict: cli.strict,
    };

    Ok((spec, cli.client.timeout()))
}

/// Parses `list-pr` arguments into the search request and the per-call
/// timeout.
pub fn parse_list_args<I, T>(args: I) -> Result<(ListSpec, Duration)>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = ListArgs::try_parse_from(args)?;

    if cli.query.trim().is_empty() {
        return Err(Error::Argument("Search query must not be empty".to_string()).into());
    }

    Ok((
        ListSpec {
            query: cli.query,
            pretty: cli.pretty,
        },
        cli.client.timeout(),
    ))
}
