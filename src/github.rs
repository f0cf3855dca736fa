use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::{Octocrab, service::middleware::retry::RetryConfig};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    error::Error,
    graphql::{
        GraphQLResponse, PullRequestData, SearchData, convert_pull_request_data,
        convert_search_results, create_add_comment_mutation, create_close_mutation,
        create_delete_ref_mutation, create_pull_request_query, create_search_query,
    },
    types::{BranchRef, Forge, PullRequest, Repo, SearchPage},
};

/// Environment variable holding the personal access token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Per-call ceiling applied to connect and read when none is given.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Reads the token from `GITHUB_TOKEN`. A missing or blank value is a
/// configuration error.
pub fn get_github_token() -> Result<String> {
    token_from(std::env::var(TOKEN_ENV).ok())
}

fn token_from(value: Option<String>) -> Result<String> {
    let token = value.map(|t| t.trim().to_string()).unwrap_or_default();
    if token.is_empty() {
        return Err(Error::Config(format!("Environment variable {TOKEN_ENV} must be set")).into());
    }
    Ok(token)
}

/// Creates an authenticated client that never retries and gives up on a
/// single call after `timeout`.
pub fn setup_github_client(token: String, timeout: Duration) -> Result<Octocrab> {
    Octocrab::builder()
        .personal_token(token)
        .add_retry_config(RetryConfig::None)
        .set_connect_timeout(Some(timeout))
        .set_read_timeout(Some(timeout))
        .build()
        .map_err(|e| Error::Config(format!("Failed to create GitHub client: {e}")).into())
}

/// [`Forge`] backed by GitHub's GraphQL API.
pub struct GitHub {
    octocrab: Octocrab,
}

impl GitHub {
    pub fn new(octocrab: Octocrab) -> Self {
        Self { octocrab }
    }

    /// Builds a client from the environment token.
    pub fn from_env(timeout: Duration) -> Result<Self> {
        let token = get_github_token()?;
        Ok(Self::new(setup_github_client(token, timeout)?))
    }

    async fn execute<T>(&self, body: &serde_json::Value) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response: GraphQLResponse<T> = self
            .octocrab
            .graphql(body)
            .await
            .map_err(Error::from_octocrab)?;
        Ok(response.into_data()?)
    }
}

#[async_trait]
impl Forge for GitHub {
    async fn fetch_pull_request(&self, repo: &Repo, number: u64) -> Result<PullRequest> {
        debug!(%repo, number, "fetching pull request");
        let data: PullRequestData = self
            .execute(&create_pull_request_query(repo, number))
            .await?;
        Ok(convert_pull_request_data(data, repo, number)?)
    }

    async fn add_comment(&self, pr: &PullRequest, body: &str) -> Result<()> {
        debug!(pr = pr.number, "adding comment");
        let _: serde_json::Value = self
            .execute(&create_add_comment_mutation(&pr.id, body))
            .await?;
        Ok(())
    }

    async fn close_pull_request(&self, pr: &PullRequest) -> Result<()> {
        debug!(pr = pr.number, "closing pull request");
        let _: serde_json::Value = self.execute(&create_close_mutation(&pr.id)).await?;
        Ok(())
    }

    async fn delete_ref(&self, branch: &BranchRef) -> Result<()> {
        debug!(branch = %branch.name, "deleting ref");
        let _: serde_json::Value = self
            .execute(&create_delete_ref_mutation(&branch.id))
            .await?;
        Ok(())
    }

    async fn search_pull_requests(&self, query: &str, after: Option<&str>) -> Result<SearchPage> {
        debug!(query, ?after, "fetching search page");
        let data: SearchData = self
            .execute(&create_search_query(query, after))
            .await
            .context("Error querying GitHub search API")?;
        Ok(convert_search_results(data.search))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::exit_code_for;

    #[test]
    fn missing_token_is_a_config_error() {
        let err = token_from(None).unwrap_err();
        assert!(err.to_string().contains("GITHUB_TOKEN must be set"));
        assert_eq!(exit_code_for(&err), 3);
    }

    #[test]
    fn blank_token_is_a_config_error() {
        let err = token_from(Some("  \n".to_string())).unwrap_err();
        assert_eq!(exit_code_for(&err), 3);
    }

    #[test]
    fn token_is_trimmed() {
        assert_eq!(token_from(Some("ghp_abc\n".to_string())).unwrap(), "ghp_abc");
    }
}
