use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::{
    error::Error,
    types::{BranchOutcome, CloseOutcome, CloseSpec, Forge, PullRequest},
};

/// Looks up the pull request named by `spec` and closes it.
pub async fn close_pull_request<F>(spec: &CloseSpec, forge: &F) -> Result<CloseOutcome>
where
    F: Forge + Sync,
{
    let pr = forge
        .fetch_pull_request(&spec.repo, spec.number)
        .await
        .with_context(|| format!("Failed to get PR {}", spec.number))?;

    close_resolved(&pr, spec, forge).await
}

/// Runs the close steps against an already resolved pull request.
///
/// Steps run in order and each must succeed before the next is attempted:
/// comment, close, then branch deletion. Nothing is rolled back when a
/// later step fails.
pub async fn close_resolved<F>(
    pr: &PullRequest,
    spec: &CloseSpec,
    forge: &F,
) -> Result<CloseOutcome>
where
    F: Forge + Sync,
{
    if !pr.is_open() {
        if spec.strict {
            return Err(Error::Precondition(format!(
                "PR {} is not open (state: {})",
                pr.number, pr.state
            ))
            .into());
        }
        warn!("PR {} is not open (state: {}), nothing to do", pr.number, pr.state);
        return Ok(CloseOutcome::Skipped { state: pr.state });
    }

    if let Some(body) = spec.comment() {
        forge
            .add_comment(pr, body)
            .await
            .with_context(|| format!("Failed to comment on PR {}", pr.number))?;
        info!("Commented on PR {}", pr.number);
    }

    forge
        .close_pull_request(pr)
        .await
        .with_context(|| format!("Failed to close PR {}", pr.number))?;
    info!("Successfully closed PR {}", pr.number);

    let branch = if spec.delete_branch {
        delete_head_branch(pr, forge).await?
    } else {
        BranchOutcome::NotRequested
    };

    Ok(CloseOutcome::Closed { branch })
}

async fn delete_head_branch<F>(pr: &PullRequest, forge: &F) -> Result<BranchOutcome>
where
    F: Forge + Sync,
{
    let base = pr.base_repository.full_name.clone();

    if !pr.is_same_repository() {
        let head = pr
            .head_repository
            .as_ref()
            .map_or_else(|| "<deleted>".to_string(), |repo| repo.full_name.clone());
        warn!(
            "PR head repository {} and base repository {} are different - not attempting to delete PR branch",
            head, base
        );
        return Ok(BranchOutcome::SkippedFork { head, base });
    }

    let Some(branch) = &pr.head_ref else {
        warn!("PR {} head branch no longer exists in {}", pr.number, base);
        return Ok(BranchOutcome::Missing);
    };

    forge
        .delete_ref(branch)
        .await
        .with_context(|| format!("Failed to delete ref {}", branch.name))?;
    info!("Successfully deleted ref {}", branch.name);

    Ok(BranchOutcome::Deleted {
        name: branch.name.clone(),
    })
}
