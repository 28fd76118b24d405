use crate::backoff::{self, BackoffConfig, BackoffTimeout};
use crate::model::{ArtifactListing, WorkflowRun};
use crate::store::ArtifactStore;
use anyhow::Context;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Retry layers of a purge. `check` wraps the initial listing, `operation`
/// wraps a whole purge pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PurgePolicy {
    pub check: BackoffConfig,
    pub operation: BackoffConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PurgeOutcome {
    NothingToDelete,
    /// `count` is what the successful pass deleted; artifacts removed by
    /// earlier failed passes are not included.
    Deleted { count: usize },
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("not all artifacts deleted ({remaining} remaining)")]
pub struct IncompleteDeletion {
    pub remaining: usize,
}

pub async fn check_run_artifacts<S>(
    store: &S,
    run: &WorkflowRun,
) -> anyhow::Result<ArtifactListing>
where
    S: ArtifactStore + ?Sized,
{
    let artifacts = store
        .list_artifacts(run)
        .await
        .context("list run artifacts")?;
    Ok(ArtifactListing::from_artifacts(artifacts))
}

/// One purge pass: find the run's artifacts, delete each, then confirm none
/// are left.
pub async fn purge_run<S>(
    store: &S,
    run: &WorkflowRun,
    policy: &PurgePolicy,
) -> anyhow::Result<PurgeOutcome>
where
    S: ArtifactStore + ?Sized,
{
    let listing = backoff::run(&policy.check, || check_run_artifacts(store, run))
        .await
        .context("check run artifacts")?;
    let artifacts = match listing {
        ArtifactListing::Empty => {
            info!(run = %run, "no artifacts found");
            return Ok(PurgeOutcome::NothingToDelete);
        }
        ArtifactListing::Found(artifacts) => artifacts,
    };

    info!(run = %run, count = artifacts.len(), "artifacts before deletion");
    for artifact in &artifacts {
        debug!(
            artifact = %artifact.name,
            artifact_id = artifact.id,
            "processing artifact"
        );
        if let Err(err) = store.delete_artifact(run, artifact.id).await {
            error!(artifact_id = artifact.id, error = %err, "error deleting artifact");
            return Err(err.context(format!("delete artifact {}", artifact.id)));
        }
    }

    let remaining = store
        .list_artifacts(run)
        .await
        .context("list run artifacts")?;
    info!(run = %run, count = remaining.len(), "artifacts after deletion");
    if !remaining.is_empty() {
        return Err(IncompleteDeletion {
            remaining: remaining.len(),
        }
        .into());
    }

    info!(run = %run, count = artifacts.len(), "all artifacts deleted");
    Ok(PurgeOutcome::Deleted {
        count: artifacts.len(),
    })
}

/// Repeats [`purge_run`] under the `operation` backoff. Each pass starts from
/// a fresh listing, so artifacts removed by an earlier pass are not touched
/// again.
pub async fn purge_with_retry<S>(
    store: &S,
    run: &WorkflowRun,
    policy: &PurgePolicy,
) -> Result<PurgeOutcome, BackoffTimeout>
where
    S: ArtifactStore + ?Sized,
{
    backoff::run(&policy.operation, || async {
        purge_run(store, run, policy).await.inspect_err(|err| {
            warn!(run = %run, error = %format!("{err:#}"), "purge attempt failed");
        })
    })
    .await
}
