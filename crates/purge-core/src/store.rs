use crate::model::{Artifact, WorkflowRun};
use std::future::Future;
use std::pin::Pin;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send + 'a>>;

/// Remote side of a purge: where a run's artifacts are listed and deleted.
pub trait ArtifactStore {
    fn list_artifacts<'a>(&'a self, run: &'a WorkflowRun) -> StoreFuture<'a, Vec<Artifact>>;

    /// Deleting an artifact that no longer exists must succeed, so a purge
    /// pass can be repeated safely.
    fn delete_artifact<'a>(
        &'a self,
        run: &'a WorkflowRun,
        artifact_id: u64,
    ) -> StoreFuture<'a, ()>;
}
