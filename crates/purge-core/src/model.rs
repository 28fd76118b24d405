use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidRunRef {
    #[error("repository must be given as owner/repo (got {0:?})")]
    Slug(String),
    #[error("workflow run id must be a positive integer (got {0:?})")]
    RunId(String),
}

/// A workflow run scoped to its owner/repository pair.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct WorkflowRun {
    pub owner: String,
    pub repo: String,
    pub run_id: u64,
}

impl WorkflowRun {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, run_id: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            run_id,
        }
    }

    /// Builds a run from an `owner/repo` slug and a decimal run id.
    pub fn parse(slug: &str, run_id: &str) -> Result<Self, InvalidRunRef> {
        let (owner, repo) = parse_slug(slug)?;
        let run_id = run_id
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| InvalidRunRef::RunId(run_id.to_string()))?;
        Ok(Self::new(owner, repo, run_id))
    }

    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for WorkflowRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.run_id)
    }
}

/// Splits an `owner/repo` slug. Both halves must be non-empty and free of
/// whitespace, since they are placed verbatim into API paths.
pub fn parse_slug(slug: &str) -> Result<(&str, &str), InvalidRunRef> {
    match slug.trim().split_once('/') {
        Some((owner, repo)) if is_path_segment(owner) && is_path_segment(repo) => {
            Ok((owner, repo))
        }
        _ => Err(InvalidRunRef::Slug(slug.to_string())),
    }
}

fn is_path_segment(value: &str) -> bool {
    !value.is_empty() && !value.contains('/') && !value.contains(char::is_whitespace)
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Artifact {
    pub id: u64,
    pub name: String,
    pub size_in_bytes: u64,
    pub expired: bool,
}

/// Result of looking for artifacts on a run. An empty run is an expected
/// outcome, not an error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ArtifactListing {
    Found(Vec<Artifact>),
    Empty,
}

impl ArtifactListing {
    pub fn from_artifacts(artifacts: Vec<Artifact>) -> Self {
        if artifacts.is_empty() {
            ArtifactListing::Empty
        } else {
            ArtifactListing::Found(artifacts)
        }
    }
}
