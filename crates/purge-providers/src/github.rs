use crate::github_models::ArtifactsPage;
use crate::http::{send_with_retry, send_with_retry_allow_statuses};
use crate::paging::next_page;
use anyhow::Context;
use purge_core::model::{Artifact, WorkflowRun};
use purge_core::store::{ArtifactStore, StoreFuture};
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = "artifact-purge";
const API_VERSION: &str = "2022-11-28";
const PER_PAGE: u32 = 100;

/// Workflow run artifacts behind the GitHub Actions REST API.
pub struct GitHubArtifactStore {
    client: Client,
    host: String,
    token: String,
}

impl GitHubArtifactStore {
    pub fn new(host: &str, token: impl Into<String>) -> anyhow::Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            anyhow::bail!("GitHub token is empty");
        }
        Ok(Self {
            client: Client::new(),
            host: normalize_host(host),
            token,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("User-Agent", USER_AGENT)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .bearer_auth(self.token.as_str())
    }

    async fn fetch_artifacts_page(
        &self,
        run: &WorkflowRun,
        page: u32,
    ) -> anyhow::Result<(ArtifactsPage, Option<u32>)> {
        let url = run_artifacts_url(&self.host, run, page);
        let response = send_with_retry(|| Ok(self.request(Method::GET, &url)))
            .await
            .context("call GitHub list run artifacts")
            .map_err(|err| describe_status_error(run, err))?;
        let next = next_page(response.headers());
        let payload: ArtifactsPage = response
            .json()
            .await
            .context("decode run artifacts response")?;
        Ok((payload, next))
    }

    async fn list(&self, run: &WorkflowRun) -> anyhow::Result<Vec<Artifact>> {
        let mut page = 1;
        let mut artifacts = Vec::new();
        loop {
            let (payload, next) = self.fetch_artifacts_page(run, page).await?;
            debug!(
                run = %run,
                page,
                total_count = payload.total_count,
                received = payload.artifacts.len(),
                "fetched artifacts page"
            );
            if payload.artifacts.is_empty() {
                break;
            }
            artifacts.extend(payload.artifacts.into_iter().map(Artifact::from));
            match next {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }
        Ok(artifacts)
    }

    async fn delete(&self, run: &WorkflowRun, artifact_id: u64) -> anyhow::Result<()> {
        let url = artifact_url(&self.host, run, artifact_id);
        let response = send_with_retry_allow_statuses(
            || Ok(self.request(Method::DELETE, &url)),
            &[StatusCode::NOT_FOUND],
        )
        .await
        .with_context(|| format!("call GitHub delete artifact {artifact_id}"))
        .map_err(|err| describe_status_error(run, err))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(artifact_id, "artifact already deleted");
            return Ok(());
        }
        debug!(artifact_id, status = status.as_u16(), "artifact deleted");
        Ok(())
    }
}

impl ArtifactStore for GitHubArtifactStore {
    fn list_artifacts<'a>(&'a self, run: &'a WorkflowRun) -> StoreFuture<'a, Vec<Artifact>> {
        Box::pin(self.list(run))
    }

    fn delete_artifact<'a>(
        &'a self,
        run: &'a WorkflowRun,
        artifact_id: u64,
    ) -> StoreFuture<'a, ()> {
        Box::pin(self.delete(run, artifact_id))
    }
}

fn describe_status_error(run: &WorkflowRun, err: anyhow::Error) -> anyhow::Error {
    let message = err
        .downcast_ref::<reqwest::Error>()
        .and_then(|reqwest_err| reqwest_err.status())
        .and_then(|status| github_status_message(&run.slug(), status));
    match message {
        Some(message) => err.context(message),
        None => err,
    }
}

pub(crate) fn github_status_message(slug: &str, status: StatusCode) -> Option<String> {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Some(format!(
            "GitHub authentication failed for {slug} (HTTP {status}). Check that the token can manage Actions artifacts.",
        )),
        StatusCode::NOT_FOUND => Some(format!(
            "GitHub repository or workflow run not found: {slug} (HTTP {status}). Check the repository and run id.",
        )),
        _ => None,
    }
}

fn normalize_host(host: &str) -> String {
    let trimmed = host.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_API_URL.to_string()
    } else {
        trimmed.to_string()
    }
}

fn run_artifacts_url(host: &str, run: &WorkflowRun, page: u32) -> String {
    format!(
        "{host}/repos/{}/{}/actions/runs/{}/artifacts?per_page={PER_PAGE}&page={page}",
        run.owner, run.repo, run.run_id
    )
}

fn artifact_url(host: &str, run: &WorkflowRun, artifact_id: u64) -> String {
    format!(
        "{host}/repos/{}/{}/actions/artifacts/{artifact_id}",
        run.owner, run.repo
    )
}
