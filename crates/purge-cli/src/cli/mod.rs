use crate::logging;
use anyhow::Context;
use clap::Parser;
use purge_core::config::PurgeConfig;
use purge_core::model::WorkflowRun;
use purge_core::purge::{PurgeOutcome, purge_with_retry};
use purge_providers::{DEFAULT_API_URL, GitHubArtifactStore};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod app;
mod args;
#[cfg(test)]
mod tests;

use args::*;

pub async fn run() -> anyhow::Result<()> {
    app::run().await
}
