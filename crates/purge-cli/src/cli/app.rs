use super::*;

pub(super) async fn run() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match execute(cli).await {
        Ok(outcome) => {
            info!(outcome = ?outcome, "purge finished");
            Ok(())
        }
        Err(err) => {
            error!(error = %format!("{err:#}"), "artifact purge failed");
            Err(err)
        }
    }
}

pub(super) async fn execute(cli: Cli) -> anyhow::Result<PurgeOutcome> {
    let run = WorkflowRun::parse(&cli.repo, &cli.run_id)?;
    let config = load_config(cli.config.as_deref())?;
    let policy = config.policy().context("invalid backoff settings")?;
    let store = GitHubArtifactStore::new(&cli.api_url, cli.token)?;
    info!(run = %run, host = store.host(), "purging workflow run artifacts");
    let outcome = purge_with_retry(&store, &run, &policy).await?;
    Ok(outcome)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PurgeConfig> {
    match path {
        Some(path) => {
            PurgeConfig::load(path).with_context(|| format!("load config {}", path.display()))
        }
        None => Ok(PurgeConfig::default()),
    }
}

fn init_tracing() {
    let runner_debug = std::env::var("RUNNER_DEBUG").ok();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(runner_debug.as_deref())));
    let in_actions = std::env::var("GITHUB_ACTIONS").is_ok_and(|value| value == "true");
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(in_actions.then(logging::WorkflowCommandLayer::stdout))
        .init();
}

/// Debug logging follows the runner's "enable debug logging" switch.
pub(super) fn default_directive(runner_debug: Option<&str>) -> &'static str {
    if runner_debug == Some("1") {
        "debug"
    } else {
        "info"
    }
}
