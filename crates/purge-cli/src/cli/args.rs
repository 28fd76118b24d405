use super::*;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Delete every artifact attached to a workflow run"
)]
pub(super) struct Cli {
    #[arg(
        long,
        env = "INPUT_PARENT_REPO",
        help = "Repository that owns the workflow run, as owner/repo"
    )]
    pub(super) repo: String,
    #[arg(
        long = "run-id",
        env = "INPUT_PARENT_RUNID",
        help = "Numeric id of the workflow run"
    )]
    pub(super) run_id: String,
    #[arg(
        long,
        env = "GITHUB_TOKEN",
        hide_env_values = true,
        help = "Token allowed to delete Actions artifacts"
    )]
    pub(super) token: String,
    #[arg(
        long = "api-url",
        env = "GITHUB_API_URL",
        default_value = DEFAULT_API_URL,
        help = "GitHub REST API base URL"
    )]
    pub(super) api_url: String,
    #[arg(
        long,
        env = "INPUT_CONFIG",
        help = "JSON file overriding the backoff settings"
    )]
    pub(super) config: Option<PathBuf>,
}
