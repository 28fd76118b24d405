pub mod github;
pub mod http;

mod github_models;
mod paging;

pub use github::{DEFAULT_API_URL, GitHubArtifactStore};
