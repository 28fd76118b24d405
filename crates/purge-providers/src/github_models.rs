use purge_core::model::Artifact;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct ArtifactsPage {
    #[serde(default)]
    pub(crate) total_count: u64,
    #[serde(default)]
    pub(crate) artifacts: Vec<ArtifactItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtifactItem {
    pub(crate) id: u64,
    pub(crate) name: String,
    pub(crate) size_in_bytes: Option<u64>,
    pub(crate) expired: Option<bool>,
}

impl From<ArtifactItem> for Artifact {
    fn from(item: ArtifactItem) -> Self {
        Artifact {
            id: item.id,
            name: item.name,
            size_in_bytes: item.size_in_bytes.unwrap_or(0),
            expired: item.expired.unwrap_or(false),
        }
    }
}
