//! Stored provider credentials.
//!
//! Credentials are owned entirely by the external settings store; this core
//! only reads them. List order is significant: the resolver returns the
//! first usable match.

use serde::{Deserialize, Serialize};

use crate::job::Provider;

/// A stored API key plus provider and capability flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: String,
    pub provider: Provider,
    pub api_key: String,
    /// Credential is usable at all
    pub enabled: bool,
    /// Credential may be used for video generation
    pub video_enabled: bool,
    /// Optional allow-list of model ids. Entries may be legacy ids and are
    /// normalized through the alias table before filtering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_models: Option<Vec<String>>,
}

impl Credential {
    /// Whether this credential can serve a video generation request.
    pub fn usable_for_video(&self) -> bool {
        self.enabled && self.video_enabled
    }
}
