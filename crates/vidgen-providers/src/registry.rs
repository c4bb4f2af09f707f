//! Provider registry and credential resolver.
//!
//! One registry value is constructed at process start and passed by handle
//! to submission, streaming, and scheduling code paths. Adapter selection
//! is a tagged lookup by provider name; there is no runtime type
//! inspection and no global state.

use std::sync::Arc;

use vidgen_models::{canonical_model_id, Credential, ModelDescriptor, Provider};

use crate::adapter::ProviderAdapter;
use crate::openai::OpenAiAdapter;
use crate::wavespeed::WaveSpeedAdapter;

/// Registry of provider adapters keyed by provider tag.
#[derive(Clone)]
pub struct ProviderRegistry {
    adapters: Vec<Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    /// Build the registry with the default adapters.
    pub fn new() -> Self {
        Self::with_adapters(vec![
            Arc::new(OpenAiAdapter::new()),
            Arc::new(WaveSpeedAdapter::new()),
        ])
    }

    /// Build from an explicit adapter list (used by tests to inject
    /// adapters pointed at mock endpoints).
    pub fn with_adapters(adapters: Vec<Arc<dyn ProviderAdapter>>) -> Self {
        Self { adapters }
    }

    /// Look up the adapter for a provider tag.
    pub fn adapter(&self, provider: Provider) -> Option<&Arc<dyn ProviderAdapter>> {
        self.adapters.iter().find(|a| a.provider() == provider)
    }

    /// Scan stored credentials in list order and return the first one that
    /// is enabled for video (and matches `preferred` when given).
    pub fn resolve<'a>(
        &self,
        credentials: &'a [Credential],
        preferred: Option<Provider>,
    ) -> Option<&'a Credential> {
        credentials.iter().find(|c| {
            c.usable_for_video()
                && preferred.map_or(true, |p| c.provider == p)
                && self.adapter(c.provider).is_some()
        })
    }

    /// Every usable credential, in list order. Used to advertise available
    /// providers to a caller.
    pub fn resolve_all<'a>(&self, credentials: &'a [Credential]) -> Vec<&'a Credential> {
        credentials
            .iter()
            .filter(|c| c.usable_for_video() && self.adapter(c.provider).is_some())
            .collect()
    }

    /// The adapter's full catalog, filtered to the credential's allow-list
    /// when present. Allow-list entries are normalized through the legacy
    /// alias table first, so previously-saved retired ids keep resolving
    /// to their consolidated successors.
    pub fn models_for(&self, credential: &Credential) -> Vec<ModelDescriptor> {
        let Some(adapter) = self.adapter(credential.provider) else {
            return Vec::new();
        };

        let catalog = adapter.models();
        match &credential.allowed_models {
            None => catalog.to_vec(),
            Some(allowed) => {
                let allowed: Vec<&str> =
                    allowed.iter().map(|id| canonical_model_id(id)).collect();
                catalog
                    .iter()
                    .filter(|m| allowed.contains(&m.id.as_str()))
                    .cloned()
                    .collect()
            }
        }
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
