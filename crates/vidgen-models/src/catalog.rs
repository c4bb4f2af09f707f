//! Provider model catalog entries.
//!
//! Catalogs are static, in-process data owned by each provider adapter.
//! The size tables here are plain lookup data, not logic; the fallback
//! order they drive is asserted by adapter tests.

use serde::{Deserialize, Serialize};

use crate::pricing::Pricing;

/// What a catalog model produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    TextToVideo,
    ImageToVideo,
    Image,
}

impl ModelKind {
    /// Whether this model produces video output.
    pub fn is_video(&self) -> bool {
        matches!(self, ModelKind::TextToVideo | ModelKind::ImageToVideo)
    }
}

/// One aspect ratio's resolution-to-size-token mappings, in definition
/// order. The first entry is the fallback when the requested resolution has
/// no exact match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeTable {
    pub aspect_ratio: String,
    /// (resolution tier, provider-specific size token) pairs
    pub sizes: Vec<(String, String)>,
}

impl SizeTable {
    pub fn new(aspect_ratio: &str, sizes: &[(&str, &str)]) -> Self {
        Self {
            aspect_ratio: aspect_ratio.to_string(),
            sizes: sizes
                .iter()
                .map(|(r, s)| (r.to_string(), s.to_string()))
                .collect(),
        }
    }
}

/// Static catalog entry for one provider model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    /// Canonical model ID
    pub id: String,
    pub display_name: String,
    pub kind: ModelKind,
    /// Explicit duration list; empty means the provider accepts any duration
    pub supported_durations: Vec<f64>,
    pub supported_aspect_ratios: Vec<String>,
    pub supported_resolutions: Vec<String>,
    /// Aspect-ratio x resolution -> provider size token, when the provider
    /// wants size tokens instead of (aspect, resolution) pairs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_sizes: Option<Vec<SizeTable>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
}

impl ModelDescriptor {
    /// Whether `duration` is acceptable for this model. Models with no
    /// explicit duration list accept anything positive.
    pub fn supports_duration(&self, duration: f64) -> bool {
        if self.supported_durations.is_empty() {
            return duration > 0.0;
        }
        self.supported_durations.iter().any(|d| *d == duration)
    }

    /// Whether `resolution` is acceptable for this model.
    pub fn supports_resolution(&self, resolution: &str) -> bool {
        self.supported_resolutions.iter().any(|r| r == resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(durations: Vec<f64>) -> ModelDescriptor {
        ModelDescriptor {
            id: "test-model".into(),
            display_name: "Test Model".into(),
            kind: ModelKind::TextToVideo,
            supported_durations: durations,
            supported_aspect_ratios: vec!["16:9".into()],
            supported_resolutions: vec!["720p".into(), "1080p".into()],
            valid_sizes: None,
            pricing: None,
        }
    }

    #[test]
    fn test_explicit_duration_list() {
        let d = descriptor(vec![4.0, 8.0, 12.0]);
        assert!(d.supports_duration(8.0));
        assert!(!d.supports_duration(6.0));
    }

    #[test]
    fn test_open_duration_list_accepts_positive() {
        let d = descriptor(vec![]);
        assert!(d.supports_duration(37.5));
        assert!(!d.supports_duration(0.0));
    }

    #[test]
    fn test_resolution_support() {
        let d = descriptor(vec![]);
        assert!(d.supports_resolution("1080p"));
        assert!(!d.supports_resolution("4k"));
    }
}
