//! Pricing descriptors and the cost calculator.
//!
//! The calculator is a pure function over a pricing descriptor. Resolution
//! tiers take priority over top-level figures, and per-second pricing takes
//! priority over per-generation pricing within the same tier. No currency
//! conversion and no rounding happen here; callers format for display.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Pricing for a single resolution tier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionPricing {
    /// Cost per rendered second at this resolution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost_per_second: Option<f64>,
    /// Flat cost per generation at this resolution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost_per_generation: Option<f64>,
}

/// Pricing descriptor attached to a model catalog entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost_per_second: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost_per_generation: Option<f64>,
    /// Per-resolution overrides, keyed by resolution tier (e.g. "1080p")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing_by_resolution: Option<HashMap<String, ResolutionPricing>>,
}

impl Pricing {
    /// Per-second pricing at every tier.
    pub fn per_second(rate: f64) -> Self {
        Self {
            estimated_cost_per_second: Some(rate),
            ..Default::default()
        }
    }

    /// Flat per-generation pricing at every tier.
    pub fn per_generation(flat: f64) -> Self {
        Self {
            estimated_cost_per_generation: Some(flat),
            ..Default::default()
        }
    }

    /// Attach a per-second resolution tier.
    pub fn with_resolution_rate(mut self, resolution: &str, rate: f64) -> Self {
        self.pricing_by_resolution
            .get_or_insert_with(HashMap::new)
            .insert(
                resolution.to_string(),
                ResolutionPricing {
                    estimated_cost_per_second: Some(rate),
                    estimated_cost_per_generation: None,
                },
            );
        self
    }
}

/// Compute the monetary cost of one generation.
///
/// Resolution tiers are consulted first; within any tier, per-second pricing
/// wins over per-generation pricing. An absent descriptor or one with no
/// usable figures yields `0.0`, never an error.
pub fn cost(pricing: Option<&Pricing>, duration_seconds: f64, resolution: Option<&str>) -> f64 {
    let Some(pricing) = pricing else {
        return 0.0;
    };

    if let (Some(resolution), Some(tiers)) = (resolution, pricing.pricing_by_resolution.as_ref()) {
        if let Some(tier) = tiers.get(resolution) {
            if let Some(rate) = tier.estimated_cost_per_second {
                return rate * duration_seconds;
            }
            if let Some(flat) = tier.estimated_cost_per_generation {
                return flat;
            }
        }
    }

    if let Some(rate) = pricing.estimated_cost_per_second {
        return rate * duration_seconds;
    }
    if let Some(flat) = pricing.estimated_cost_per_generation {
        return flat;
    }

    0.0
}
