//! Legacy model-id alias table.
//!
//! Providers periodically retire resolution-specific model variants in
//! favor of a consolidated successor. Saved credential allow-lists (and old
//! schedule rows) may still carry the retired ids; normalizing through this
//! table keeps them resolving. Exact-match keyed, applied before any
//! allow-list filtering.

/// Retired model id -> consolidated successor.
const LEGACY_MODEL_ALIASES: &[(&str, &str)] = &[
    (
        "wavespeed-ai/wan-2.1/t2v-480p",
        "wavespeed-ai/wan-2.2/t2v-plus",
    ),
    (
        "wavespeed-ai/wan-2.1/t2v-720p",
        "wavespeed-ai/wan-2.2/t2v-plus",
    ),
    (
        "bytedance/seedance-v1-pro-t2v-480p",
        "bytedance/seedance-v1-pro",
    ),
    (
        "bytedance/seedance-v1-pro-t2v-1080p",
        "bytedance/seedance-v1-pro",
    ),
    ("sora-1.0-turbo", "sora-2"),
];

/// Normalize a possibly-legacy model id to its canonical successor.
///
/// Already-canonical and unknown ids pass through unchanged, so the mapping
/// is idempotent.
pub fn canonical_model_id(id: &str) -> &str {
    LEGACY_MODEL_ALIASES
        .iter()
        .find(|(legacy, _)| *legacy == id)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(id)
}
